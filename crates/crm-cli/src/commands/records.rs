use anyhow::{bail, Result};

use crate::cli::{CompanyCommands, ContactCommands, DealCommands};
use crate::output;

use super::{confirm, notice, Context};

const NOTHING_TO_UPDATE: &str = "Nothing to update: pass at least one field flag";
const SAVE_FALLBACK: &str = "An error occurred";

// ===== Contacts =====

pub async fn contacts(ctx: &Context, command: ContactCommands) -> Result<()> {
    let crm = ctx.connect()?;
    match command {
        ContactCommands::List => {
            let contacts = crm
                .list_contacts()
                .await
                .map_err(|e| notice(e, "Failed to fetch contacts"))?;
            ctx.emit(&contacts, |c| output::contacts(c))
        }
        ContactCommands::Show { id } => {
            let contact = crm
                .get_contact(id)
                .await
                .map_err(|e| notice(e, "Failed to fetch contact"))?;
            ctx.emit(&contact, output::contact)
        }
        ContactCommands::Create(fields) => {
            let contact = fields.into_new();
            contact.validate()?;
            let created = crm
                .create_contact(&contact)
                .await
                .map_err(|e| notice(e, SAVE_FALLBACK))?;
            ctx.done(&created, &format!("Contact created successfully (#{})", created.id))
        }
        ContactCommands::Update { id, fields } => {
            let patch = fields.into_patch();
            if patch.is_empty() {
                bail!(NOTHING_TO_UPDATE);
            }
            patch.validate()?;
            let updated = crm
                .update_contact(id, &patch)
                .await
                .map_err(|e| notice(e, SAVE_FALLBACK))?;
            ctx.done(&updated, "Contact updated successfully")
        }
        ContactCommands::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete contact #{}?", id))? {
                eprintln!("Cancelled");
                return Ok(());
            }
            let status = crm
                .delete_contact(id)
                .await
                .map_err(|e| notice(e, "Failed to delete contact"))?;
            ctx.done(&status, "Contact deleted successfully")
        }
    }
}

// ===== Companies =====

pub async fn companies(ctx: &Context, command: CompanyCommands) -> Result<()> {
    let crm = ctx.connect()?;
    match command {
        CompanyCommands::List => {
            let companies = crm
                .list_companies()
                .await
                .map_err(|e| notice(e, "Failed to fetch companies"))?;
            ctx.emit(&companies, |c| output::companies(c))
        }
        CompanyCommands::Create(fields) => {
            let company = fields.into_new();
            company.validate()?;
            let created = crm
                .create_company(&company)
                .await
                .map_err(|e| notice(e, SAVE_FALLBACK))?;
            ctx.done(&created, &format!("Company created successfully (#{})", created.id))
        }
        CompanyCommands::Update { id, fields } => {
            let patch = fields.into_patch();
            if patch.is_empty() {
                bail!(NOTHING_TO_UPDATE);
            }
            patch.validate()?;
            let updated = crm
                .update_company(id, &patch)
                .await
                .map_err(|e| notice(e, SAVE_FALLBACK))?;
            ctx.done(&updated, "Company updated successfully")
        }
        CompanyCommands::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete company #{}?", id))? {
                eprintln!("Cancelled");
                return Ok(());
            }
            let status = crm
                .delete_company(id)
                .await
                .map_err(|e| notice(e, "Failed to delete company"))?;
            ctx.done(&status, "Company deleted successfully")
        }
    }
}

// ===== Deals =====

pub async fn deals(ctx: &Context, command: DealCommands) -> Result<()> {
    let crm = ctx.connect()?;
    match command {
        DealCommands::List => {
            let deals = crm
                .list_deals()
                .await
                .map_err(|e| notice(e, "Failed to fetch deals"))?;
            ctx.emit(&deals, |d| output::deals(d))
        }
        DealCommands::Create(fields) => {
            let deal = fields.into_new();
            deal.validate()?;
            let created = crm
                .create_deal(&deal)
                .await
                .map_err(|e| notice(e, SAVE_FALLBACK))?;
            ctx.done(&created, &format!("Deal created successfully (#{})", created.id))
        }
        DealCommands::Update { id, fields } => {
            let patch = fields.into_patch();
            if patch.is_empty() {
                bail!(NOTHING_TO_UPDATE);
            }
            patch.validate()?;
            let updated = crm
                .update_deal(id, &patch)
                .await
                .map_err(|e| notice(e, SAVE_FALLBACK))?;
            ctx.done(&updated, "Deal updated successfully")
        }
        DealCommands::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete deal #{}?", id))? {
                eprintln!("Cancelled");
                return Ok(());
            }
            let status = crm
                .delete_deal(id)
                .await
                .map_err(|e| notice(e, "Failed to delete deal"))?;
            ctx.done(&status, "Deal deleted successfully")
        }
    }
}
