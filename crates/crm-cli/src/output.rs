//! Plain-text rendering of records for the terminal.
//!
//! Every renderer returns a `String` so the caller decides where it goes.

use std::fmt::Write;

use anyhow::Result;
use serde::Serialize;

use crm_core::models::{Company, Contact, Deal};
use crm_core::DashboardStats;

use crate::utils::{format_currency, format_date, format_phone, format_timestamp, or_empty, truncate};

// Column widths
const NAME_WIDTH: usize = 24;
const EMAIL_WIDTH: usize = 28;
const PHONE_WIDTH: usize = 16;
const DOMAIN_WIDTH: usize = 22;
const INDUSTRY_WIDTH: usize = 18;

pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn contacts(contacts: &[Contact]) -> String {
    if contacts.is_empty() {
        return "No contacts found\n".to_string();
    }

    let mut out = format!(
        "{:>5}  {:<NAME_WIDTH$}  {:<EMAIL_WIDTH$}  {:<PHONE_WIDTH$}  {}\n",
        "ID", "NAME", "EMAIL", "PHONE", "CREATED"
    );
    for contact in contacts {
        let phone = contact.phone.as_deref().map(format_phone);
        let _ = writeln!(
            out,
            "{:>5}  {:<NAME_WIDTH$}  {:<EMAIL_WIDTH$}  {:<PHONE_WIDTH$}  {}",
            contact.id,
            truncate(&contact.full_name(), NAME_WIDTH),
            truncate(&contact.email, EMAIL_WIDTH),
            or_empty(phone.as_deref()),
            format_timestamp(contact.created_at),
        );
    }
    out
}

pub fn contact(contact: &Contact) -> String {
    let phone = contact.phone.as_deref().map(format_phone);
    let company = contact.company_id.map(|id| id.to_string());
    let mut out = String::new();
    let _ = writeln!(out, "{} (#{})", contact.full_name(), contact.id);
    let _ = writeln!(out, "  Email:    {}", contact.email);
    let _ = writeln!(out, "  Phone:    {}", or_empty(phone.as_deref()));
    let _ = writeln!(out, "  Company:  {}", or_empty(company.as_deref()));
    let _ = writeln!(out, "  Created:  {}", format_timestamp(contact.created_at));
    let _ = writeln!(out, "  Updated:  {}", format_timestamp(contact.updated_at));
    out
}

pub fn companies(companies: &[Company]) -> String {
    if companies.is_empty() {
        return "No companies found\n".to_string();
    }

    let mut out = format!(
        "{:>5}  {:<NAME_WIDTH$}  {:<DOMAIN_WIDTH$}  {:<INDUSTRY_WIDTH$}  {}\n",
        "ID", "NAME", "DOMAIN", "INDUSTRY", "SIZE"
    );
    for company in companies {
        let _ = writeln!(
            out,
            "{:>5}  {:<NAME_WIDTH$}  {:<DOMAIN_WIDTH$}  {:<INDUSTRY_WIDTH$}  {}",
            company.id,
            truncate(&company.name, NAME_WIDTH),
            truncate(or_empty(company.domain.as_deref()), DOMAIN_WIDTH),
            truncate(or_empty(company.industry.as_deref()), INDUSTRY_WIDTH),
            or_empty(company.size.as_deref()),
        );
    }
    out
}

pub fn deals(deals: &[Deal]) -> String {
    if deals.is_empty() {
        return "No deals found\n".to_string();
    }

    let mut out = format!(
        "{:>5}  {:<NAME_WIDTH$}  {:>14}  {:<10}  {:>4}  {}\n",
        "ID", "NAME", "AMOUNT", "STAGE", "PROB", "CLOSE"
    );
    for deal in deals {
        let _ = writeln!(
            out,
            "{:>5}  {:<NAME_WIDTH$}  {:>14}  {:<10}  {:>3}%  {}",
            deal.id,
            truncate(&deal.name, NAME_WIDTH),
            format_currency(deal.amount),
            deal.stage,
            deal.probability,
            format_date(deal.close_date),
        );
    }
    out
}

pub fn dashboard(stats: &DashboardStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Contacts:     {}", stats.contacts);
    let _ = writeln!(out, "Companies:    {}", stats.companies);
    let _ = writeln!(out, "Deals:        {}", stats.deals);
    let _ = writeln!(out, "Total value:  {}", format_currency(stats.total_deals_value));
    let _ = writeln!(out, "Open value:   {}", format_currency(stats.open_pipeline_value()));

    if !stats.by_stage.is_empty() {
        let _ = writeln!(out, "\n{:<10}  {:>5}  {:>14}", "STAGE", "COUNT", "VALUE");
        for (stage, summary) in &stats.by_stage {
            let _ = writeln!(
                out,
                "{:<10}  {:>5}  {:>14}",
                stage,
                summary.count,
                format_currency(summary.value)
            );
        }
    }
    out
}
