use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use crm_core::models::{
    CompanyPatch, ContactPatch, DealPatch, DealStage, NewCompany, NewContact, NewDeal,
};

#[derive(Parser, Debug)]
#[command(name = "crm", version, about = "Command-line client for the CRM backend")]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "Backend base URL (overrides CRM_API_URL and the config file)"
    )]
    pub api_url: Option<String>,
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and remember the session
    Login {
        #[arg(long, short)]
        username: Option<String>,
    },
    /// Create an account (does not sign in)
    Register {
        #[arg(long, short)]
        username: String,
        #[arg(long, short)]
        email: String,
    },
    /// Forget the current session
    Logout,
    /// Show whether a session is present
    Status,
    /// Check that the backend is up
    Health,
    /// Counts and pipeline value across all records
    Dashboard,
    Contacts {
        #[command(subcommand)]
        command: ContactCommands,
    },
    Companies {
        #[command(subcommand)]
        command: CompanyCommands,
    },
    Deals {
        #[command(subcommand)]
        command: DealCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ContactCommands {
    List,
    Show {
        id: i64,
    },
    Create(ContactArgs),
    Update {
        id: i64,
        #[command(flatten)]
        fields: ContactArgs,
    },
    Delete {
        id: i64,
        #[arg(long, short, help = "Do not ask for confirmation")]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum CompanyCommands {
    List,
    Create(CompanyArgs),
    Update {
        id: i64,
        #[command(flatten)]
        fields: CompanyArgs,
    },
    Delete {
        id: i64,
        #[arg(long, short, help = "Do not ask for confirmation")]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum DealCommands {
    List,
    Create(DealArgs),
    Update {
        id: i64,
        #[command(flatten)]
        fields: DealArgs,
    },
    Delete {
        id: i64,
        #[arg(long, short, help = "Do not ask for confirmation")]
        yes: bool,
    },
}

/// Field flags shared by `create` and `update`. Required fields are checked
/// by the client before sending, not by the argument parser.
#[derive(Args, Debug, Clone, Default)]
pub struct ContactArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub company_id: Option<i64>,
}

impl ContactArgs {
    pub fn into_new(self) -> NewContact {
        NewContact {
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.phone,
            company_id: self.company_id,
        }
    }

    pub fn into_patch(self) -> ContactPatch {
        ContactPatch {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            company_id: self.company_id,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct CompanyArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub domain: Option<String>,
    #[arg(long)]
    pub industry: Option<String>,
    #[arg(long, help = "Headcount band, e.g. 11-50")]
    pub size: Option<String>,
}

impl CompanyArgs {
    pub fn into_new(self) -> NewCompany {
        NewCompany {
            name: self.name.unwrap_or_default(),
            domain: self.domain,
            industry: self.industry,
            size: self.size,
        }
    }

    pub fn into_patch(self) -> CompanyPatch {
        CompanyPatch {
            name: self.name,
            domain: self.domain,
            industry: self.industry,
            size: self.size,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct DealArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub amount: Option<f64>,
    #[arg(long, help = "new, contacted, qualified, proposal, won or lost")]
    pub stage: Option<DealStage>,
    #[arg(long, help = "Win likelihood, 0-100")]
    pub probability: Option<i32>,
    #[arg(long)]
    pub contact_id: Option<i64>,
    #[arg(long)]
    pub company_id: Option<i64>,
    #[arg(long, help = "Expected close date, YYYY-MM-DD")]
    pub close_date: Option<NaiveDate>,
}

impl DealArgs {
    pub fn into_new(self) -> NewDeal {
        NewDeal {
            name: self.name.unwrap_or_default(),
            amount: self.amount.unwrap_or_default(),
            stage: self.stage.unwrap_or_default(),
            probability: self.probability.unwrap_or_default(),
            contact_id: self.contact_id,
            company_id: self.company_id,
            close_date: self.close_date,
        }
    }

    pub fn into_patch(self) -> DealPatch {
        DealPatch {
            name: self.name,
            amount: self.amount,
            stage: self.stage,
            probability: self.probability,
            contact_id: self.contact_id,
            company_id: self.company_id,
            close_date: self.close_date,
        }
    }
}
