//! Dashboard aggregation over the three resource lists.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::api::{ApiError, CrmClient};
use crate::models::{Company, Contact, Deal, DealStage};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StageSummary {
    pub count: usize,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub contacts: usize,
    pub companies: usize,
    pub deals: usize,
    pub total_deals_value: f64,
    pub by_stage: BTreeMap<DealStage, StageSummary>,
}

impl DashboardStats {
    pub fn from_records(contacts: &[Contact], companies: &[Company], deals: &[Deal]) -> Self {
        let mut by_stage: BTreeMap<DealStage, StageSummary> = BTreeMap::new();
        for deal in deals {
            let summary = by_stage.entry(deal.stage).or_default();
            summary.count += 1;
            summary.value += deal.amount;
        }

        Self {
            contacts: contacts.len(),
            companies: companies.len(),
            deals: deals.len(),
            total_deals_value: deals.iter().map(|d| d.amount).sum(),
            by_stage,
        }
    }

    /// Fetch all three lists concurrently and aggregate once every call has
    /// settled. Any failure fails the whole dashboard; each failure is logged
    /// on its own.
    pub async fn fetch(client: &CrmClient) -> Result<Self, ApiError> {
        let (contacts, companies, deals) = futures::join!(
            client.list_contacts(),
            client.list_companies(),
            client.list_deals()
        );

        for (resource, error) in [
            ("contacts", contacts.as_ref().err()),
            ("companies", companies.as_ref().err()),
            ("deals", deals.as_ref().err()),
        ] {
            if let Some(e) = error {
                warn!(resource, error = %e, "Dashboard fetch failed");
            }
        }

        let stats = Self::from_records(&contacts?, &companies?, &deals?);
        debug!(
            contacts = stats.contacts,
            companies = stats.companies,
            deals = stats.deals,
            "Dashboard aggregated"
        );
        Ok(stats)
    }

    /// Value of deals that are neither won nor lost.
    pub fn open_pipeline_value(&self) -> f64 {
        self.by_stage
            .iter()
            .filter(|(stage, _)| !stage.is_closed())
            .map(|(_, s)| s.value)
            .sum()
    }
}
