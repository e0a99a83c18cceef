//! Typed CRUD methods for contacts, companies and deals.
//!
//! Pure request/response mapping over `ApiClient`: no validation, no
//! caching, and response bodies come back as the backend sent them.

use tracing::debug;

use crate::auth::SessionStore;
use crate::models::{
    Company, CompanyPatch, Contact, ContactPatch, Deal, DealPatch, HealthStatus, NewCompany,
    NewContact, NewDeal, StatusMessage,
};

use super::{ApiClient, ApiError};

const CONTACTS: &str = "/contacts";
const COMPANIES: &str = "/companies";
const DEALS: &str = "/deals";
const HEALTH: &str = "/health";

#[derive(Debug, Clone)]
pub struct CrmClient {
    api: ApiClient,
}

impl CrmClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionStore {
        self.api.session()
    }

    // ===== Contacts =====

    pub async fn list_contacts(&self) -> Result<Vec<Contact>, ApiError> {
        let contacts: Vec<Contact> = self.api.get(CONTACTS).await?;
        debug!(count = contacts.len(), "Contacts fetched");
        Ok(contacts)
    }

    pub async fn get_contact(&self, id: i64) -> Result<Contact, ApiError> {
        self.api.get(&format!("{}/{}", CONTACTS, id)).await
    }

    pub async fn create_contact(&self, contact: &NewContact) -> Result<Contact, ApiError> {
        self.api.post(CONTACTS, contact).await
    }

    pub async fn update_contact(&self, id: i64, patch: &ContactPatch) -> Result<Contact, ApiError> {
        self.api.put(&format!("{}/{}", CONTACTS, id), patch).await
    }

    pub async fn delete_contact(&self, id: i64) -> Result<StatusMessage, ApiError> {
        self.api.delete(&format!("{}/{}", CONTACTS, id)).await
    }

    // ===== Companies =====

    pub async fn list_companies(&self) -> Result<Vec<Company>, ApiError> {
        let companies: Vec<Company> = self.api.get(COMPANIES).await?;
        debug!(count = companies.len(), "Companies fetched");
        Ok(companies)
    }

    pub async fn create_company(&self, company: &NewCompany) -> Result<Company, ApiError> {
        self.api.post(COMPANIES, company).await
    }

    pub async fn update_company(&self, id: i64, patch: &CompanyPatch) -> Result<Company, ApiError> {
        self.api.put(&format!("{}/{}", COMPANIES, id), patch).await
    }

    pub async fn delete_company(&self, id: i64) -> Result<StatusMessage, ApiError> {
        self.api.delete(&format!("{}/{}", COMPANIES, id)).await
    }

    // ===== Deals =====

    pub async fn list_deals(&self) -> Result<Vec<Deal>, ApiError> {
        let deals: Vec<Deal> = self.api.get(DEALS).await?;
        debug!(count = deals.len(), "Deals fetched");
        Ok(deals)
    }

    pub async fn create_deal(&self, deal: &NewDeal) -> Result<Deal, ApiError> {
        self.api.post(DEALS, deal).await
    }

    pub async fn update_deal(&self, id: i64, patch: &DealPatch) -> Result<Deal, ApiError> {
        self.api.put(&format!("{}/{}", DEALS, id), patch).await
    }

    pub async fn delete_deal(&self, id: i64) -> Result<StatusMessage, ApiError> {
        self.api.delete(&format!("{}/{}", DEALS, id)).await
    }

    // ===== Health =====

    /// Backend liveness. Needs no credential, but goes through the same
    /// send path as everything else.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.api.get(HEALTH).await
    }
}
