//! Data models for CRM entities.
//!
//! This module contains the records returned by the CRM backend and the
//! payloads the client sends:
//!
//! - `User`: the account returned on login
//! - `Contact`, `NewContact`, `ContactPatch`: people tracked in the CRM
//! - `Company`, `NewCompany`, `CompanyPatch`: organizations contacts belong to
//! - `Deal`, `NewDeal`, `DealPatch`, `DealStage`: the sales pipeline
//! - `StatusMessage`, `HealthStatus`: small status bodies
//!
//! Records keep any field the backend sends that is not modelled here in
//! their `extra` map, so nothing is dropped on the way through.

pub mod company;
pub mod contact;
pub mod deal;
pub mod status;
pub mod user;
pub mod validation;

pub use company::{Company, CompanyPatch, NewCompany};
pub use contact::{Contact, ContactPatch, NewContact};
pub use deal::{Deal, DealPatch, DealStage, NewDeal, UnknownStage};
pub use status::{HealthStatus, StatusMessage};
pub use user::User;
pub use validation::{FieldError, ValidationErrors};

use serde::{Deserialize, Deserializer};

/// Fields the backend sends that no model names.
pub type ExtraFields = serde_json::Map<String, serde_json::Value>;

/// Reads an explicit `null` as the type's default, the same as a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
