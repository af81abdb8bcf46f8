//! Patient serialization views
//!
//! The same aggregate serializes two ways:
//!
//! - the **list view** flattens each value to its single effective scalar
//!   next to the definition's display name, for table-style rendering
//! - the **detail view** exposes the raw two-column shape, symmetric with
//!   the create/update payloads, so a client can round-trip a record
//!   through an edit form

use crate::domain::{
    CustomFieldDefinition, CustomFieldId, PatientAddress, PatientId, PatientRecord, PatientStatus,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// Address as rendered in both views
#[derive(Debug, Serialize)]
pub struct AddressView {
    pub address_type: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub is_primary: bool,
    pub full_address: String,
}

impl From<&PatientAddress> for AddressView {
    fn from(address: &PatientAddress) -> Self {
        Self {
            address_type: address.address_type.as_str().to_string(),
            street_address: address.street_address.clone(),
            city: address.city.clone(),
            state: address.state.as_str().to_string(),
            postal_code: address.postal_code.clone(),
            is_primary: address.is_primary,
            full_address: address.full_address(),
        }
    }
}

/// Flattened value entry for the list view
#[derive(Debug, Serialize)]
pub struct FlatValueView {
    /// Display name of the definition
    pub field_name: String,

    /// The single effective scalar; numbers render with trailing zero scale
    /// trimmed, so a stored `0.00` appears as `"0"` rather than vanishing
    pub value: serde_json::Value,
}

/// Two-column value entry for the detail view
#[derive(Debug, Serialize)]
pub struct ColumnValueView {
    /// Referenced definition id
    pub custom_field: CustomFieldId,

    /// Populated for TEXT values, null otherwise
    pub text_value: Option<String>,

    /// Populated for NUMBER values, null otherwise
    pub number_value: Option<Decimal>,
}

/// List view of a patient: flat, display-oriented
#[derive(Debug, Serialize)]
pub struct PatientListView {
    pub id: PatientId,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub status: PatientStatus,
    pub addresses: Vec<AddressView>,
    pub custom_fields: Vec<FlatValueView>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl PatientListView {
    /// Builds the list view, resolving definition names from `definitions`
    pub fn build(record: &PatientRecord, definitions: &[CustomFieldDefinition]) -> Self {
        let names: HashMap<CustomFieldId, &str> = definitions
            .iter()
            .map(|d| (d.id, d.name.as_str()))
            .collect();

        let custom_fields = record
            .custom_field_values
            .iter()
            .map(|v| FlatValueView {
                field_name: names
                    .get(&v.custom_field)
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| v.custom_field.to_string()),
                value: v.value.render(),
            })
            .collect();

        Self {
            id: record.patient.id,
            first_name: record.patient.first_name.clone(),
            middle_name: record.patient.middle_name.clone(),
            last_name: record.patient.last_name.clone(),
            full_name: record.patient.full_name(),
            date_of_birth: record.patient.date_of_birth,
            status: record.patient.status,
            addresses: record.addresses.iter().map(AddressView::from).collect(),
            custom_fields,
            created_at: record.patient.created_at,
            modified_at: record.patient.modified_at,
        }
    }
}

/// Detail view of a patient: structured, edit-oriented
#[derive(Debug, Serialize)]
pub struct PatientDetailView {
    pub id: PatientId,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub status: PatientStatus,
    pub addresses: Vec<AddressView>,
    pub custom_field_values: Vec<ColumnValueView>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl From<&PatientRecord> for PatientDetailView {
    fn from(record: &PatientRecord) -> Self {
        let custom_field_values = record
            .custom_field_values
            .iter()
            .map(|v| {
                let (text_value, number_value) = v.value.columns();
                ColumnValueView {
                    custom_field: v.custom_field,
                    text_value: text_value.map(String::from),
                    number_value,
                }
            })
            .collect();

        Self {
            id: record.patient.id,
            first_name: record.patient.first_name.clone(),
            middle_name: record.patient.middle_name.clone(),
            last_name: record.patient.last_name.clone(),
            date_of_birth: record.patient.date_of_birth,
            status: record.patient.status,
            addresses: record.addresses.iter().map(AddressView::from).collect(),
            custom_field_values,
            created_at: record.patient.created_at,
            modified_at: record.patient.modified_at,
        }
    }
}
