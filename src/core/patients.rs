//! Patient aggregate service
//!
//! Coordinates aggregate writes: validates the core fields and addresses,
//! resolves every submitted value against its definition within the caller's
//! scope, and hands the fully validated aggregate to the store in one
//! transactional call.

use crate::adapters::store::{CustomFieldStore, PatientStore};
use crate::domain::{
    CarebaseError, CustomFieldValue, PatientAddress, PatientDraft, PatientId, PatientRecord,
    ProviderScope, Result, ValueSubmission,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Patient aggregate operations
pub struct PatientService {
    patients: Arc<dyn PatientStore>,
    custom_fields: Arc<dyn CustomFieldStore>,
}

impl PatientService {
    /// Create a new patient service
    pub fn new(patients: Arc<dyn PatientStore>, custom_fields: Arc<dyn CustomFieldStore>) -> Self {
        Self {
            patients,
            custom_fields,
        }
    }

    /// Create a patient with its addresses and custom field values
    ///
    /// Every submitted value is resolved against its definition inside the
    /// caller's scope before anything is written; a reference to another
    /// provider's definition fails as `NotFound`, exactly like a reference
    /// to a definition that does not exist.
    pub async fn create(
        &self,
        scope: ProviderScope,
        draft: PatientDraft,
        addresses: Vec<PatientAddress>,
        submissions: Vec<ValueSubmission>,
    ) -> Result<PatientRecord> {
        draft.validate()?;
        for address in &addresses {
            address.validate()?;
        }
        let values = self.resolve_values(scope, submissions).await?;

        let record = self
            .patients
            .create_patient(scope, draft, addresses, values)
            .await?;
        tracing::info!(
            patient_id = %record.patient.id,
            provider_id = %scope.provider_id(),
            "Patient created"
        );
        Ok(record)
    }

    /// List the scope's patients with their children
    pub async fn list(&self, scope: ProviderScope) -> Result<Vec<PatientRecord>> {
        self.patients.list_patients(scope).await
    }

    /// Fetch one patient aggregate within the scope
    pub async fn get(&self, scope: ProviderScope, id: PatientId) -> Result<PatientRecord> {
        self.patients.get_patient(scope, id).await
    }

    /// Update a patient's core fields and replace submitted child collections
    ///
    /// A `Some` collection replaces the stored one wholesale; `None` leaves
    /// it untouched.
    pub async fn update(
        &self,
        scope: ProviderScope,
        id: PatientId,
        draft: PatientDraft,
        addresses: Option<Vec<PatientAddress>>,
        submissions: Option<Vec<ValueSubmission>>,
    ) -> Result<PatientRecord> {
        draft.validate()?;
        if let Some(addresses) = &addresses {
            for address in addresses {
                address.validate()?;
            }
        }
        let values = match submissions {
            Some(submissions) => Some(self.resolve_values(scope, submissions).await?),
            None => None,
        };

        self.patients
            .update_patient(scope, id, draft, addresses, values)
            .await
    }

    /// Delete a patient and its children
    pub async fn delete(&self, scope: ProviderScope, id: PatientId) -> Result<()> {
        self.patients.delete_patient(scope, id).await?;
        tracing::info!(
            patient_id = %id,
            provider_id = %scope.provider_id(),
            "Patient deleted"
        );
        Ok(())
    }

    /// Resolve raw submissions into validated values
    ///
    /// Looks up each referenced definition within the scope and validates
    /// the submitted columns against its declared type. Two submissions for
    /// the same definition are rejected up front rather than left for the
    /// storage constraint.
    async fn resolve_values(
        &self,
        scope: ProviderScope,
        submissions: Vec<ValueSubmission>,
    ) -> Result<Vec<CustomFieldValue>> {
        let mut seen = HashSet::new();
        let mut values = Vec::with_capacity(submissions.len());

        for submission in submissions {
            if !seen.insert(submission.custom_field) {
                return Err(CarebaseError::Conflict(format!(
                    "duplicate value for custom field {}",
                    submission.custom_field
                )));
            }
            let definition = self
                .custom_fields
                .get_custom_field(scope, submission.custom_field)
                .await?;
            values.push(submission.into_value(definition.field_type)?);
        }

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::{MemoryStore, ProviderStore};
    use crate::domain::{
        AddressType, CustomFieldDraft, CustomFieldId, CustomFieldType, FieldValue, NewProvider,
        PatientStatus, UsState,
    };
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    struct Fixture {
        service: PatientService,
        scope: ProviderScope,
        other_scope: ProviderScope,
        text_field: CustomFieldId,
        number_field: CustomFieldId,
    }

    async fn setup() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let mut scopes = Vec::new();
        for username in ["drsmith", "drjones"] {
            let provider = store
                .create_provider(NewProvider {
                    username: username.to_string(),
                    first_name: String::new(),
                    last_name: String::new(),
                    password_hash: "$2b$04$hash".to_string(),
                })
                .await
                .unwrap();
            scopes.push(ProviderScope::new(provider.id));
        }

        let text_field = store
            .create_custom_field(
                scopes[0],
                CustomFieldDraft {
                    name: "Referred By".to_string(),
                    field_type: CustomFieldType::Text,
                    description: None,
                },
            )
            .await
            .unwrap()
            .id;
        let number_field = store
            .create_custom_field(
                scopes[0],
                CustomFieldDraft {
                    name: "Number of Visits".to_string(),
                    field_type: CustomFieldType::Number,
                    description: None,
                },
            )
            .await
            .unwrap()
            .id;

        Fixture {
            service: PatientService::new(store.clone(), store),
            scope: scopes[0],
            other_scope: scopes[1],
            text_field,
            number_field,
        }
    }

    fn draft(first: &str, last: &str) -> PatientDraft {
        PatientDraft {
            first_name: first.to_string(),
            middle_name: None,
            last_name: last.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
            status: PatientStatus::Inquiry,
        }
    }

    fn home_address() -> PatientAddress {
        PatientAddress {
            address_type: AddressType::Home,
            street_address: "12 Main St".to_string(),
            city: "Springfield".to_string(),
            state: UsState::Il,
            postal_code: "62704".to_string(),
            is_primary: true,
            created_at: chrono::Utc::now(),
            modified_at: chrono::Utc::now(),
        }
    }

    fn text_submission(field: CustomFieldId, text: &str) -> ValueSubmission {
        ValueSubmission {
            custom_field: field,
            text_value: Some(text.to_string()),
            number_value: None,
        }
    }

    fn number_submission(field: CustomFieldId, number: &str) -> ValueSubmission {
        ValueSubmission {
            custom_field: field,
            text_value: None,
            number_value: Some(Decimal::from_str(number).unwrap()),
        }
    }

    #[tokio::test]
    async fn test_create_full_aggregate() {
        let f = setup().await;
        let record = f
            .service
            .create(
                f.scope,
                draft("Ada", "Lovelace"),
                vec![home_address()],
                vec![
                    text_submission(f.text_field, "Dr. Jones"),
                    number_submission(f.number_field, "3"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(record.addresses.len(), 1);
        assert_eq!(record.custom_field_values.len(), 2);
        assert_eq!(
            record.custom_field_values[0].value,
            FieldValue::Text("Dr. Jones".to_string())
        );
    }

    #[tokio::test]
    async fn test_create_rejects_wrong_column() {
        let f = setup().await;
        let err = f
            .service
            .create(
                f.scope,
                draft("Ada", "Lovelace"),
                vec![home_address()],
                vec![number_submission(f.text_field, "5")],
            )
            .await
            .unwrap_err();
        match err {
            CarebaseError::Validation(v) => assert_eq!(v.field, "number_value"),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_foreign_definition() {
        let f = setup().await;
        // The other provider cannot attach values to definitions it does
        // not own, and learns nothing beyond "not found".
        let err = f
            .service
            .create(
                f.other_scope,
                draft("Ada", "Lovelace"),
                vec![home_address()],
                vec![text_submission(f.text_field, "Dr. Jones")],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CarebaseError::NotFound("custom field")));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_definition() {
        let f = setup().await;
        let err = f
            .service
            .create(
                f.scope,
                draft("Ada", "Lovelace"),
                vec![home_address()],
                vec![
                    text_submission(f.text_field, "Dr. Jones"),
                    text_submission(f.text_field, "Dr. Smith"),
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CarebaseError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_failed_value_aborts_whole_create() {
        let f = setup().await;
        let err = f
            .service
            .create(
                f.scope,
                draft("Ada", "Lovelace"),
                vec![home_address()],
                vec![
                    text_submission(f.text_field, "Dr. Jones"),
                    number_submission(f.number_field, "10000000000000"),
                ],
            )
            .await;
        assert!(err.is_err());
        assert!(f.service.list(f.scope).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_supplied_children_only() {
        let f = setup().await;
        let record = f
            .service
            .create(
                f.scope,
                draft("Ada", "Lovelace"),
                vec![home_address()],
                vec![number_submission(f.number_field, "3")],
            )
            .await
            .unwrap();

        // Replace the values, leave the addresses untouched.
        let updated = f
            .service
            .update(
                f.scope,
                record.patient.id,
                draft("Ada", "King"),
                None,
                Some(vec![number_submission(f.number_field, "4")]),
            )
            .await
            .unwrap();

        assert_eq!(updated.patient.last_name, "King");
        assert_eq!(updated.addresses, record.addresses);
        assert_eq!(
            updated.custom_field_values[0].value,
            FieldValue::Number(Decimal::from_str("4").unwrap())
        );
    }

    #[tokio::test]
    async fn test_update_with_empty_vec_clears_children() {
        let f = setup().await;
        let record = f
            .service
            .create(
                f.scope,
                draft("Ada", "Lovelace"),
                vec![home_address()],
                vec![number_submission(f.number_field, "3")],
            )
            .await
            .unwrap();

        let updated = f
            .service
            .update(
                f.scope,
                record.patient.id,
                draft("Ada", "Lovelace"),
                Some(vec![]),
                Some(vec![]),
            )
            .await
            .unwrap();

        assert!(updated.addresses.is_empty());
        assert!(updated.custom_field_values.is_empty());
    }

    #[tokio::test]
    async fn test_foreign_patient_is_invisible() {
        let f = setup().await;
        let record = f
            .service
            .create(
                f.scope,
                draft("Ada", "Lovelace"),
                vec![home_address()],
                vec![],
            )
            .await
            .unwrap();

        let err = f
            .service
            .get(f.other_scope, record.patient.id)
            .await
            .unwrap_err();
        assert!(matches!(err, CarebaseError::NotFound("patient")));

        let err = f
            .service
            .delete(f.other_scope, record.patient.id)
            .await
            .unwrap_err();
        assert!(matches!(err, CarebaseError::NotFound("patient")));
        assert!(f.service.get(f.scope, record.patient.id).await.is_ok());
    }
}
