//! In-memory store implementation
//!
//! Implements the store traits over plain maps behind a mutex. Used by the
//! service-level tests and the seed command's `--dry-run` mode; behaviour
//! mirrors the PostgreSQL implementation, including uniqueness conflicts and
//! cascade deletes, so tests exercise the same contract the database
//! enforces with constraints.

use crate::adapters::store::traits::{CustomFieldStore, PatientStore, ProviderStore};
use crate::domain::{
    CarebaseError, CustomFieldDefinition, CustomFieldDraft, CustomFieldId, CustomFieldUpdate,
    CustomFieldValue, NewProvider, PatientAddress, PatientDraft, PatientId, PatientRecord,
    Patient, Provider, ProviderAccount, ProviderId, ProviderProfile, ProviderScope, Result,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    providers: HashMap<i64, (Provider, String)>,
    custom_fields: HashMap<i64, CustomFieldDefinition>,
    patients: HashMap<i64, PatientRecord>,
}

impl Tables {
    fn allocate(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory implementation of all store traits
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProviderStore for MemoryStore {
    async fn create_provider(&self, new: NewProvider) -> Result<Provider> {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        if tables
            .providers
            .values()
            .any(|(p, _)| p.username == new.username)
        {
            return Err(CarebaseError::Conflict(format!(
                "username {:?} is already taken",
                new.username
            )));
        }
        let id = tables.allocate();
        let now = Utc::now();
        let provider = Provider {
            id: ProviderId::new(id).map_err(CarebaseError::Other)?,
            username: new.username,
            first_name: new.first_name,
            last_name: new.last_name,
            created_at: now,
            modified_at: now,
        };
        tables
            .providers
            .insert(id, (provider.clone(), new.password_hash));
        Ok(provider)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<ProviderAccount>> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        Ok(tables
            .providers
            .values()
            .find(|(p, _)| p.username == username)
            .map(|(p, hash)| ProviderAccount {
                provider: p.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn get_provider(&self, id: ProviderId) -> Result<Provider> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        tables
            .providers
            .get(&id.as_i64())
            .map(|(p, _)| p.clone())
            .ok_or(CarebaseError::NotFound("provider"))
    }

    async fn update_profile(&self, id: ProviderId, profile: ProviderProfile) -> Result<Provider> {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        let entry = tables
            .providers
            .get_mut(&id.as_i64())
            .ok_or(CarebaseError::NotFound("provider"))?;
        entry.0.first_name = profile.first_name;
        entry.0.last_name = profile.last_name;
        entry.0.modified_at = Utc::now();
        Ok(entry.0.clone())
    }

    async fn update_password_hash(&self, id: ProviderId, password_hash: &str) -> Result<()> {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        let entry = tables
            .providers
            .get_mut(&id.as_i64())
            .ok_or(CarebaseError::NotFound("provider"))?;
        entry.1 = password_hash.to_string();
        entry.0.modified_at = Utc::now();
        Ok(())
    }

    async fn delete_provider(&self, id: ProviderId) -> Result<()> {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        if tables.providers.remove(&id.as_i64()).is_none() {
            return Err(CarebaseError::NotFound("provider"));
        }
        // Cascade, the way the schema's ON DELETE CASCADE would.
        tables.custom_fields.retain(|_, f| f.provider_id != id);
        tables.patients.retain(|_, r| r.patient.provider_id != id);
        Ok(())
    }
}

#[async_trait]
impl CustomFieldStore for MemoryStore {
    async fn create_custom_field(
        &self,
        scope: ProviderScope,
        draft: CustomFieldDraft,
    ) -> Result<CustomFieldDefinition> {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        if tables
            .custom_fields
            .values()
            .any(|f| f.provider_id == scope.provider_id() && f.name == draft.name)
        {
            return Err(CarebaseError::Conflict(format!(
                "custom field {:?} already exists for this provider",
                draft.name
            )));
        }
        let id = tables.allocate();
        let now = Utc::now();
        let definition = CustomFieldDefinition {
            id: CustomFieldId::new(id).map_err(CarebaseError::Other)?,
            provider_id: scope.provider_id(),
            name: draft.name,
            field_type: draft.field_type,
            description: draft.description,
            created_at: now,
            modified_at: now,
        };
        tables.custom_fields.insert(id, definition.clone());
        Ok(definition)
    }

    async fn list_custom_fields(&self, scope: ProviderScope) -> Result<Vec<CustomFieldDefinition>> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        let mut fields: Vec<_> = tables
            .custom_fields
            .values()
            .filter(|f| f.provider_id == scope.provider_id())
            .cloned()
            .collect();
        fields.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(fields)
    }

    async fn get_custom_field(
        &self,
        scope: ProviderScope,
        id: CustomFieldId,
    ) -> Result<CustomFieldDefinition> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        tables
            .custom_fields
            .get(&id.as_i64())
            .filter(|f| f.provider_id == scope.provider_id())
            .cloned()
            .ok_or(CarebaseError::NotFound("custom field"))
    }

    async fn update_custom_field(
        &self,
        scope: ProviderScope,
        id: CustomFieldId,
        update: CustomFieldUpdate,
    ) -> Result<CustomFieldDefinition> {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        if tables.custom_fields.values().any(|f| {
            f.provider_id == scope.provider_id() && f.name == update.name && f.id != id
        }) {
            return Err(CarebaseError::Conflict(format!(
                "custom field {:?} already exists for this provider",
                update.name
            )));
        }
        let field = tables
            .custom_fields
            .get_mut(&id.as_i64())
            .filter(|f| f.provider_id == scope.provider_id())
            .ok_or(CarebaseError::NotFound("custom field"))?;
        field.name = update.name;
        field.description = update.description;
        field.modified_at = Utc::now();
        Ok(field.clone())
    }

    async fn delete_custom_field(&self, scope: ProviderScope, id: CustomFieldId) -> Result<()> {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        let owned = tables
            .custom_fields
            .get(&id.as_i64())
            .map(|f| f.provider_id == scope.provider_id())
            .unwrap_or(false);
        if !owned {
            return Err(CarebaseError::NotFound("custom field"));
        }
        tables.custom_fields.remove(&id.as_i64());
        // Cascade delete of values referencing the definition.
        for record in tables.patients.values_mut() {
            record.custom_field_values.retain(|v| v.custom_field != id);
        }
        Ok(())
    }
}

#[async_trait]
impl PatientStore for MemoryStore {
    async fn create_patient(
        &self,
        scope: ProviderScope,
        draft: PatientDraft,
        addresses: Vec<PatientAddress>,
        values: Vec<CustomFieldValue>,
    ) -> Result<PatientRecord> {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        check_unique_definitions(&values)?;
        let id = tables.allocate();
        let now = Utc::now();
        let record = PatientRecord {
            patient: Patient {
                id: PatientId::new(id).map_err(CarebaseError::Other)?,
                provider_id: scope.provider_id(),
                first_name: draft.first_name,
                middle_name: draft.middle_name,
                last_name: draft.last_name,
                date_of_birth: draft.date_of_birth,
                status: draft.status,
                created_at: now,
                modified_at: now,
            },
            addresses,
            custom_field_values: values,
        };
        tables.patients.insert(id, record.clone());
        Ok(record)
    }

    async fn list_patients(&self, scope: ProviderScope) -> Result<Vec<PatientRecord>> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        let mut records: Vec<_> = tables
            .patients
            .values()
            .filter(|r| r.patient.provider_id == scope.provider_id())
            .cloned()
            .collect();
        records.sort_by(|a, b| b.patient.id.cmp(&a.patient.id));
        Ok(records)
    }

    async fn get_patient(&self, scope: ProviderScope, id: PatientId) -> Result<PatientRecord> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        tables
            .patients
            .get(&id.as_i64())
            .filter(|r| r.patient.provider_id == scope.provider_id())
            .cloned()
            .ok_or(CarebaseError::NotFound("patient"))
    }

    async fn update_patient(
        &self,
        scope: ProviderScope,
        id: PatientId,
        draft: PatientDraft,
        addresses: Option<Vec<PatientAddress>>,
        values: Option<Vec<CustomFieldValue>>,
    ) -> Result<PatientRecord> {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        if let Some(values) = &values {
            check_unique_definitions(values)?;
        }
        let record = tables
            .patients
            .get_mut(&id.as_i64())
            .filter(|r| r.patient.provider_id == scope.provider_id())
            .ok_or(CarebaseError::NotFound("patient"))?;
        record.patient.first_name = draft.first_name;
        record.patient.middle_name = draft.middle_name;
        record.patient.last_name = draft.last_name;
        record.patient.date_of_birth = draft.date_of_birth;
        record.patient.status = draft.status;
        record.patient.modified_at = Utc::now();
        if let Some(addresses) = addresses {
            record.addresses = addresses;
        }
        if let Some(values) = values {
            record.custom_field_values = values;
        }
        Ok(record.clone())
    }

    async fn delete_patient(&self, scope: ProviderScope, id: PatientId) -> Result<()> {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        let owned = tables
            .patients
            .get(&id.as_i64())
            .map(|r| r.patient.provider_id == scope.provider_id())
            .unwrap_or(false);
        if !owned {
            return Err(CarebaseError::NotFound("patient"));
        }
        tables.patients.remove(&id.as_i64());
        Ok(())
    }
}

/// Rejects two values targeting the same definition, mirroring the
/// `(patient, custom_field)` unique constraint.
fn check_unique_definitions(values: &[CustomFieldValue]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for value in values {
        if !seen.insert(value.custom_field) {
            return Err(CarebaseError::Conflict(format!(
                "duplicate value for custom field {}",
                value.custom_field
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomFieldType, FieldValue};
    use chrono::NaiveDate;

    fn draft(first: &str) -> PatientDraft {
        PatientDraft {
            first_name: first.to_string(),
            middle_name: None,
            last_name: "Tester".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            status: Default::default(),
        }
    }

    async fn provider(store: &MemoryStore, username: &str) -> ProviderScope {
        let provider = store
            .create_provider(NewProvider {
                username: username.to_string(),
                first_name: String::new(),
                last_name: String::new(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        ProviderScope::new(provider.id)
    }

    #[tokio::test]
    async fn test_username_conflict() {
        let store = MemoryStore::new();
        provider(&store, "a").await;
        let err = store
            .create_provider(NewProvider {
                username: "a".to_string(),
                first_name: String::new(),
                last_name: String::new(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CarebaseError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_scoped_get_hides_foreign_patients() {
        let store = MemoryStore::new();
        let scope_a = provider(&store, "a").await;
        let scope_b = provider(&store, "b").await;
        let record = store
            .create_patient(scope_a, draft("Ada"), vec![], vec![])
            .await
            .unwrap();
        let err = store
            .get_patient(scope_b, record.patient.id)
            .await
            .unwrap_err();
        assert!(matches!(err, CarebaseError::NotFound("patient")));
    }

    #[tokio::test]
    async fn test_definition_cascade_removes_values() {
        let store = MemoryStore::new();
        let scope = provider(&store, "a").await;
        let field = store
            .create_custom_field(
                scope,
                CustomFieldDraft {
                    name: "Visits".to_string(),
                    field_type: CustomFieldType::Number,
                    description: None,
                },
            )
            .await
            .unwrap();
        let record = store
            .create_patient(
                scope,
                draft("Ada"),
                vec![],
                vec![CustomFieldValue {
                    custom_field: field.id,
                    value: FieldValue::Number(0.into()),
                }],
            )
            .await
            .unwrap();
        store.delete_custom_field(scope, field.id).await.unwrap();
        let record = store.get_patient(scope, record.patient.id).await.unwrap();
        assert!(record.custom_field_values.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_value_conflict() {
        let store = MemoryStore::new();
        let scope = provider(&store, "a").await;
        let field = store
            .create_custom_field(
                scope,
                CustomFieldDraft {
                    name: "Visits".to_string(),
                    field_type: CustomFieldType::Number,
                    description: None,
                },
            )
            .await
            .unwrap();
        let dup = vec![
            CustomFieldValue {
                custom_field: field.id,
                value: FieldValue::Number(1.into()),
            },
            CustomFieldValue {
                custom_field: field.id,
                value: FieldValue::Number(2.into()),
            },
        ];
        let err = store
            .create_patient(scope, draft("Ada"), vec![], dup)
            .await
            .unwrap_err();
        assert!(matches!(err, CarebaseError::Conflict(_)));
    }
}
