//! Custom field definition service
//!
//! Scope-checked CRUD over a provider's custom field definitions. The
//! service validates drafts before they reach storage; name uniqueness per
//! provider is enforced by the store.

use crate::adapters::store::CustomFieldStore;
use crate::domain::{
    CustomFieldDefinition, CustomFieldDraft, CustomFieldId, CustomFieldUpdate, ProviderScope,
    Result,
};
use std::sync::Arc;

/// Custom field definition operations
pub struct CustomFieldService {
    store: Arc<dyn CustomFieldStore>,
}

impl CustomFieldService {
    /// Create a new custom field service
    pub fn new(store: Arc<dyn CustomFieldStore>) -> Self {
        Self { store }
    }

    /// Create a definition owned by the scope's provider
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad name and `Conflict` if the
    /// provider already has a definition with this name.
    pub async fn create(
        &self,
        scope: ProviderScope,
        draft: CustomFieldDraft,
    ) -> Result<CustomFieldDefinition> {
        draft.validate()?;
        let definition = self.store.create_custom_field(scope, draft).await?;
        tracing::info!(
            custom_field_id = %definition.id,
            provider_id = %scope.provider_id(),
            field_type = %definition.field_type,
            "Custom field created"
        );
        Ok(definition)
    }

    /// List the scope's definitions
    pub async fn list(&self, scope: ProviderScope) -> Result<Vec<CustomFieldDefinition>> {
        self.store.list_custom_fields(scope).await
    }

    /// Fetch one definition within the scope
    pub async fn get(
        &self,
        scope: ProviderScope,
        id: CustomFieldId,
    ) -> Result<CustomFieldDefinition> {
        self.store.get_custom_field(scope, id).await
    }

    /// Rename or re-describe a definition
    ///
    /// The declared type is not part of the update surface; it is fixed at
    /// creation.
    pub async fn update(
        &self,
        scope: ProviderScope,
        id: CustomFieldId,
        update: CustomFieldUpdate,
    ) -> Result<CustomFieldDefinition> {
        update.validate()?;
        self.store.update_custom_field(scope, id, update).await
    }

    /// Delete a definition and every value referencing it
    pub async fn delete(&self, scope: ProviderScope, id: CustomFieldId) -> Result<()> {
        self.store.delete_custom_field(scope, id).await?;
        tracing::info!(
            custom_field_id = %id,
            provider_id = %scope.provider_id(),
            "Custom field deleted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::{MemoryStore, ProviderStore};
    use crate::domain::{CarebaseError, CustomFieldType, NewProvider};

    async fn setup() -> (CustomFieldService, ProviderScope, ProviderScope) {
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
        (CustomFieldService::new(store), scopes[0], scopes[1])
    }

    fn draft(name: &str, field_type: CustomFieldType) -> CustomFieldDraft {
        CustomFieldDraft {
            name: name.to_string(),
            field_type,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (service, scope, _) = setup().await;
        let created = service
            .create(scope, draft("Referred By", CustomFieldType::Text))
            .await
            .unwrap();
        let fetched = service.get(scope, created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let (service, scope, _) = setup().await;
        service
            .create(scope, draft("Referred By", CustomFieldType::Text))
            .await
            .unwrap();
        let err = service
            .create(scope, draft("Referred By", CustomFieldType::Number))
            .await
            .unwrap_err();
        assert!(matches!(err, CarebaseError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_same_name_allowed_across_providers() {
        let (service, scope_a, scope_b) = setup().await;
        service
            .create(scope_a, draft("Referred By", CustomFieldType::Text))
            .await
            .unwrap();
        assert!(service
            .create(scope_b, draft("Referred By", CustomFieldType::Text))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_foreign_definition_is_invisible() {
        let (service, scope_a, scope_b) = setup().await;
        let created = service
            .create(scope_a, draft("Number of Visits", CustomFieldType::Number))
            .await
            .unwrap();

        let err = service.get(scope_b, created.id).await.unwrap_err();
        assert!(matches!(err, CarebaseError::NotFound("custom field")));

        // Same answer as for an id that was never allocated.
        let missing = CustomFieldId::new(9999).unwrap();
        let err = service.get(scope_a, missing).await.unwrap_err();
        assert!(matches!(err, CarebaseError::NotFound("custom field")));
    }

    #[tokio::test]
    async fn test_update_keeps_type() {
        let (service, scope, _) = setup().await;
        let created = service
            .create(scope, draft("Visits", CustomFieldType::Number))
            .await
            .unwrap();
        let updated = service
            .update(
                scope,
                created.id,
                CustomFieldUpdate {
                    name: "Number of Visits".to_string(),
                    description: Some("Completed appointments".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Number of Visits");
        assert_eq!(updated.field_type, CustomFieldType::Number);
    }

    #[tokio::test]
    async fn test_list_is_scoped() {
        let (service, scope_a, scope_b) = setup().await;
        service
            .create(scope_a, draft("Referred By", CustomFieldType::Text))
            .await
            .unwrap();
        service
            .create(scope_b, draft("Insurance Plan", CustomFieldType::Text))
            .await
            .unwrap();

        let names: Vec<String> = service
            .list(scope_a)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Referred By".to_string()]);
    }

    #[tokio::test]
    async fn test_delete() {
        let (service, scope, _) = setup().await;
        let created = service
            .create(scope, draft("Referred By", CustomFieldType::Text))
            .await
            .unwrap();
        service.delete(scope, created.id).await.unwrap();
        assert!(service.get(scope, created.id).await.is_err());
    }
}
