//! PostgreSQL store implementation
//!
//! Implements the store traits on top of [`PostgresClient`]. Aggregate
//! writes run inside a single transaction; uniqueness conflicts are detected
//! by the schema's constraints and surfaced as `Conflict`, closing the race
//! window that an application-level pre-check alone would leave open.

use crate::adapters::postgres::client::PostgresClient;
use crate::adapters::store::traits::{CustomFieldStore, PatientStore, ProviderStore};
use crate::domain::{
    CarebaseError, CustomFieldDefinition, CustomFieldDraft, CustomFieldId, CustomFieldType,
    CustomFieldUpdate, CustomFieldValue, FieldValue, NewProvider, Patient, PatientAddress,
    PatientDraft, PatientId, PatientRecord, Provider, ProviderAccount, ProviderId,
    ProviderProfile, ProviderScope, Result, UsState,
};
use crate::domain::{AddressType, PatientStatus};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio_postgres::error::SqlState;
use tokio_postgres::Row;

/// PostgreSQL implementation of the store traits
pub struct PostgresStore {
    client: Arc<PostgresClient>,
}

impl PostgresStore {
    /// Create a new store over a client
    pub fn new(client: PostgresClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Create a new store over an Arc-wrapped client
    pub fn new_with_arc(client: Arc<PostgresClient>) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgresClient> {
        &self.client
    }
}

/// Translate a driver error into the domain taxonomy
///
/// Unique-constraint violations become `Conflict`; foreign-key violations
/// become scoped `NotFound` (the referenced row vanished or never existed
/// for this caller); everything else is a generic database failure.
fn map_db_error(context: &str, err: tokio_postgres::Error) -> CarebaseError {
    if let Some(db_err) = err.as_db_error() {
        if db_err.code() == &SqlState::UNIQUE_VIOLATION {
            return CarebaseError::Conflict(format!("{context}: {}", db_err.message()));
        }
        if db_err.code() == &SqlState::FOREIGN_KEY_VIOLATION {
            return CarebaseError::NotFound("custom field");
        }
    }
    CarebaseError::Database(format!("{context}: {err}"))
}

fn row_to_provider(row: &Row) -> Result<Provider> {
    Ok(Provider {
        id: ProviderId::new(row.get("id")).map_err(CarebaseError::Database)?,
        username: row.get("username"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        created_at: row.get("created_at"),
        modified_at: row.get("modified_at"),
    })
}

fn row_to_custom_field(row: &Row) -> Result<CustomFieldDefinition> {
    let field_type: String = row.get("field_type");
    Ok(CustomFieldDefinition {
        id: CustomFieldId::new(row.get("id")).map_err(CarebaseError::Database)?,
        provider_id: ProviderId::new(row.get("provider_id")).map_err(CarebaseError::Database)?,
        name: row.get("name"),
        field_type: CustomFieldType::parse(&field_type).map_err(CarebaseError::Database)?,
        description: row.get("description"),
        created_at: row.get("created_at"),
        modified_at: row.get("modified_at"),
    })
}

fn row_to_patient(row: &Row) -> Result<Patient> {
    let status: String = row.get("status");
    Ok(Patient {
        id: PatientId::new(row.get("id")).map_err(CarebaseError::Database)?,
        provider_id: ProviderId::new(row.get("provider_id")).map_err(CarebaseError::Database)?,
        first_name: row.get("first_name"),
        middle_name: row.get("middle_name"),
        last_name: row.get("last_name"),
        date_of_birth: row.get("date_of_birth"),
        status: PatientStatus::parse(&status).map_err(CarebaseError::Database)?,
        created_at: row.get("created_at"),
        modified_at: row.get("modified_at"),
    })
}

fn row_to_address(row: &Row) -> Result<PatientAddress> {
    let address_type: String = row.get("address_type");
    let state: String = row.get("state");
    Ok(PatientAddress {
        address_type: AddressType::parse(&address_type).map_err(CarebaseError::Database)?,
        street_address: row.get("street_address"),
        city: row.get("city"),
        state: UsState::parse(&state).map_err(CarebaseError::Database)?,
        postal_code: row.get("postal_code"),
        is_primary: row.get("is_primary"),
        created_at: row.get("created_at"),
        modified_at: row.get("modified_at"),
    })
}

/// Reassemble the tagged value from the two storage columns plus the joined
/// definition type. A row violating the invariant can only mean the schema
/// CHECK was bypassed, so it is reported as a database error.
fn row_to_value(row: &Row) -> Result<CustomFieldValue> {
    let custom_field =
        CustomFieldId::new(row.get("custom_field_id")).map_err(CarebaseError::Database)?;
    let field_type: String = row.get("field_type");
    let field_type = CustomFieldType::parse(&field_type).map_err(CarebaseError::Database)?;
    let text_value: Option<String> = row.get("text_value");
    let number_value: Option<Decimal> = row.get("number_value");

    let value = match (field_type, text_value, number_value) {
        (CustomFieldType::Text, Some(text), None) => FieldValue::Text(text),
        (CustomFieldType::Number, None, Some(number)) => FieldValue::Number(number),
        _ => {
            return Err(CarebaseError::Database(format!(
                "value for custom field {custom_field} violates the type invariant"
            )))
        }
    };

    Ok(CustomFieldValue {
        custom_field,
        value,
    })
}

const PROVIDER_COLUMNS: &str = "id, username, first_name, last_name, created_at, modified_at";
const CUSTOM_FIELD_COLUMNS: &str =
    "id, provider_id, name, field_type, description, created_at, modified_at";
const PATIENT_COLUMNS: &str = "id, provider_id, first_name, middle_name, last_name, \
     date_of_birth, status, created_at, modified_at";

#[async_trait]
impl ProviderStore for PostgresStore {
    async fn create_provider(&self, new: NewProvider) -> Result<Provider> {
        let query = format!(
            "INSERT INTO providers (username, first_name, last_name, password_hash) \
             VALUES ($1, $2, $3, $4) RETURNING {PROVIDER_COLUMNS}"
        );
        let client = self.client.get_connection().await?;
        let row = client
            .query_one(
                &query,
                &[
                    &new.username,
                    &new.first_name,
                    &new.last_name,
                    &new.password_hash,
                ],
            )
            .await
            .map_err(|e| map_db_error("create provider", e))?;
        row_to_provider(&row)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<ProviderAccount>> {
        let query = format!(
            "SELECT {PROVIDER_COLUMNS}, password_hash FROM providers WHERE username = $1"
        );
        let rows = self.client.query(&query, &[&username]).await?;
        match rows.first() {
            Some(row) => Ok(Some(ProviderAccount {
                provider: row_to_provider(row)?,
                password_hash: row.get("password_hash"),
            })),
            None => Ok(None),
        }
    }

    async fn get_provider(&self, id: ProviderId) -> Result<Provider> {
        let query = format!("SELECT {PROVIDER_COLUMNS} FROM providers WHERE id = $1");
        let rows = self.client.query(&query, &[&id.as_i64()]).await?;
        match rows.first() {
            Some(row) => row_to_provider(row),
            None => Err(CarebaseError::NotFound("provider")),
        }
    }

    async fn update_profile(&self, id: ProviderId, profile: ProviderProfile) -> Result<Provider> {
        let query = format!(
            "UPDATE providers SET first_name = $2, last_name = $3, modified_at = now() \
             WHERE id = $1 RETURNING {PROVIDER_COLUMNS}"
        );
        let rows = self
            .client
            .query(
                &query,
                &[&id.as_i64(), &profile.first_name, &profile.last_name],
            )
            .await?;
        match rows.first() {
            Some(row) => row_to_provider(row),
            None => Err(CarebaseError::NotFound("provider")),
        }
    }

    async fn update_password_hash(&self, id: ProviderId, password_hash: &str) -> Result<()> {
        let client = self.client.get_connection().await?;
        let updated = client
            .execute(
                "UPDATE providers SET password_hash = $2, modified_at = now() WHERE id = $1",
                &[&id.as_i64(), &password_hash],
            )
            .await
            .map_err(|e| map_db_error("update password", e))?;
        if updated == 0 {
            return Err(CarebaseError::NotFound("provider"));
        }
        Ok(())
    }

    async fn delete_provider(&self, id: ProviderId) -> Result<()> {
        let client = self.client.get_connection().await?;
        // Patients, addresses, definitions and values go with the provider
        // via ON DELETE CASCADE.
        let deleted = client
            .execute("DELETE FROM providers WHERE id = $1", &[&id.as_i64()])
            .await
            .map_err(|e| map_db_error("delete provider", e))?;
        if deleted == 0 {
            return Err(CarebaseError::NotFound("provider"));
        }
        tracing::info!(provider_id = %id, "Provider account deleted");
        Ok(())
    }
}

#[async_trait]
impl CustomFieldStore for PostgresStore {
    async fn create_custom_field(
        &self,
        scope: ProviderScope,
        draft: CustomFieldDraft,
    ) -> Result<CustomFieldDefinition> {
        let query = format!(
            "INSERT INTO custom_fields (provider_id, name, field_type, description) \
             VALUES ($1, $2, $3, $4) RETURNING {CUSTOM_FIELD_COLUMNS}"
        );
        let client = self.client.get_connection().await?;
        let row = client
            .query_one(
                &query,
                &[
                    &scope.provider_id().as_i64(),
                    &draft.name,
                    &draft.field_type.as_str(),
                    &draft.description,
                ],
            )
            .await
            .map_err(|e| map_db_error("create custom field", e))?;
        row_to_custom_field(&row)
    }

    async fn list_custom_fields(&self, scope: ProviderScope) -> Result<Vec<CustomFieldDefinition>> {
        let query = format!(
            "SELECT {CUSTOM_FIELD_COLUMNS} FROM custom_fields \
             WHERE provider_id = $1 ORDER BY name"
        );
        let rows = self
            .client
            .query(&query, &[&scope.provider_id().as_i64()])
            .await?;
        rows.iter().map(row_to_custom_field).collect()
    }

    async fn get_custom_field(
        &self,
        scope: ProviderScope,
        id: CustomFieldId,
    ) -> Result<CustomFieldDefinition> {
        let query = format!(
            "SELECT {CUSTOM_FIELD_COLUMNS} FROM custom_fields \
             WHERE id = $1 AND provider_id = $2"
        );
        let rows = self
            .client
            .query(&query, &[&id.as_i64(), &scope.provider_id().as_i64()])
            .await?;
        match rows.first() {
            Some(row) => row_to_custom_field(row),
            None => Err(CarebaseError::NotFound("custom field")),
        }
    }

    async fn update_custom_field(
        &self,
        scope: ProviderScope,
        id: CustomFieldId,
        update: CustomFieldUpdate,
    ) -> Result<CustomFieldDefinition> {
        let query = format!(
            "UPDATE custom_fields SET name = $3, description = $4, modified_at = now() \
             WHERE id = $1 AND provider_id = $2 RETURNING {CUSTOM_FIELD_COLUMNS}"
        );
        let client = self.client.get_connection().await?;
        let rows = client
            .query(
                &query,
                &[
                    &id.as_i64(),
                    &scope.provider_id().as_i64(),
                    &update.name,
                    &update.description,
                ],
            )
            .await
            .map_err(|e| map_db_error("update custom field", e))?;
        match rows.first() {
            Some(row) => row_to_custom_field(row),
            None => Err(CarebaseError::NotFound("custom field")),
        }
    }

    async fn delete_custom_field(&self, scope: ProviderScope, id: CustomFieldId) -> Result<()> {
        let client = self.client.get_connection().await?;
        // Values referencing the definition go with it via ON DELETE CASCADE.
        let deleted = client
            .execute(
                "DELETE FROM custom_fields WHERE id = $1 AND provider_id = $2",
                &[&id.as_i64(), &scope.provider_id().as_i64()],
            )
            .await
            .map_err(|e| map_db_error("delete custom field", e))?;
        if deleted == 0 {
            return Err(CarebaseError::NotFound("custom field"));
        }
        Ok(())
    }
}

impl PostgresStore {
    /// Insert child rows for a patient inside an open transaction
    async fn insert_children(
        tx: &tokio_postgres::Transaction<'_>,
        patient_id: i64,
        addresses: &[PatientAddress],
        values: &[CustomFieldValue],
    ) -> Result<()> {
        for address in addresses {
            tx.execute(
                "INSERT INTO patient_addresses \
                 (patient_id, address_type, street_address, city, state, postal_code, \
                  is_primary, created_at, modified_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                &[
                    &patient_id,
                    &address.address_type.as_str(),
                    &address.street_address,
                    &address.city,
                    &address.state.as_str(),
                    &address.postal_code,
                    &address.is_primary,
                    &address.created_at,
                    &address.modified_at,
                ],
            )
            .await
            .map_err(|e| map_db_error("insert address", e))?;
        }

        for value in values {
            let (text_value, number_value) = value.value.columns();
            tx.execute(
                "INSERT INTO patient_custom_field_values \
                 (patient_id, custom_field_id, text_value, number_value) \
                 VALUES ($1, $2, $3, $4)",
                &[
                    &patient_id,
                    &value.custom_field.as_i64(),
                    &text_value,
                    &number_value,
                ],
            )
            .await
            .map_err(|e| map_db_error("insert custom field value", e))?;
        }

        Ok(())
    }

    /// Load child collections for a patient inside an open transaction
    async fn load_children(
        tx: &tokio_postgres::Transaction<'_>,
        patient_id: i64,
    ) -> Result<(Vec<PatientAddress>, Vec<CustomFieldValue>)> {
        let address_rows = tx
            .query(
                "SELECT address_type, street_address, city, state, postal_code, is_primary, \
                        created_at, modified_at \
                 FROM patient_addresses WHERE patient_id = $1 ORDER BY id",
                &[&patient_id],
            )
            .await
            .map_err(|e| map_db_error("load addresses", e))?;
        let addresses = address_rows
            .iter()
            .map(row_to_address)
            .collect::<Result<Vec<_>>>()?;

        let value_rows = tx
            .query(
                "SELECT v.custom_field_id, v.text_value, v.number_value, f.field_type \
                 FROM patient_custom_field_values v \
                 JOIN custom_fields f ON f.id = v.custom_field_id \
                 WHERE v.patient_id = $1 ORDER BY v.id",
                &[&patient_id],
            )
            .await
            .map_err(|e| map_db_error("load custom field values", e))?;
        let values = value_rows
            .iter()
            .map(row_to_value)
            .collect::<Result<Vec<_>>>()?;

        Ok((addresses, values))
    }
}

#[async_trait]
impl PatientStore for PostgresStore {
    async fn create_patient(
        &self,
        scope: ProviderScope,
        draft: PatientDraft,
        addresses: Vec<PatientAddress>,
        values: Vec<CustomFieldValue>,
    ) -> Result<PatientRecord> {
        let mut conn = self.client.get_connection().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| map_db_error("begin transaction", e))?;

        let query = format!(
            "INSERT INTO patients \
             (provider_id, first_name, middle_name, last_name, date_of_birth, status) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {PATIENT_COLUMNS}"
        );
        let row = tx
            .query_one(
                &query,
                &[
                    &scope.provider_id().as_i64(),
                    &draft.first_name,
                    &draft.middle_name,
                    &draft.last_name,
                    &draft.date_of_birth,
                    &draft.status.as_str(),
                ],
            )
            .await
            .map_err(|e| map_db_error("create patient", e))?;
        let patient = row_to_patient(&row)?;

        Self::insert_children(&tx, patient.id.as_i64(), &addresses, &values).await?;

        tx.commit()
            .await
            .map_err(|e| map_db_error("commit patient create", e))?;

        tracing::debug!(
            patient_id = %patient.id,
            provider_id = %scope.provider_id(),
            addresses = addresses.len(),
            custom_field_values = values.len(),
            "Patient aggregate created"
        );

        Ok(PatientRecord {
            patient,
            addresses,
            custom_field_values: values,
        })
    }

    async fn list_patients(&self, scope: ProviderScope) -> Result<Vec<PatientRecord>> {
        let mut conn = self.client.get_connection().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| map_db_error("begin transaction", e))?;

        let query = format!(
            "SELECT {PATIENT_COLUMNS} FROM patients WHERE provider_id = $1 ORDER BY id DESC"
        );
        let rows = tx
            .query(&query, &[&scope.provider_id().as_i64()])
            .await
            .map_err(|e| map_db_error("list patients", e))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let patient = row_to_patient(row)?;
            let (addresses, custom_field_values) =
                Self::load_children(&tx, patient.id.as_i64()).await?;
            records.push(PatientRecord {
                patient,
                addresses,
                custom_field_values,
            });
        }

        tx.commit()
            .await
            .map_err(|e| map_db_error("commit patient list", e))?;

        Ok(records)
    }

    async fn get_patient(&self, scope: ProviderScope, id: PatientId) -> Result<PatientRecord> {
        let mut conn = self.client.get_connection().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| map_db_error("begin transaction", e))?;

        let query = format!(
            "SELECT {PATIENT_COLUMNS} FROM patients WHERE id = $1 AND provider_id = $2"
        );
        let rows = tx
            .query(&query, &[&id.as_i64(), &scope.provider_id().as_i64()])
            .await
            .map_err(|e| map_db_error("get patient", e))?;
        let row = rows.first().ok_or(CarebaseError::NotFound("patient"))?;
        let patient = row_to_patient(row)?;
        let (addresses, custom_field_values) =
            Self::load_children(&tx, patient.id.as_i64()).await?;

        tx.commit()
            .await
            .map_err(|e| map_db_error("commit patient read", e))?;

        Ok(PatientRecord {
            patient,
            addresses,
            custom_field_values,
        })
    }

    async fn update_patient(
        &self,
        scope: ProviderScope,
        id: PatientId,
        draft: PatientDraft,
        addresses: Option<Vec<PatientAddress>>,
        values: Option<Vec<CustomFieldValue>>,
    ) -> Result<PatientRecord> {
        let mut conn = self.client.get_connection().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| map_db_error("begin transaction", e))?;

        let query = format!(
            "UPDATE patients SET first_name = $3, middle_name = $4, last_name = $5, \
             date_of_birth = $6, status = $7, modified_at = now() \
             WHERE id = $1 AND provider_id = $2 RETURNING {PATIENT_COLUMNS}"
        );
        let rows = tx
            .query(
                &query,
                &[
                    &id.as_i64(),
                    &scope.provider_id().as_i64(),
                    &draft.first_name,
                    &draft.middle_name,
                    &draft.last_name,
                    &draft.date_of_birth,
                    &draft.status.as_str(),
                ],
            )
            .await
            .map_err(|e| map_db_error("update patient", e))?;
        let row = rows.first().ok_or(CarebaseError::NotFound("patient"))?;
        let patient = row_to_patient(row)?;

        // Replace-on-update: a supplied collection wipes and recreates the
        // stored children; an omitted one is left alone. Both paths stay in
        // this transaction, so a failed recreate rolls the deletion back.
        let addresses = match addresses {
            Some(addresses) => {
                tx.execute(
                    "DELETE FROM patient_addresses WHERE patient_id = $1",
                    &[&id.as_i64()],
                )
                .await
                .map_err(|e| map_db_error("replace addresses", e))?;
                Self::insert_children(&tx, id.as_i64(), &addresses, &[]).await?;
                addresses
            }
            None => Self::load_children(&tx, id.as_i64()).await?.0,
        };

        let custom_field_values = match values {
            Some(values) => {
                tx.execute(
                    "DELETE FROM patient_custom_field_values WHERE patient_id = $1",
                    &[&id.as_i64()],
                )
                .await
                .map_err(|e| map_db_error("replace custom field values", e))?;
                Self::insert_children(&tx, id.as_i64(), &[], &values).await?;
                values
            }
            None => Self::load_children(&tx, id.as_i64()).await?.1,
        };

        tx.commit()
            .await
            .map_err(|e| map_db_error("commit patient update", e))?;

        tracing::debug!(
            patient_id = %id,
            provider_id = %scope.provider_id(),
            "Patient aggregate updated"
        );

        Ok(PatientRecord {
            patient,
            addresses,
            custom_field_values,
        })
    }

    async fn delete_patient(&self, scope: ProviderScope, id: PatientId) -> Result<()> {
        let client = self.client.get_connection().await?;
        // Addresses and values go with the patient via ON DELETE CASCADE.
        let deleted = client
            .execute(
                "DELETE FROM patients WHERE id = $1 AND provider_id = $2",
                &[&id.as_i64(), &scope.provider_id().as_i64()],
            )
            .await
            .map_err(|e| map_db_error("delete patient", e))?;
        if deleted == 0 {
            return Err(CarebaseError::NotFound("patient"));
        }
        Ok(())
    }
}
