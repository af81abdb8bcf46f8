//! Seed command implementation
//!
//! Populates demo providers, custom field definitions, and patients so a
//! fresh install has data to explore. With `--dry-run` everything happens
//! in memory and nothing touches the database.

use crate::adapters::postgres::{PostgresClient, PostgresStore};
use crate::adapters::store::{CustomFieldStore, MemoryStore, PatientStore, ProviderStore};
use crate::config::load_config;
use crate::core::{AccountService, SignUpRequest};
use crate::domain::{
    AddressType, CarebaseError, CustomFieldDefinition, CustomFieldDraft, CustomFieldType,
    PatientAddress, PatientDraft, PatientStatus, Provider, ProviderScope, UsState,
    ValueSubmission,
};
use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::Args;
use fake::faker::address::en::CityName;
use fake::faker::address::en::StreetName;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use std::sync::Arc;

const DEMO_PASSWORD: &str = "carebase-demo";
const DEMO_USERNAMES: [&str; 2] = ["drsmith", "drjones"];

/// Arguments for the seed command
#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Number of patients to create per provider
    #[arg(long, default_value_t = 10)]
    pub patients: usize,

    /// Build the dataset in memory without writing to the database
    #[arg(long)]
    pub dry_run: bool,
}

/// The three store facets the seeder writes through
struct SeedStores {
    providers: Arc<dyn ProviderStore>,
    custom_fields: Arc<dyn CustomFieldStore>,
    patients: Arc<dyn PatientStore>,
}

impl SeedArgs {
    /// Execute the seed command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = load_config(config_path)?;

        println!("🌱 Seeding demo data...");
        if self.dry_run {
            println!("   (dry run: using an in-memory store)");
        }

        let stores = if self.dry_run {
            let store = Arc::new(MemoryStore::new());
            SeedStores {
                providers: store.clone(),
                custom_fields: store.clone(),
                patients: store,
            }
        } else {
            let client = PostgresClient::new(config.database.clone()).await?;
            client.test_connection().await?;
            client.ensure_schema().await?;
            let store = Arc::new(PostgresStore::new(client));
            SeedStores {
                providers: store.clone(),
                custom_fields: store.clone(),
                patients: store,
            }
        };

        let accounts = AccountService::new(
            stores.providers.clone(),
            config.auth.bcrypt_cost,
            config.auth.min_password_length,
        );

        let mut total_patients = 0;
        for username in DEMO_USERNAMES {
            let provider = demo_provider(&accounts, username).await?;
            let scope = ProviderScope::new(provider.id);

            let fields = demo_custom_fields(&stores, scope).await?;
            println!(
                "   👤 {} (password: {DEMO_PASSWORD}), {} custom fields",
                provider.username,
                fields.len()
            );

            for _ in 0..self.patients {
                seed_patient(&stores, scope, &fields).await?;
                total_patients += 1;
            }
        }

        println!("✅ Seeded {} providers, {total_patients} patients", DEMO_USERNAMES.len());
        Ok(0)
    }
}

/// Creates a demo provider, or signs into the existing one on a rerun
async fn demo_provider(accounts: &AccountService, username: &str) -> anyhow::Result<Provider> {
    let request = SignUpRequest {
        username: username.to_string(),
        password: DEMO_PASSWORD.to_string(),
        first_name: FirstName().fake(),
        last_name: LastName().fake(),
    };
    match accounts.sign_up(request).await {
        Ok(provider) => Ok(provider),
        Err(CarebaseError::Conflict(_)) => accounts
            .authenticate(username, DEMO_PASSWORD)
            .await
            .context("provider already exists with a different password"),
        Err(e) => Err(e.into()),
    }
}

/// Ensures the demo definitions exist and returns them
async fn demo_custom_fields(
    stores: &SeedStores,
    scope: ProviderScope,
) -> anyhow::Result<Vec<CustomFieldDefinition>> {
    let drafts = [
        CustomFieldDraft {
            name: "Referred By".to_string(),
            field_type: CustomFieldType::Text,
            description: Some("Who referred this patient to the practice".to_string()),
        },
        CustomFieldDraft {
            name: "Number of Visits".to_string(),
            field_type: CustomFieldType::Number,
            description: None,
        },
    ];

    for draft in drafts {
        match stores.custom_fields.create_custom_field(scope, draft).await {
            Ok(_) | Err(CarebaseError::Conflict(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(stores.custom_fields.list_custom_fields(scope).await?)
}

/// Creates one patient with an address and a value for each definition
async fn seed_patient(
    stores: &SeedStores,
    scope: ProviderScope,
    fields: &[CustomFieldDefinition],
) -> anyhow::Result<()> {
    let mut rng = rand::thread_rng();

    let draft = PatientDraft {
        first_name: FirstName().fake(),
        middle_name: None,
        last_name: LastName().fake(),
        date_of_birth: random_date_of_birth(&mut rng)?,
        status: *PatientStatus::ALL
            .choose(&mut rng)
            .context("empty status list")?,
    };

    let address = PatientAddress {
        address_type: AddressType::Home,
        street_address: format!("{} {}", rng.gen_range(1..2000), StreetName().fake::<String>()),
        city: CityName().fake(),
        state: *UsState::ALL.choose(&mut rng).context("empty state list")?,
        postal_code: format!("{:05}", rng.gen_range(10000..99999)),
        is_primary: true,
        created_at: Utc::now(),
        modified_at: Utc::now(),
    };

    let submissions = fields
        .iter()
        .map(|field| match field.field_type {
            CustomFieldType::Text => ValueSubmission {
                custom_field: field.id,
                text_value: Some(FirstName().fake()),
                number_value: None,
            },
            CustomFieldType::Number => ValueSubmission {
                custom_field: field.id,
                text_value: None,
                number_value: Some(Decimal::from(rng.gen_range(0..40))),
            },
        })
        .collect::<Vec<_>>();

    let values = submissions
        .into_iter()
        .map(|submission| {
            let field = fields
                .iter()
                .find(|f| f.id == submission.custom_field)
                .context("submission references an unknown definition")?;
            Ok(submission.into_value(field.field_type)?)
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    stores
        .patients
        .create_patient(scope, draft, vec![address], values)
        .await?;
    Ok(())
}

fn random_date_of_birth(rng: &mut impl Rng) -> anyhow::Result<NaiveDate> {
    let year = rng.gen_range(1940..2010);
    let month = rng.gen_range(1..=12);
    let day = rng.gen_range(1..=28);
    NaiveDate::from_ymd_opt(year, month, day).context("generated an invalid date")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_args_defaults() {
        let args = SeedArgs {
            patients: 10,
            dry_run: false,
        };
        assert_eq!(args.patients, 10);
        assert!(!args.dry_run);
    }

    #[tokio::test]
    async fn test_seed_into_memory_store() {
        let store = Arc::new(MemoryStore::new());
        let stores = SeedStores {
            providers: store.clone(),
            custom_fields: store.clone(),
            patients: store,
        };
        let accounts = AccountService::new(stores.providers.clone(), 4, 8);

        let provider = demo_provider(&accounts, "drsmith").await.unwrap();
        let scope = ProviderScope::new(provider.id);
        let fields = demo_custom_fields(&stores, scope).await.unwrap();
        assert_eq!(fields.len(), 2);

        for _ in 0..3 {
            seed_patient(&stores, scope, &fields).await.unwrap();
        }
        let patients = stores.patients.list_patients(scope).await.unwrap();
        assert_eq!(patients.len(), 3);
        for record in &patients {
            assert_eq!(record.addresses.len(), 1);
            assert_eq!(record.custom_field_values.len(), 2);
        }
    }

    #[tokio::test]
    async fn test_seed_is_rerunnable() {
        let store = Arc::new(MemoryStore::new());
        let stores = SeedStores {
            providers: store.clone(),
            custom_fields: store.clone(),
            patients: store,
        };
        let accounts = AccountService::new(stores.providers.clone(), 4, 8);

        let first = demo_provider(&accounts, "drjones").await.unwrap();
        let again = demo_provider(&accounts, "drjones").await.unwrap();
        assert_eq!(first.id, again.id);

        let scope = ProviderScope::new(first.id);
        demo_custom_fields(&stores, scope).await.unwrap();
        let fields = demo_custom_fields(&stores, scope).await.unwrap();
        assert_eq!(fields.len(), 2);
    }
}
