//! Seed data loading.
//!
//! The store starts empty; every process fills it once at startup from the
//! JSON seed files. The default files under `data/seed/` are compiled into
//! the binary, and `[seed]` paths in the config replace them per collection.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

use care_directory_core::models::{NewCity, NewFacility, NewResource};
use care_directory_core::store::memory::InMemoryStore;
use care_directory_core::store::Store;

use crate::config::SeedConfig;

const FACILITIES_JSON: &str = include_str!("../data/seed/facilities.json");
const CITIES_JSON: &str = include_str!("../data/seed/cities.json");
const RESOURCES_JSON: &str = include_str!("../data/seed/resources.json");

/// Parsed seed collections, ready to insert.
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub cities: Vec<NewCity>,
    pub facilities: Vec<NewFacility>,
    pub resources: Vec<NewResource>,
}

impl SeedData {
    /// The seed data compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::load(&SeedConfig::default())
    }

    pub fn load(config: &SeedConfig) -> Result<Self> {
        Ok(Self {
            cities: parse_collection("cities", config.cities.as_deref(), CITIES_JSON)?,
            facilities: parse_collection(
                "facilities",
                config.facilities.as_deref(),
                FACILITIES_JSON,
            )?,
            resources: parse_collection("resources", config.resources.as_deref(), RESOURCES_JSON)?,
        })
    }
}

fn parse_collection<T: DeserializeOwned>(
    name: &str,
    path: Option<&Path>,
    embedded: &str,
) -> Result<Vec<T>> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {} seed file: {}", name, path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {} seed file: {}", name, path.display()))
        }
        None => serde_json::from_str(embedded)
            .with_context(|| format!("Failed to parse embedded {} seed data", name)),
    }
}

/// Insert counts reported after seeding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedCounts {
    pub cities: usize,
    pub facilities: usize,
    pub resources: usize,
}

/// Insert `data` into `store`: cities first, then facilities, then resources.
///
/// Any record that fails validation aborts seeding.
pub async fn seed_store(store: &dyn Store, data: SeedData) -> Result<SeedCounts> {
    let mut counts = SeedCounts::default();

    for city in data.cities {
        let slug = city.slug.clone();
        store
            .create_city(city)
            .await
            .with_context(|| format!("Failed to seed city '{}'", slug))?;
        counts.cities += 1;
    }
    for facility in data.facilities {
        let slug = facility.slug.clone();
        store
            .create_facility(facility)
            .await
            .with_context(|| format!("Failed to seed facility '{}'", slug))?;
        counts.facilities += 1;
    }
    for resource in data.resources {
        let slug = resource.slug.clone();
        store
            .create_resource(resource)
            .await
            .with_context(|| format!("Failed to seed resource '{}'", slug))?;
        counts.resources += 1;
    }

    tracing::info!(
        cities = counts.cities,
        facilities = counts.facilities,
        resources = counts.resources,
        "seeded store"
    );
    Ok(counts)
}

/// A fresh in-memory store filled from the configured seed data.
pub async fn seeded_store(config: &SeedConfig) -> Result<Arc<InMemoryStore>> {
    let store = Arc::new(InMemoryStore::new());
    seed_store(store.as_ref(), SeedData::load(config)?).await?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use care_directory_core::models::ServiceType;
    use care_directory_core::query::FacilityFilter;
    use std::io::Write;

    #[tokio::test]
    async fn test_embedded_seed_loads() {
        let store = seeded_store(&SeedConfig::default()).await.unwrap();
        let facilities = store
            .list_facilities(&FacilityFilter::default())
            .await
            .unwrap();
        assert_eq!(facilities.len(), 6);
        assert_eq!(facilities[0].id, 1);
        assert_eq!(facilities[0].slug, "mountain-view-senior-living");

        let cities = store.cities().await.unwrap();
        assert_eq!(cities.len(), 10);
        let denver = cities.iter().find(|c| c.slug == "denver").unwrap();
        assert_eq!(denver.facility_count, 1);
        let thornton = cities.iter().find(|c| c.slug == "thornton").unwrap();
        assert_eq!(thornton.facility_count, 0);

        assert_eq!(store.resources(None, None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_embedded_seed_featured() {
        let store = seeded_store(&SeedConfig::default()).await.unwrap();
        let featured = store.featured_facilities(None).await.unwrap();
        assert_eq!(featured.len(), 3);
        assert!(featured.iter().all(|f| f.is_featured));

        let memory = store
            .list_facilities(&FacilityFilter::for_service_type(ServiceType::MemoryCare))
            .await
            .unwrap();
        assert_eq!(memory.len(), 1);
        assert_eq!(memory[0].city, "Boulder");
    }

    #[tokio::test]
    async fn test_file_override_replaces_collection() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"[{"name": "Pueblo", "slug": "pueblo", "state": "CO", "description": "Southern Colorado"}]"#,
        )
        .unwrap();
        let config = SeedConfig {
            cities: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let data = SeedData::load(&config).unwrap();
        assert_eq!(data.cities.len(), 1);
        assert_eq!(data.facilities.len(), 6);
    }

    #[tokio::test]
    async fn test_invalid_record_aborts_seeding() {
        let mut data = SeedData::embedded().unwrap();
        data.facilities[1].slug = data.facilities[0].slug.clone();
        let store = InMemoryStore::new();
        let err = seed_store(&store, data).await.unwrap_err();
        assert!(err.to_string().contains("Failed to seed facility"));
    }

    #[test]
    fn test_unreadable_override_is_an_error() {
        let config = SeedConfig {
            facilities: Some("/nonexistent/facilities.json".into()),
            ..Default::default()
        };
        assert!(SeedData::load(&config).is_err());
    }
}
