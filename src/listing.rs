//! CLI read commands: `search`, `get`, `cities`, `service-types`.
//!
//! Each command seeds a fresh store from the configured seed data, runs one
//! query, and prints the result to stdout (plain text, or JSON with
//! `--json`).

use anyhow::{bail, Result};
use serde::Serialize;

use care_directory_core::catalog::service_types;
use care_directory_core::models::{Facility, ServiceType};
use care_directory_core::query::{FacilityFilter, SortKey};
use care_directory_core::store::Store;

use crate::config::Config;
use crate::seed::seeded_store;

/// Options of `care-dir search`, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct SearchArgs {
    pub city: Option<String>,
    pub service_type: Option<String>,
    pub search: Option<String>,
    pub amenities: Vec<String>,
    pub rating: Option<f64>,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    pub sort: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub json: bool,
}

impl SearchArgs {
    /// Unlike the HTTP query string, the CLI rejects values it cannot use.
    pub fn to_filter(&self) -> Result<FacilityFilter> {
        let service_type = match &self.service_type {
            Some(t) => Some(t.parse::<ServiceType>()?),
            None => None,
        };
        let sort = match &self.sort {
            Some(s) => Some(s.parse::<SortKey>().map_err(anyhow::Error::msg)?),
            None => None,
        };
        Ok(FacilityFilter {
            city: self.city.clone(),
            service_type,
            search: self.search.clone(),
            amenities: self.amenities.clone(),
            rating: self.rating,
            min_price: self.min_price,
            max_price: self.max_price,
            sort,
            page: self.page,
            limit: self.limit,
        })
    }
}

pub async fn run_search(config: &Config, args: &SearchArgs) -> Result<()> {
    let filter = args.to_filter()?;
    let store = seeded_store(&config.seed).await?;
    let results = store.list_facilities(&filter).await?;

    if args.json {
        return print_json(&results);
    }
    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, facility) in results.iter().enumerate() {
        println!(
            "{}. {} [{}] {}, {}",
            i + 1,
            facility.name,
            facility.service_type,
            facility.city,
            facility.state
        );
        println!("    rating: {}", format_rating(facility));
        if let Some(price) = facility.monthly_min() {
            println!("    from: ${}/mo", price);
        }
        if !facility.amenities.is_empty() {
            println!("    amenities: {}", facility.amenities.join(", "));
        }
        println!("    slug: {}", facility.slug);
        println!();
    }
    Ok(())
}

pub async fn run_get(config: &Config, slug: &str, json: bool) -> Result<()> {
    let store = seeded_store(&config.seed).await?;
    let facility = match store.facility_by_slug(slug).await? {
        Some(f) => f,
        None => bail!("facility not found: {}", slug),
    };

    if json {
        return print_json(&facility);
    }

    println!("--- Facility ---");
    println!("id:           {}", facility.id);
    println!("name:         {}", facility.name);
    println!("slug:         {}", facility.slug);
    println!("service type: {}", facility.service_type);
    println!(
        "address:      {}, {}, {} {}",
        facility.address, facility.city, facility.state, facility.zip_code
    );
    if let Some(ref phone) = facility.phone {
        println!("phone:        {}", phone);
    }
    if let Some(ref website) = facility.website {
        println!("website:      {}", website);
    }
    println!(
        "rating:       {} ({} reviews)",
        format_rating(&facility),
        facility.review_count
    );
    if let Some(ref pricing) = facility.pricing {
        if let (Some(min), Some(max)) = (pricing.base_monthly_min, pricing.base_monthly_max) {
            println!("monthly:      ${} - ${}", min, max);
        }
    }
    println!("featured:     {}", facility.is_featured);
    if let Some(ref description) = facility.description {
        println!();
        println!("{}", description);
    }
    if !facility.services.is_empty() {
        println!();
        println!("--- Services ({}) ---", facility.services.len());
        for service in &facility.services {
            println!("  - {}", service);
        }
    }
    Ok(())
}

pub async fn run_cities(config: &Config, json: bool) -> Result<()> {
    let store = seeded_store(&config.seed).await?;
    let cities = store.cities().await?;

    if json {
        return print_json(&cities);
    }
    for city in &cities {
        println!(
            "{:<20} {:<20} {} facilities",
            city.name, city.slug, city.facility_count
        );
    }
    Ok(())
}

pub fn run_service_types(json: bool) -> Result<()> {
    let catalog = service_types();
    if json {
        return print_json(&catalog);
    }
    for info in &catalog {
        println!("{:<20} {:<40} {}", info.id.as_str(), info.name, info.price_range);
    }
    Ok(())
}

fn format_rating(facility: &Facility) -> String {
    facility
        .rating
        .map(|r| format!("{:.1}", r))
        .unwrap_or_else(|| "unrated".to_string())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_args_to_filter() {
        let args = SearchArgs {
            city: Some("boulder".to_string()),
            service_type: Some("memory-care".to_string()),
            sort: Some("price_asc".to_string()),
            limit: Some(5),
            ..Default::default()
        };
        let filter = args.to_filter().unwrap();
        assert_eq!(filter.service_type, Some(ServiceType::MemoryCare));
        assert_eq!(filter.sort, Some(SortKey::PriceAsc));
        assert_eq!(filter.limit, Some(5));
        assert_eq!(filter.page, None);
    }

    #[test]
    fn test_search_args_reject_unknown_values() {
        let bad_type = SearchArgs {
            service_type: Some("spa".to_string()),
            ..Default::default()
        };
        assert!(bad_type.to_filter().is_err());

        let bad_sort = SearchArgs {
            sort: Some("popularity".to_string()),
            ..Default::default()
        };
        let err = bad_sort.to_filter().unwrap_err();
        assert!(err.to_string().contains("unknown sort key"));
    }
}
