//! Facility query engine: filter, sort, paginate.
//!
//! [`query_facilities`] is a pure function over a facility collection and
//! the known cities. It never fails; filters it cannot interpret are simply
//! not applied, so frontends can pass user input through permissively.
//!
//! # Algorithm
//!
//! 1. Keep facilities matching every supplied predicate (AND):
//!    city, service type, free-text search, amenities, rating floor,
//!    price band.
//! 2. Stable-sort by the requested key, if any.
//! 3. Slice the requested page when both `page` and `limit` are given.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::models::{City, Facility, ServiceType};

/// Upper price bound used when only `min_price` is supplied.
pub const DEFAULT_MAX_PRICE: u32 = 100_000;

/// Result ordering for [`query_facilities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Highest rating first; unrated facilities count as 0.
    Rating,
    /// Cheapest `baseMonthlyMin` first; missing pricing counts as 0.
    PriceAsc,
    /// Most expensive `baseMonthlyMin` first; missing pricing counts as 0.
    PriceDesc,
    /// Alphabetical by name, ignoring case.
    Name,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Rating => "rating",
            SortKey::PriceAsc => "price_asc",
            SortKey::PriceDesc => "price_desc",
            SortKey::Name => "name",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "rating" => Ok(SortKey::Rating),
            "price_asc" => Ok(SortKey::PriceAsc),
            "price_desc" => Ok(SortKey::PriceDesc),
            "name" => Ok(SortKey::Name),
            other => Err(format!(
                "unknown sort key: {}. Use rating, price_asc, price_desc, or name.",
                other
            )),
        }
    }
}

/// Filter, sort and pagination options. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacilityFilter {
    /// City name or city slug.
    pub city: Option<String>,
    pub service_type: Option<ServiceType>,
    /// Case-insensitive substring of name, description or short description.
    pub search: Option<String>,
    /// Facility must offer all of these (exact match).
    pub amenities: Vec<String>,
    /// Minimum rating. Zero or less means no floor.
    pub rating: Option<f64>,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    pub sort: Option<SortKey>,
    /// 1-based page number. Page 0 is treated as page 1.
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl FacilityFilter {
    pub fn for_service_type(service_type: ServiceType) -> Self {
        Self {
            service_type: Some(service_type),
            ..Default::default()
        }
    }

    pub fn for_city(city: impl Into<String>) -> Self {
        Self {
            city: Some(city.into()),
            ..Default::default()
        }
    }
}

/// Run `filter` over `facilities`, returning owned copies in result order.
///
/// `cities` is used to resolve a city filter given as a slug
/// (`colorado-springs`) to the city name facilities are tagged with.
pub fn query_facilities<'a, 'c, I, C>(
    facilities: I,
    cities: C,
    filter: &FacilityFilter,
) -> Vec<Facility>
where
    I: IntoIterator<Item = &'a Facility>,
    C: IntoIterator<Item = &'c City>,
{
    let city = filter
        .city
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .map(|c| CityMatcher::new(c, cities));
    let search = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let rating_floor = filter.rating.filter(|r| *r > 0.0);
    let price_band = PriceBand::from_filter(filter);

    let mut results: Vec<Facility> = facilities
        .into_iter()
        .filter(|f| city.as_ref().map_or(true, |m| m.matches(f)))
        .filter(|f| filter.service_type.map_or(true, |t| f.service_type == t))
        .filter(|f| search.as_deref().map_or(true, |s| matches_search(f, s)))
        .filter(|f| filter.amenities.iter().all(|a| f.amenities.contains(a)))
        .filter(|f| rating_floor.map_or(true, |floor| f.rating.is_some_and(|r| r >= floor)))
        .filter(|f| price_band.map_or(true, |band| band.admits(f)))
        .cloned()
        .collect();

    if let Some(sort) = filter.sort {
        sort_facilities(&mut results, sort);
    }

    paginate(results, filter.page, filter.limit)
}

/// Stable sort in place.
pub fn sort_facilities(facilities: &mut [Facility], key: SortKey) {
    match key {
        SortKey::Rating => facilities.sort_by(|a, b| {
            b.rating
                .unwrap_or(0.0)
                .partial_cmp(&a.rating.unwrap_or(0.0))
                .unwrap_or(Ordering::Equal)
        }),
        SortKey::PriceAsc => facilities.sort_by_key(|f| f.monthly_min().unwrap_or(0)),
        SortKey::PriceDesc => {
            facilities.sort_by(|a, b| b.monthly_min().unwrap_or(0).cmp(&a.monthly_min().unwrap_or(0)))
        }
        SortKey::Name => facilities.sort_by_cached_key(|f| f.name.to_lowercase()),
    }
}

/// Slice `[(page-1)*limit, page*limit)` when both are given and `limit > 0`.
pub fn paginate<T>(items: Vec<T>, page: Option<usize>, limit: Option<usize>) -> Vec<T> {
    match (page, limit) {
        (Some(page), Some(limit)) if limit > 0 => {
            let start = page.max(1).saturating_sub(1).saturating_mul(limit);
            items.into_iter().skip(start).take(limit).collect()
        }
        _ => items,
    }
}

fn matches_search(facility: &Facility, needle_lower: &str) -> bool {
    let contains = |text: &str| text.to_lowercase().contains(needle_lower);
    contains(facility.name.as_str())
        || facility.description.as_deref().is_some_and(contains)
        || facility.short_description.as_deref().is_some_and(contains)
}

/// Matches a facility's city against a filter given as a name or slug.
struct CityMatcher {
    needle: String,
    resolved_name: Option<String>,
}

impl CityMatcher {
    fn new<'c>(filter: &str, cities: impl IntoIterator<Item = &'c City>) -> Self {
        let needle = filter.trim().to_lowercase();
        let resolved_name = cities
            .into_iter()
            .find(|c| c.slug.to_lowercase() == needle || c.name.to_lowercase() == needle)
            .map(|c| c.name.to_lowercase());
        Self {
            needle,
            resolved_name,
        }
    }

    fn matches(&self, facility: &Facility) -> bool {
        let city = facility.city.to_lowercase();
        city == self.needle || self.resolved_name.as_deref() == Some(city.as_str())
    }
}

/// Inclusive monthly price band. Facilities without a published minimum
/// monthly rate always pass.
#[derive(Debug, Clone, Copy)]
struct PriceBand {
    min: u32,
    max: u32,
}

impl PriceBand {
    fn from_filter(filter: &FacilityFilter) -> Option<Self> {
        let min = filter.min_price.filter(|p| *p > 0);
        let max = filter.max_price.filter(|p| *p > 0);
        if min.is_none() && max.is_none() {
            return None;
        }
        Some(Self {
            min: min.unwrap_or(0),
            max: max.unwrap_or(DEFAULT_MAX_PRICE),
        })
    }

    fn admits(&self, facility: &Facility) -> bool {
        match facility.monthly_min() {
            None | Some(0) => true,
            Some(price) => price >= self.min && price <= self.max,
        }
    }
}
