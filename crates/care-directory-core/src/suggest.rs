//! Keyword scan that picks facilities to show beside an assistant reply.
//!
//! The scan is a fixed-order heuristic. It yields at most two candidates:
//! the first service type whose keyword appears in the user's message, then
//! the first city name that appears. Callers try them in order and keep the
//! first one that finds facilities. It does not rank.

use crate::models::ServiceType;
use crate::query::FacilityFilter;

/// Number of facilities suggested alongside a reply.
pub const MAX_SUGGESTIONS: usize = 3;

/// City names scanned after the service keywords.
pub const DEFAULT_SUGGESTION_CITIES: [&str; 5] =
    ["Denver", "Boulder", "Colorado Springs", "Fort Collins", "Aurora"];

const SERVICE_KEYWORDS: [(ServiceType, &[&str]); 4] = [
    (ServiceType::AssistedLiving, &["assisted living"]),
    (ServiceType::MemoryCare, &["memory care", "alzheimer", "dementia"]),
    (ServiceType::NursingHome, &["nursing home", "skilled nursing"]),
    (ServiceType::IndependentLiving, &["independent living"]),
];

/// What a message mentioned.
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestion {
    ServiceType(ServiceType),
    City(String),
}

impl Suggestion {
    /// Query returning the first [`MAX_SUGGESTIONS`] matching facilities.
    pub fn filter(&self) -> FacilityFilter {
        let base = match self {
            Suggestion::ServiceType(t) => FacilityFilter::for_service_type(*t),
            Suggestion::City(name) => FacilityFilter::for_city(name.clone()),
        };
        FacilityFilter {
            page: Some(1),
            limit: Some(MAX_SUGGESTIONS),
            ..base
        }
    }
}

/// Scan `message` for a service keyword, then for one of `cities`.
///
/// Returns the candidates in the order they should be tried.
pub fn suggest<S: AsRef<str>>(message: &str, cities: &[S]) -> Vec<Suggestion> {
    let lower = message.to_lowercase();

    let service = SERVICE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(*k)))
        .map(|(service_type, _)| Suggestion::ServiceType(*service_type));

    let city = cities
        .iter()
        .map(|c| c.as_ref())
        .find(|city| !city.is_empty() && lower.contains(&city.to_lowercase()))
        .map(|city| Suggestion::City(city.to_string()));

    service.into_iter().chain(city).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_keyword_before_city() {
        let s = suggest("My mom has dementia and lives in Denver", &DEFAULT_SUGGESTION_CITIES);
        assert_eq!(
            s,
            vec![
                Suggestion::ServiceType(ServiceType::MemoryCare),
                Suggestion::City("Denver".to_string()),
            ]
        );
    }

    #[test]
    fn test_keyword_order_is_fixed() {
        let s = suggest(
            "Comparing nursing home and assisted living options",
            &DEFAULT_SUGGESTION_CITIES,
        );
        assert_eq!(s, vec![Suggestion::ServiceType(ServiceType::AssistedLiving)]);
    }

    #[test]
    fn test_case_insensitive() {
        let s = suggest("SKILLED NURSING near me?", &DEFAULT_SUGGESTION_CITIES);
        assert_eq!(s, vec![Suggestion::ServiceType(ServiceType::NursingHome)]);
    }

    #[test]
    fn test_city_fallback() {
        let s = suggest("What is available in fort collins?", &DEFAULT_SUGGESTION_CITIES);
        assert_eq!(s, vec![Suggestion::City("Fort Collins".to_string())]);

        let cities = vec!["Pueblo".to_string()];
        assert_eq!(suggest("Pueblo please", &cities[..]), vec![Suggestion::City("Pueblo".into())]);
        assert!(suggest("Denver please", &cities[..]).is_empty());
    }

    #[test]
    fn test_no_match() {
        assert!(suggest("How do I pay for care?", &DEFAULT_SUGGESTION_CITIES).is_empty());
        assert!(suggest("", &DEFAULT_SUGGESTION_CITIES).is_empty());
    }

    #[test]
    fn test_filter_limits_to_three() {
        let f = Suggestion::City("Boulder".into()).filter();
        assert_eq!(f.city.as_deref(), Some("Boulder"));
        assert_eq!(f.limit, Some(MAX_SUGGESTIONS));
        assert_eq!(f.page, Some(1));

        let f = Suggestion::ServiceType(ServiceType::IndependentLiving).filter();
        assert_eq!(f.service_type, Some(ServiceType::IndependentLiving));
        assert!(f.city.is_none());
    }
}
