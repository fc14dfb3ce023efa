//! Core data models shared by the store, the query engine, and every frontend.
//!
//! Records come in two shapes: the stored form carrying an `id` (e.g.
//! [`Facility`]) and the insert form without one (e.g. [`NewFacility`]).
//! Insert forms carry a `validate` method that enforces the required-field
//! and range rules before anything reaches a store.
//!
//! All types serialize with camelCase field names, which is the wire format
//! of the HTTP API and the seed files.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DirectoryError, Result};

// ============ Service types ============

/// Category of care a facility offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    AssistedLiving,
    MemoryCare,
    NursingHome,
    IndependentLiving,
    Ccrc,
    AdultDayCare,
    HomeCare,
    RespiteCare,
    Hospice,
    Rehabilitation,
}

impl ServiceType {
    pub const ALL: [ServiceType; 10] = [
        ServiceType::AssistedLiving,
        ServiceType::MemoryCare,
        ServiceType::NursingHome,
        ServiceType::IndependentLiving,
        ServiceType::Ccrc,
        ServiceType::AdultDayCare,
        ServiceType::HomeCare,
        ServiceType::RespiteCare,
        ServiceType::Hospice,
        ServiceType::Rehabilitation,
    ];

    /// Wire name, e.g. `ASSISTED_LIVING`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::AssistedLiving => "ASSISTED_LIVING",
            ServiceType::MemoryCare => "MEMORY_CARE",
            ServiceType::NursingHome => "NURSING_HOME",
            ServiceType::IndependentLiving => "INDEPENDENT_LIVING",
            ServiceType::Ccrc => "CCRC",
            ServiceType::AdultDayCare => "ADULT_DAY_CARE",
            ServiceType::HomeCare => "HOME_CARE",
            ServiceType::RespiteCare => "RESPITE_CARE",
            ServiceType::Hospice => "HOSPICE",
            ServiceType::Rehabilitation => "REHABILITATION",
        }
    }

    /// URL slug, e.g. `assisted-living`.
    pub fn slug(&self) -> &'static str {
        match self {
            ServiceType::AssistedLiving => "assisted-living",
            ServiceType::MemoryCare => "memory-care",
            ServiceType::NursingHome => "nursing-home",
            ServiceType::IndependentLiving => "independent-living",
            ServiceType::Ccrc => "ccrc",
            ServiceType::AdultDayCare => "adult-day-care",
            ServiceType::HomeCare => "home-care",
            ServiceType::RespiteCare => "respite-care",
            ServiceType::Hospice => "hospice",
            ServiceType::Rehabilitation => "rehabilitation",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = DirectoryError;

    /// Accepts the wire name or the slug, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        ServiceType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(needle) || t.slug().eq_ignore_ascii_case(needle))
            .ok_or_else(|| DirectoryError::validation(format!("service type: {}", s)))
    }
}

// ============ Pricing ============

/// Structured pricing for a facility. All amounts are whole dollars.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pricing {
    pub base_monthly_rate: Option<u32>,
    pub base_monthly_min: Option<u32>,
    pub base_monthly_max: Option<u32>,
    pub entry_fee: Option<u32>,
    pub respite_rate: Option<u32>,
    pub respite_daily_min: Option<u32>,
    pub respite_daily_max: Option<u32>,
    pub levels: Option<Vec<PricingLevel>>,
    pub additional_fees: Option<Vec<AdditionalFee>>,
}

/// One tier of a tiered care-level price list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingLevel {
    pub level: String,
    pub description: String,
    #[serde(default)]
    pub monthly_cost: Option<u32>,
}

/// A fee charged on top of the base rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalFee {
    pub description: String,
    pub cost: u32,
    pub frequency: String,
}

// ============ Facilities ============

/// A senior-care provider location as stored and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub service_type: ServiceType,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub pricing: Option<Pricing>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub is_featured: bool,
}

impl Facility {
    /// Minimum monthly rate, if the facility publishes one.
    pub fn monthly_min(&self) -> Option<u32> {
        self.pricing.as_ref().and_then(|p| p.base_monthly_min)
    }

    /// Check the record-level rules shared by create and update.
    pub fn validate(&self) -> Result<()> {
        require("facility", "name", &self.name)?;
        require_slug("facility", &self.slug)?;
        require("facility", "address", &self.address)?;
        require("facility", "city", &self.city)?;
        require("facility", "state", &self.state)?;
        require("facility", "zipCode", &self.zip_code)?;
        if let Some(rating) = self.rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(DirectoryError::validation(
                    "facility: rating must be between 0 and 5",
                ));
            }
        }
        Ok(())
    }
}

/// Insert form of [`Facility`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFacility {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub service_type: ServiceType,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub pricing: Option<Pricing>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub is_featured: bool,
}

impl NewFacility {
    pub fn with_id(self, id: i64) -> Facility {
        Facility {
            id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            short_description: self.short_description,
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            phone: self.phone,
            website: self.website,
            email: self.email,
            service_type: self.service_type,
            rating: self.rating,
            review_count: self.review_count,
            pricing: self.pricing,
            amenities: self.amenities,
            services: self.services,
            image_url: self.image_url,
            image_urls: self.image_urls,
            latitude: self.latitude,
            longitude: self.longitude,
            is_featured: self.is_featured,
        }
    }
}

/// Partial update for a facility. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FacilityPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub service_type: Option<ServiceType>,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub pricing: Option<Pricing>,
    pub amenities: Option<Vec<String>>,
    pub services: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_featured: Option<bool>,
}

impl FacilityPatch {
    /// Merge into a copy of `current`, producing the replacement record.
    pub fn apply(self, current: &Facility) -> Facility {
        let mut next = current.clone();
        macro_rules! set {
            ($field:ident) => {
                if let Some(v) = self.$field {
                    next.$field = v;
                }
            };
            (opt $field:ident) => {
                if self.$field.is_some() {
                    next.$field = self.$field;
                }
            };
        }
        set!(name);
        set!(slug);
        set!(opt description);
        set!(opt short_description);
        set!(address);
        set!(city);
        set!(state);
        set!(zip_code);
        set!(opt phone);
        set!(opt website);
        set!(opt email);
        set!(service_type);
        set!(opt rating);
        set!(review_count);
        set!(opt pricing);
        set!(amenities);
        set!(services);
        set!(opt image_url);
        set!(image_urls);
        set!(opt latitude);
        set!(opt longitude);
        set!(is_featured);
        next
    }
}

// ============ Cities ============

/// A city facilities are grouped under.
///
/// `facility_count` is derived by the store on every read; it is never
/// taken from input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub state: String,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub facility_count: usize,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Insert form of [`City`]. A `facilityCount` in the input is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCity {
    pub name: String,
    pub slug: String,
    pub state: String,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl NewCity {
    pub fn validate(&self) -> Result<()> {
        require("city", "name", &self.name)?;
        require_slug("city", &self.slug)?;
        require("city", "state", &self.state)?;
        require("city", "description", &self.description)
    }

    pub fn with_id(self, id: i64) -> City {
        City {
            id,
            name: self.name,
            slug: self.slug,
            state: self.state,
            description: self.description,
            image_url: self.image_url,
            facility_count: 0,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// City detail view with per-service-type facility counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityWithServiceCounts {
    #[serde(flatten)]
    pub city: City,
    pub service_counts: BTreeMap<ServiceType, usize>,
}

impl CityWithServiceCounts {
    /// Count `facilities` per service type. Every type appears, zero or not.
    pub fn new(city: City, facilities: &[Facility]) -> Self {
        let mut service_counts: BTreeMap<ServiceType, usize> =
            ServiceType::ALL.into_iter().map(|t| (t, 0)).collect();
        for f in facilities {
            *service_counts.entry(f.service_type).or_insert(0) += 1;
        }
        Self {
            city,
            service_counts,
        }
    }
}

// ============ Reviews ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub facility_id: i64,
    pub rating: u8,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub reviewer_name: Option<String>,
    #[serde(default)]
    pub reviewer_id: Option<String>,
    pub published_at: DateTime<Utc>,
}

/// Insert form of [`Review`].
///
/// `facility_id` may be omitted in the body when the route already names
/// the facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    #[serde(default)]
    pub facility_id: i64,
    pub rating: u8,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub reviewer_name: Option<String>,
    #[serde(default)]
    pub reviewer_id: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl NewReview {
    pub fn validate(&self) -> Result<()> {
        if self.facility_id < 1 {
            return Err(DirectoryError::validation("review: facilityId is required"));
        }
        if !(1..=5).contains(&self.rating) {
            return Err(DirectoryError::validation(
                "review: rating must be between 1 and 5",
            ));
        }
        Ok(())
    }

    pub fn with_id(self, id: i64, now: DateTime<Utc>) -> Review {
        Review {
            id,
            facility_id: self.facility_id,
            rating: self.rating,
            text: self.text,
            reviewer_name: self.reviewer_name,
            reviewer_id: self.reviewer_id,
            published_at: self.published_at.unwrap_or(now),
        }
    }
}

// ============ Chat ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A stored assistant conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: i64,
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
}

// ============ Quiz leads ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizLead {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub care_type: String,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub location_preference: Option<String>,
    #[serde(default)]
    pub additional_notes: Option<String>,
    #[serde(default)]
    pub contacted: bool,
}

/// Insert form of [`QuizLead`]. Submitted leads always start uncontacted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuizLead {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub care_type: String,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub location_preference: Option<String>,
    #[serde(default)]
    pub additional_notes: Option<String>,
}

impl NewQuizLead {
    pub fn validate(&self) -> Result<()> {
        require("quiz lead", "name", &self.name)?;
        require("quiz lead", "email", &self.email)?;
        if !self.email.contains('@') {
            return Err(DirectoryError::validation(
                "quiz lead: email must be an email address",
            ));
        }
        require("quiz lead", "careType", &self.care_type)
    }

    pub fn with_id(self, id: i64) -> QuizLead {
        QuizLead {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            care_type: self.care_type,
            budget: self.budget,
            timeframe: self.timeframe,
            location_preference: self.location_preference,
            additional_notes: self.additional_notes,
            contacted: false,
        }
    }
}

// ============ Resources ============

/// An informational article, optionally scoped to one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub content: String,
    #[serde(default)]
    pub city_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResource {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub content: String,
    #[serde(default)]
    pub city_slug: Option<String>,
}

impl NewResource {
    pub fn validate(&self) -> Result<()> {
        require("resource", "title", &self.title)?;
        require_slug("resource", &self.slug)?;
        require("resource", "description", &self.description)?;
        require("resource", "category", &self.category)?;
        require("resource", "content", &self.content)
    }

    pub fn with_id(self, id: i64) -> Resource {
        Resource {
            id,
            title: self.title,
            slug: self.slug,
            description: self.description,
            category: self.category,
            image_url: self.image_url,
            content: self.content,
            city_slug: self.city_slug,
        }
    }
}

// ============ Validation helpers ============

fn require(entity: &str, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DirectoryError::validation(format!(
            "{}: {} is required",
            entity, field
        )));
    }
    Ok(())
}

fn require_slug(entity: &str, slug: &str) -> Result<()> {
    require(entity, "slug", slug)?;
    if !is_valid_slug(slug) {
        return Err(DirectoryError::validation(format!(
            "{}: slug must be lowercase letters, digits and single hyphens",
            entity
        )));
    }
    Ok(())
}

/// Lowercase ASCII alphanumerics separated by single hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .split('-')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_facility() -> Facility {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Mountain View Senior Living",
            "slug": "mountain-view-senior-living",
            "address": "1234 Mountain View Drive",
            "city": "Denver",
            "state": "CO",
            "zipCode": "80202",
            "serviceType": "ASSISTED_LIVING",
            "rating": 4.8,
            "pricing": { "baseMonthlyMin": 3750, "entryFee": null }
        }))
        .unwrap()
    }

    #[test]
    fn test_service_type_parses_name_and_slug() {
        assert_eq!(
            "MEMORY_CARE".parse::<ServiceType>().unwrap(),
            ServiceType::MemoryCare
        );
        assert_eq!(
            "memory-care".parse::<ServiceType>().unwrap(),
            ServiceType::MemoryCare
        );
        assert_eq!("ccrc".parse::<ServiceType>().unwrap(), ServiceType::Ccrc);
        assert!("SPA".parse::<ServiceType>().is_err());
    }

    #[test]
    fn test_service_type_wire_format() {
        let json = serde_json::to_string(&ServiceType::AdultDayCare).unwrap();
        assert_eq!(json, "\"ADULT_DAY_CARE\"");
        for t in ServiceType::ALL {
            let back: ServiceType = serde_json::from_str(&format!("\"{}\"", t.as_str())).unwrap();
            assert_eq!(back, t);
        }
    }

    #[test]
    fn test_facility_defaults_and_camel_case() {
        let f = sample_facility();
        assert_eq!(f.zip_code, "80202");
        assert_eq!(f.review_count, 0);
        assert!(f.amenities.is_empty());
        assert!(!f.is_featured);
        assert_eq!(f.monthly_min(), Some(3750));

        let out = serde_json::to_value(&f).unwrap();
        assert_eq!(out["zipCode"], "80202");
        assert_eq!(out["serviceType"], "ASSISTED_LIVING");
        assert_eq!(out["pricing"]["baseMonthlyMin"], 3750);
    }

    #[test]
    fn test_facility_validate_rejects_bad_rating_and_slug() {
        let mut f = sample_facility();
        assert!(f.validate().is_ok());

        f.rating = Some(5.5);
        assert!(f.validate().is_err());

        f.rating = None;
        f.slug = "Mountain View".to_string();
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_patch_keeps_absent_fields() {
        let f = sample_facility();
        let patch = FacilityPatch {
            name: Some("Mountain View".to_string()),
            is_featured: Some(true),
            ..Default::default()
        };
        let next = patch.apply(&f);
        assert_eq!(next.name, "Mountain View");
        assert!(next.is_featured);
        assert_eq!(next.slug, f.slug);
        assert_eq!(next.rating, Some(4.8));
        assert_eq!(next.pricing, f.pricing);
    }

    #[test]
    fn test_review_validation() {
        let mut review = NewReview {
            facility_id: 1,
            rating: 5,
            text: None,
            reviewer_name: None,
            reviewer_id: None,
            published_at: None,
        };
        assert!(review.validate().is_ok());
        review.rating = 0;
        assert!(review.validate().is_err());
        review.rating = 6;
        assert!(review.validate().is_err());
        review.rating = 3;
        review.facility_id = 0;
        assert!(review.validate().is_err());
    }

    #[test]
    fn test_quiz_lead_requires_contact_and_care_type() {
        let lead: NewQuizLead = serde_json::from_value(serde_json::json!({
            "name": "Pat",
            "email": "pat@example.com",
            "careType": "MEMORY_CARE"
        }))
        .unwrap();
        assert!(lead.validate().is_ok());
        assert!(!lead.clone().with_id(1).contacted);

        let bad = NewQuizLead {
            email: "not-an-email".to_string(),
            ..lead.clone()
        };
        assert!(bad.validate().is_err());

        let bad = NewQuizLead {
            care_type: "  ".to_string(),
            ..lead
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_city_input_ignores_facility_count() {
        let city: NewCity = serde_json::from_value(serde_json::json!({
            "name": "Denver",
            "slug": "denver",
            "state": "CO",
            "description": "Capital",
            "facilityCount": 45
        }))
        .unwrap();
        assert_eq!(city.with_id(1).facility_count, 0);
    }

    #[test]
    fn test_service_counts_cover_every_type() {
        let f = sample_facility();
        let city = NewCity {
            name: "Denver".into(),
            slug: "denver".into(),
            state: "CO".into(),
            description: "Capital".into(),
            image_url: None,
            latitude: None,
            longitude: None,
        }
        .with_id(1);
        let view = CityWithServiceCounts::new(city, &[f]);
        assert_eq!(view.service_counts.len(), ServiceType::ALL.len());
        assert_eq!(view.service_counts[&ServiceType::AssistedLiving], 1);
        assert_eq!(view.service_counts[&ServiceType::Hospice], 0);

        let out = serde_json::to_value(&view).unwrap();
        assert_eq!(out["slug"], "denver");
        assert_eq!(out["serviceCounts"]["ASSISTED_LIVING"], 1);
    }

    #[test]
    fn test_slug_rules() {
        assert!(is_valid_slug("fort-collins"));
        assert!(is_valid_slug("ccrc"));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("double--hyphen"));
        assert!(!is_valid_slug("Upper"));
    }
}
