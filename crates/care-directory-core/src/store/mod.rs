//! Storage abstraction for Care Directory.
//!
//! The [`Store`] trait defines every read and write the frontends need,
//! so the HTTP server, the CLI and the chat assistant never touch a
//! concrete backend. Query logic lives in [`crate::query`] and is shared by
//! all implementations.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    ChatMessage, ChatSession, City, Facility, FacilityPatch, NewCity, NewFacility, NewQuizLead,
    NewResource, NewReview, QuizLead, Resource, Review, ServiceType,
};
use crate::query::FacilityFilter;

/// Abstract storage backend for the directory.
///
/// All operations are async (via `async-trait`) so a persistent backend can
/// be dropped in. The in-memory implementation returns immediately-ready
/// futures.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`list_facilities`](Store::list_facilities) | Run the query engine over all facilities |
/// | [`featured_facilities`](Store::featured_facilities) | Facilities flagged for promotion |
/// | [`facilities_by_city`](Store::facilities_by_city) | Facilities in a city, by city slug |
/// | [`create_facility`](Store::create_facility) / [`update_facility`](Store::update_facility) | Validated writes |
/// | [`create_review`](Store::create_review) | Append a review and recompute the facility rating |
/// | [`cities`](Store::cities) | Cities with derived facility counts |
/// | [`create_chat_session`](Store::create_chat_session) | Start an assistant conversation |
/// | [`append_chat_messages`](Store::append_chat_messages) | Extend a conversation atomically |
/// | [`create_quiz_lead`](Store::create_quiz_lead) | Record a submitted quiz |
#[async_trait]
pub trait Store: Send + Sync {
    // ---- facilities ----

    /// Filtered, sorted, paginated facilities.
    async fn list_facilities(&self, filter: &FacilityFilter) -> Result<Vec<Facility>>;

    /// Featured facilities in insertion order, at most `limit` when given.
    async fn featured_facilities(&self, limit: Option<usize>) -> Result<Vec<Facility>>;

    async fn facility_by_id(&self, id: i64) -> Result<Option<Facility>>;

    async fn facility_by_slug(&self, slug: &str) -> Result<Option<Facility>>;

    /// Facilities whose city is the city with slug `city_slug`.
    /// Empty when the slug is unknown.
    async fn facilities_by_city(
        &self,
        city_slug: &str,
        service_type: Option<ServiceType>,
    ) -> Result<Vec<Facility>>;

    async fn create_facility(&self, facility: NewFacility) -> Result<Facility>;

    /// Merge `patch` into the stored record and replace it.
    async fn update_facility(&self, id: i64, patch: FacilityPatch) -> Result<Facility>;

    /// Returns whether a facility was removed.
    async fn delete_facility(&self, id: i64) -> Result<bool>;

    // ---- cities ----

    async fn cities(&self) -> Result<Vec<City>>;

    async fn city_by_slug(&self, slug: &str) -> Result<Option<City>>;

    async fn create_city(&self, city: NewCity) -> Result<City>;

    // ---- reviews ----

    async fn reviews_for_facility(&self, facility_id: i64) -> Result<Vec<Review>>;

    /// Store a review, then set the facility's rating to the mean of all its
    /// reviews (1 decimal) and its review count to their number.
    async fn create_review(&self, review: NewReview) -> Result<Review>;

    // ---- chat ----

    async fn chat_session(&self, session_id: &str) -> Result<Option<ChatSession>>;

    async fn create_chat_session(
        &self,
        session_id: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<ChatSession>;

    /// Append `messages` to a session's history in one write, creating the
    /// session when `session_id` is unknown. Returns the updated session.
    async fn append_chat_messages(
        &self,
        session_id: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<ChatSession>;

    // ---- quiz leads ----

    async fn create_quiz_lead(&self, lead: NewQuizLead) -> Result<QuizLead>;

    async fn mark_lead_contacted(&self, id: i64) -> Result<QuizLead>;

    // ---- resources ----

    /// Resources in `category` (exact), visible in `city_slug` (unscoped
    /// resources are visible everywhere).
    async fn resources(
        &self,
        category: Option<&str>,
        city_slug: Option<&str>,
    ) -> Result<Vec<Resource>>;

    async fn resource_by_slug(&self, slug: &str) -> Result<Option<Resource>>;

    async fn create_resource(&self, resource: NewResource) -> Result<Resource>;
}

/// Mean of `ratings` rounded to one decimal, or `None` when empty.
pub fn average_rating(ratings: &[u8]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let sum: u32 = ratings.iter().map(|r| *r as u32).sum();
    let mean = sum as f64 / ratings.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}
