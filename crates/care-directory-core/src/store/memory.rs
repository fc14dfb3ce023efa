//! In-memory [`Store`] implementation.
//!
//! Each collection is an arena: a vector of slots plus an id → slot index,
//! with ids handed out sequentially from 1. Deleting leaves an empty slot so
//! insertion order (the default listing order) never shifts.
//!
//! All tables sit behind one `std::sync::RwLock`; no guard is held across an
//! `.await`.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{DirectoryError, Result};
use crate::models::{
    ChatMessage, ChatSession, City, Facility, FacilityPatch, NewCity, NewFacility, NewQuizLead,
    NewResource, NewReview, QuizLead, Resource, Review, ServiceType,
};
use crate::query::{query_facilities, FacilityFilter};

use super::{average_rating, Store};

/// Vector-backed collection with stable insertion order.
struct Arena<T> {
    slots: Vec<Option<T>>,
    by_id: HashMap<i64, usize>,
    next_id: i64,
}

impl<T> Arena<T> {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            by_id: HashMap::new(),
            next_id: 1,
        }
    }

    fn peek_id(&self) -> i64 {
        self.next_id
    }

    fn insert(&mut self, item: T) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        self.by_id.insert(id, self.slots.len());
        self.slots.push(Some(item));
        id
    }

    fn get(&self, id: i64) -> Option<&T> {
        self.by_id.get(&id).and_then(|&slot| self.slots[slot].as_ref())
    }

    fn get_mut(&mut self, id: i64) -> Option<&mut T> {
        match self.by_id.get(&id) {
            Some(&slot) => self.slots[slot].as_mut(),
            None => None,
        }
    }

    fn remove(&mut self, id: i64) -> Option<T> {
        let slot = self.by_id.remove(&id)?;
        self.slots[slot].take()
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().flatten()
    }
}

struct Tables {
    facilities: Arena<Facility>,
    cities: Arena<City>,
    reviews: Arena<Review>,
    chats: Arena<ChatSession>,
    leads: Arena<QuizLead>,
    resources: Arena<Resource>,
}

impl Tables {
    fn facility_count(&self, city_name: &str) -> usize {
        self.facilities
            .iter()
            .filter(|f| f.city.eq_ignore_ascii_case(city_name))
            .count()
    }

    fn with_count(&self, city: &City) -> City {
        City {
            facility_count: self.facility_count(&city.name),
            ..city.clone()
        }
    }

    fn facility_slug_taken(&self, slug: &str, except: Option<i64>) -> bool {
        self.facilities
            .iter()
            .any(|f| f.slug == slug && Some(f.id) != except)
    }

    fn chat_mut(&mut self, session_id: &str) -> Option<&mut ChatSession> {
        let id = self.chats.iter().find(|c| c.session_id == session_id)?.id;
        self.chats.get_mut(id)
    }
}

/// In-memory store used by the server, the CLI and tests.
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                facilities: Arena::new(),
                cities: Arena::new(),
                reviews: Arena::new(),
                chats: Arena::new(),
                leads: Arena::new(),
                resources: Arena::new(),
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| DirectoryError::internal("store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| DirectoryError::internal("store lock poisoned"))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn list_facilities(&self, filter: &FacilityFilter) -> Result<Vec<Facility>> {
        let tables = self.read()?;
        let results = query_facilities(tables.facilities.iter(), tables.cities.iter(), filter);
        Ok(results)
    }

    async fn featured_facilities(&self, limit: Option<usize>) -> Result<Vec<Facility>> {
        let tables = self.read()?;
        let featured = tables.facilities.iter().filter(|f| f.is_featured).cloned();
        let results = match limit {
            Some(n) if n > 0 => featured.take(n).collect(),
            _ => featured.collect(),
        };
        Ok(results)
    }

    async fn facility_by_id(&self, id: i64) -> Result<Option<Facility>> {
        Ok(self.read()?.facilities.get(id).cloned())
    }

    async fn facility_by_slug(&self, slug: &str) -> Result<Option<Facility>> {
        Ok(self
            .read()?
            .facilities
            .iter()
            .find(|f| f.slug == slug)
            .cloned())
    }

    async fn facilities_by_city(
        &self,
        city_slug: &str,
        service_type: Option<ServiceType>,
    ) -> Result<Vec<Facility>> {
        let tables = self.read()?;
        let city = match tables.cities.iter().find(|c| c.slug == city_slug) {
            Some(c) => c,
            None => return Ok(Vec::new()),
        };
        Ok(tables
            .facilities
            .iter()
            .filter(|f| f.city.eq_ignore_ascii_case(&city.name))
            .filter(|f| service_type.map_or(true, |t| f.service_type == t))
            .cloned()
            .collect())
    }

    async fn create_facility(&self, facility: NewFacility) -> Result<Facility> {
        let mut tables = self.write()?;
        let mut record = facility.with_id(tables.facilities.peek_id());
        record.validate()?;
        if tables.facility_slug_taken(&record.slug, None) {
            return Err(DirectoryError::validation(format!(
                "facility: slug already exists: {}",
                record.slug
            )));
        }
        record.id = tables.facilities.insert(record.clone());
        Ok(record)
    }

    async fn update_facility(&self, id: i64, patch: FacilityPatch) -> Result<Facility> {
        let mut tables = self.write()?;
        let current = tables
            .facilities
            .get(id)
            .ok_or_else(|| DirectoryError::not_found("facility", id))?;
        let mut next = patch.apply(current);
        next.id = id;
        next.validate()?;
        if tables.facility_slug_taken(&next.slug, Some(id)) {
            return Err(DirectoryError::validation(format!(
                "facility: slug already exists: {}",
                next.slug
            )));
        }
        if let Some(slot) = tables.facilities.get_mut(id) {
            *slot = next.clone();
        }
        Ok(next)
    }

    async fn delete_facility(&self, id: i64) -> Result<bool> {
        let mut tables = self.write()?;
        if tables.facilities.remove(id).is_none() {
            return Ok(false);
        }
        let orphaned: Vec<i64> = tables
            .reviews
            .iter()
            .filter(|r| r.facility_id == id)
            .map(|r| r.id)
            .collect();
        for review_id in orphaned {
            tables.reviews.remove(review_id);
        }
        Ok(true)
    }

    async fn cities(&self) -> Result<Vec<City>> {
        let tables = self.read()?;
        Ok(tables.cities.iter().map(|c| tables.with_count(c)).collect())
    }

    async fn city_by_slug(&self, slug: &str) -> Result<Option<City>> {
        let tables = self.read()?;
        let city = tables
            .cities
            .iter()
            .find(|c| c.slug == slug)
            .map(|c| tables.with_count(c));
        Ok(city)
    }

    async fn create_city(&self, city: NewCity) -> Result<City> {
        city.validate()?;
        let mut tables = self.write()?;
        if tables.cities.iter().any(|c| c.slug == city.slug) {
            return Err(DirectoryError::validation(format!(
                "city: slug already exists: {}",
                city.slug
            )));
        }
        let record = city.with_id(tables.cities.peek_id());
        tables.cities.insert(record.clone());
        Ok(tables.with_count(&record))
    }

    async fn reviews_for_facility(&self, facility_id: i64) -> Result<Vec<Review>> {
        Ok(self
            .read()?
            .reviews
            .iter()
            .filter(|r| r.facility_id == facility_id)
            .cloned()
            .collect())
    }

    async fn create_review(&self, review: NewReview) -> Result<Review> {
        review.validate()?;
        let mut tables = self.write()?;
        let facility_id = review.facility_id;
        if tables.facilities.get(facility_id).is_none() {
            return Err(DirectoryError::not_found("facility", facility_id));
        }

        let record = review.with_id(tables.reviews.peek_id(), Utc::now());
        tables.reviews.insert(record.clone());

        let ratings: Vec<u8> = tables
            .reviews
            .iter()
            .filter(|r| r.facility_id == facility_id)
            .map(|r| r.rating)
            .collect();
        if let Some(facility) = tables.facilities.get_mut(facility_id) {
            facility.rating = average_rating(&ratings);
            facility.review_count = ratings.len() as u32;
        }
        Ok(record)
    }

    async fn chat_session(&self, session_id: &str) -> Result<Option<ChatSession>> {
        Ok(self
            .read()?
            .chats
            .iter()
            .find(|c| c.session_id == session_id)
            .cloned())
    }

    async fn create_chat_session(
        &self,
        session_id: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<ChatSession> {
        let mut tables = self.write()?;
        if tables.chats.iter().any(|c| c.session_id == session_id) {
            return Err(DirectoryError::validation(format!(
                "chat session: id already exists: {}",
                session_id
            )));
        }
        let record = ChatSession {
            id: tables.chats.peek_id(),
            session_id: session_id.to_string(),
            messages,
        };
        tables.chats.insert(record.clone());
        Ok(record)
    }

    async fn append_chat_messages(
        &self,
        session_id: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<ChatSession> {
        let mut tables = self.write()?;
        if let Some(chat) = tables.chat_mut(session_id) {
            chat.messages.extend(messages);
            return Ok(chat.clone());
        }
        let record = ChatSession {
            id: tables.chats.peek_id(),
            session_id: session_id.to_string(),
            messages,
        };
        tables.chats.insert(record.clone());
        Ok(record)
    }

    async fn create_quiz_lead(&self, lead: NewQuizLead) -> Result<QuizLead> {
        lead.validate()?;
        let mut tables = self.write()?;
        let record = lead.with_id(tables.leads.peek_id());
        tables.leads.insert(record.clone());
        Ok(record)
    }

    async fn mark_lead_contacted(&self, id: i64) -> Result<QuizLead> {
        let mut tables = self.write()?;
        let lead = tables
            .leads
            .get_mut(id)
            .ok_or_else(|| DirectoryError::not_found("quiz lead", id))?;
        lead.contacted = true;
        Ok(lead.clone())
    }

    async fn resources(
        &self,
        category: Option<&str>,
        city_slug: Option<&str>,
    ) -> Result<Vec<Resource>> {
        Ok(self
            .read()?
            .resources
            .iter()
            .filter(|r| category.map_or(true, |c| r.category == c))
            .filter(|r| match (city_slug, r.city_slug.as_deref()) {
                (Some(wanted), Some(scoped)) => wanted == scoped,
                _ => true,
            })
            .cloned()
            .collect())
    }

    async fn resource_by_slug(&self, slug: &str) -> Result<Option<Resource>> {
        Ok(self
            .read()?
            .resources
            .iter()
            .find(|r| r.slug == slug)
            .cloned())
    }

    async fn create_resource(&self, resource: NewResource) -> Result<Resource> {
        resource.validate()?;
        let mut tables = self.write()?;
        if tables.resources.iter().any(|r| r.slug == resource.slug) {
            return Err(DirectoryError::validation(format!(
                "resource: slug already exists: {}",
                resource.slug
            )));
        }
        let record = resource.with_id(tables.resources.peek_id());
        tables.resources.insert(record.clone());
        Ok(record)
    }
}
