//! # Care Directory
//!
//! A senior-care facility directory: filterable facility listings, reviews
//! with live rating aggregation, city and resource pages, lead capture from
//! a care-needs quiz, and a chat assistant backed by an external LLM.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────────────────┐
//! │  Seed JSON  │──▶│  Store (in-memory arena) │
//! └─────────────┘   └────────────┬─────────────┘
//!                                │
//!              ┌─────────────────┼─────────────────┐
//!              ▼                 ▼                 ▼
//!         ┌──────────┐     ┌───────────┐     ┌───────────┐
//!         │   CLI    │     │ HTTP API  │────▶│ Assistant │──▶ LLM
//!         │(care-dir)│     │  (axum)   │     └───────────┘
//!         └──────────┘     └───────────┘
//! ```
//!
//! Models, validation, the query engine and the store live in the
//! `care-directory-core` crate; this crate wires them to configuration,
//! logging, the LLM provider and the frontends.
//!
//! ## Quick Start
//!
//! ```bash
//! care-dir serve                            # HTTP API on [server].bind
//! care-dir search --type MEMORY_CARE --sort rating
//! care-dir get mountain-view-senior-living
//! care-dir cities
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | Tracing subscriber setup |
//! | [`seed`] | Seed data loading |
//! | [`llm`] | Chat model provider abstraction |
//! | [`assistant`] | Chat sessions, fallback, facility suggestions |
//! | [`server`] | JSON HTTP API |
//! | [`listing`] | CLI read commands |

pub mod assistant;
pub mod config;
pub mod listing;
pub mod llm;
pub mod logging;
pub mod seed;
pub mod server;
