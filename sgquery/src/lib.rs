//! # sgquery - ShotGrid sequence and shot aggregation
//!
//! This crate connects to a ShotGrid site through its REST API and builds,
//! for one project, the list of its sequences, each carrying the values of a
//! set of query fields and the list of its shots with the same fields.
//!
//! ## Architecture
//!
//! - `api` : low-level REST access (authentication, paged entity search)
//! - `client` : [`ShotGridClient`], an authenticated client implementing
//!   [`EntityService`]
//! - `connector` : [`ShotGridConnector`], opening one connection on first use
//! - `evaluator` : [`evaluate_query_fields`], query field lookup for one entity
//! - `aggregator` : [`SequenceAggregator`], the project -> sequences -> shots
//!   walk
//! - `config_ext` : ShotGrid settings read from `sgconfig`
//! - `api_rest` : axum router (feature `server`)
//!
//! ```text
//! sgquery/
//! ├── src/
//! │   ├── lib.rs
//! │   ├── aggregator.rs
//! │   ├── evaluator.rs
//! │   ├── service.rs
//! │   ├── connector.rs
//! │   ├── client.rs
//! │   ├── config_ext.rs
//! │   ├── models.rs
//! │   ├── error.rs
//! │   ├── api_rest.rs
//! │   └── api/
//! │       ├── mod.rs
//! │       ├── auth.rs
//! │       └── entity.rs
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sgconfig::Config;
//! use sgquery::{SequenceAggregator, ShotGridConfigExt, open_configured_connection};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load_config("")?;
//!     let (_connector, client) = open_configured_connection(&config).await?;
//!
//!     let aggregator =
//!         SequenceAggregator::with_query_fields(client.as_ref(), config.get_query_fields()?);
//!     let sequences = aggregator
//!         .get_sequence_query_results(config.get_default_project_id()?)
//!         .await?;
//!     println!("{}", serde_json::to_string_pretty(&sequences)?);
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod api;
pub mod client;
pub mod config_ext;
pub mod connector;
pub mod error;
pub mod evaluator;
pub mod models;
pub mod service;

#[cfg(feature = "server")]
pub mod api_rest;

pub use aggregator::{SequenceAggregator, get_sequence_query_results};
pub use api::auth::AuthInfo;
pub use client::{ConnectionSettings, ShotGridClient};
pub use config_ext::ShotGridConfigExt;
pub use connector::{ShotGridConnector, open_configured_connection, open_connection};
pub use error::{Result, ShotGridError};
pub use evaluator::evaluate_query_fields;
pub use models::{
    Entity, EntityRef, Filter, QueryFieldSet, QueryFields, SequenceRecord, ShotRecord,
};
pub use service::EntityService;
