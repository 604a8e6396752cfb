//! Storage for the sports data ETL pipeline.
//!
//! This crate provides:
//! - The JSON file sink with its metadata envelope
//! - The durable document store (`PostgreSQL` or in-memory) with upsert semantics
//! - The multi-sink loader and its receipts
//! - The cached local dataset reader used by downstream consumers

pub mod cache;
pub mod entity;
pub mod file_sink;
pub mod loader;
pub mod reader;
pub mod store;

pub use cache::TtlCache;
pub use entity::{EntityKind, KeyScope, Loadable};
pub use file_sink::{Envelope, FileSink, LoadMetadata, SinkError, SCHEMA_VERSION};
pub use loader::{LoadReceipt, LoadStats, MultiSinkLoader};
pub use reader::{
    DatasetCache, DayWindow, FormResult, LocalDatasetReader, MatchFilter, TeamFeatures, TeamForm,
};
pub use store::{DurableStore, MemoryStore, PgDocumentStore, StoreError};
