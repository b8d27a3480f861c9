//! Persisted entity store.
//!
//! Each entity (language, bulletin, members, events, news) lives in its own
//! durable slot. Values are hydrated once at startup, falling back to the
//! compiled-in seed data, and written through in full after every mutation.

pub mod ids;
pub mod manager;
pub mod ops;

pub use ids::{IdSource, TimestampIds};
pub use manager::{Entities, EntityStore};
pub use ops::Identified;
