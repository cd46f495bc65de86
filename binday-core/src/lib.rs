//! Core types and service wiring for the binday collection schedule service.

/// Clock abstraction used for cache freshness and date queries.
pub mod clock;
/// Domain models for properties, schedules, and cache entries.
pub mod model;
/// Traits describing the renderer and schedule source seams.
pub mod ports;
/// Derived views answering "when is the next collection" style questions.
pub mod query;
/// Cache-backed service facade used by the API.
pub mod service;

pub use clock::*;
pub use model::*;
pub use ports::*;
pub use query::*;
pub use service::*;
