//! Aggregate root trait for catalog domain models.

use chrono::{DateTime, Utc};

use crate::entity::{Entity, SoftDelete};

/// Aggregate root marker + minimal interface.
///
/// The root is the only entity adapters load and persist; owned sub-entities are
/// reached through it. Implementations must not perform IO.
pub trait AggregateRoot: Entity + SoftDelete {
    /// When the aggregate was created.
    fn created_at(&self) -> DateTime<Utc>;

    /// Last time any state of the aggregate actually changed.
    fn updated_at(&self) -> DateTime<Utc>;
}
