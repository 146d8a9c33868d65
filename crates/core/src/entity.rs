//! Entity traits: identity + continuity across state changes.

use chrono::{DateTime, Utc};

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Entities that are never physically deleted, only stamped as removed.
pub trait SoftDelete {
    /// When the entity was removed, if it was.
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    fn is_removed(&self) -> bool {
        self.deleted_at().is_some()
    }
}

/// Stamp `slot` with `at` unless it already carries a timestamp.
///
/// Returns `true` when the slot was written.
pub fn stamp_once(slot: &mut Option<DateTime<Utc>>, at: DateTime<Utc>) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(at);
    true
}

/// First entity in `items` whose id equals `id`.
pub fn find_by_id<'a, E: Entity>(items: &'a [E], id: &E::Id) -> Option<&'a E> {
    items.iter().find(|item| item.id() == id)
}

/// Mutable variant of [`find_by_id`].
pub fn find_by_id_mut<'a, E: Entity>(items: &'a mut [E], id: &E::Id) -> Option<&'a mut E> {
    items.iter_mut().find(|item| item.id() == id)
}

/// Entities whose id appears in `ids`, in the order they are stored in `items`.
///
/// Unknown ids are dropped; an empty `ids` yields an empty result.
pub fn find_many_by_ids<'a, E: Entity>(items: &'a [E], ids: &[E::Id]) -> Vec<&'a E> {
    if ids.is_empty() {
        return Vec::new();
    }
    items.iter().filter(|item| ids.contains(item.id())).collect()
}
