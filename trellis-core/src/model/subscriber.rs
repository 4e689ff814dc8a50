//! Subscription handles for live cells.
//!
//! Template bindings and computations watch the cells they read by calling
//! `Model::subscribe` with a `SubscriberId`. One id may cover several cells:
//! a computation registers every dependency under its own id, so replacing
//! the computation can remove exactly those callbacks again.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one binding or computation across the cells it watches.
///
/// Ids are process-wide, so a computation watching cells of another
/// view-model (through a mapping) never collides with that view-model's own
/// subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub fn new() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ViewModel;
    use serde_json::json;

    #[test]
    fn one_id_can_be_removed_without_touching_others() {
        let viewmodel = ViewModel::new(json!({ "a": 1, "b": 2 }));
        let (a, b) = (viewmodel.join_key("a"), viewmodel.join_key("b"));
        let binding = SubscriberId::new();
        let other = SubscriberId::default();
        assert_ne!(binding, other);

        a.subscribe(binding, || {});
        b.subscribe(binding, || {});
        a.subscribe(other, || {});

        a.unsubscribe(binding);
        b.unsubscribe(binding);

        assert_eq!(a.subscriber_count(), 1);
        assert_eq!(b.subscriber_count(), 0);
    }
}
