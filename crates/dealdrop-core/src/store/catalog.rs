// ── Deal catalog ──
//
// Concurrent storage for the fetched deal list with O(1) lookups and
// push-based change notification via a `watch` channel. The snapshot keeps
// the backend's listing order so stable sorts tie-break predictably.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::{Deal, DealId};

/// Ordered snapshot type published to subscribers.
pub type DealSnapshot = Vec<Arc<Deal>>;

pub(crate) struct DealCatalog {
    by_id: DashMap<DealId, Arc<Deal>>,
    /// Full ordered snapshot, rebuilt on mutation.
    snapshot: watch::Sender<Arc<DealSnapshot>>,
}

impl DealCatalog {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            by_id: DashMap::new(),
            snapshot,
        }
    }

    /// Replace the whole catalog, preserving the given order.
    pub(crate) fn replace_all(&self, deals: Vec<Deal>) {
        let ordered: DealSnapshot = deals.into_iter().map(Arc::new).collect();
        self.by_id.clear();
        for deal in &ordered {
            self.by_id.insert(deal.id.clone(), Arc::clone(deal));
        }
        self.snapshot.send_modify(|snap| *snap = Arc::new(ordered));
    }

    /// Insert or update one deal. Returns `true` if it was new.
    ///
    /// Updated deals keep their position; new deals are appended.
    pub(crate) fn upsert(&self, deal: Deal) -> bool {
        let deal = Arc::new(deal);
        let is_new = self
            .by_id
            .insert(deal.id.clone(), Arc::clone(&deal))
            .is_none();

        self.snapshot.send_modify(|snap| {
            let mut next: DealSnapshot = snap.as_ref().clone();
            match next.iter_mut().find(|d| d.id == deal.id) {
                Some(slot) => *slot = Arc::clone(&deal),
                None => next.push(Arc::clone(&deal)),
            }
            *snap = Arc::new(next);
        });
        is_new
    }

    pub(crate) fn get(&self, id: &DealId) -> Option<Arc<Deal>> {
        self.by_id.get(id).map(|r| Arc::clone(r.value()))
    }

    /// Current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<DealSnapshot> {
        Arc::clone(&self.snapshot.borrow())
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<DealSnapshot>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(catalog: &DealCatalog) -> Vec<String> {
        catalog
            .snapshot()
            .iter()
            .map(|d| d.id.to_string())
            .collect()
    }

    #[test]
    fn upsert_keeps_position_and_appends_new() {
        let catalog = DealCatalog::new();
        catalog.replace_all(vec![Deal::new("a", "A"), Deal::new("b", "B")]);

        assert!(!catalog.upsert(Deal::new("a", "A2")));
        assert!(catalog.upsert(Deal::new("c", "C")));

        assert_eq!(ids(&catalog), vec!["a", "b", "c"]);
        let a = catalog.get(&DealId::new("a")).expect("a present");
        assert_eq!(a.title, "A2");
    }

    #[tokio::test]
    async fn subscribers_see_replacements() {
        let catalog = DealCatalog::new();
        let mut rx = catalog.subscribe();
        catalog.replace_all(vec![Deal::new("x", "X")]);
        rx.changed().await.expect("sender alive");
        assert_eq!(rx.borrow().len(), 1);
        assert!(!catalog.is_empty());
    }
}
