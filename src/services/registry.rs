//! Keeps one [`BookingList`] per viewer and route alive between requests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::booking::BookingRoute;
use crate::services::booking_list::BookingList;

type ListKey = (String, BookingRoute);

struct Entry<R> {
    list: Arc<BookingList<R>>,
    /// Epoch seconds after which the owner's login is no longer valid.
    expires_at: i64,
}

pub struct BookingListRegistry<R> {
    lists: Mutex<HashMap<ListKey, Entry<R>>>,
}

impl<R> Default for BookingListRegistry<R> {
    fn default() -> Self {
        Self {
            lists: Mutex::new(HashMap::new()),
        }
    }
}

impl<R> BookingListRegistry<R> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ListKey, Entry<R>>> {
        self.lists.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the owner's list for `route` when `reuse` accepts it, otherwise
    /// stores and returns the one built by `create`. Lookup and insertion
    /// happen under a single lock.
    pub fn get_or_insert_with<F, C>(
        &self,
        owner: &str,
        route: BookingRoute,
        expires_at: i64,
        reuse: F,
        create: C,
    ) -> Arc<BookingList<R>>
    where
        F: FnOnce(&BookingList<R>) -> bool,
        C: FnOnce() -> BookingList<R>,
    {
        let mut lists = self.lock();
        let key = (owner.to_string(), route);
        if let Some(entry) = lists.get_mut(&key).filter(|entry| reuse(&entry.list)) {
            entry.expires_at = entry.expires_at.max(expires_at);
            return Arc::clone(&entry.list);
        }

        let list = Arc::new(create());
        lists.insert(
            key,
            Entry {
                list: Arc::clone(&list),
                expires_at,
            },
        );
        list
    }

    /// Drops every list held for `owner`, returning how many there were.
    pub fn forget_owner(&self, owner: &str) -> usize {
        let mut lists = self.lock();
        let before = lists.len();
        lists.retain(|(list_owner, _), _| list_owner != owner);
        before - lists.len()
    }

    /// Drops lists whose login expired at or before `now` (epoch seconds).
    pub fn evict_expired(&self, now: i64) -> usize {
        let mut lists = self.lock();
        let before = lists.len();
        lists.retain(|_, entry| entry.expires_at > now);
        before - lists.len()
    }

    /// Number of lists currently held.
    pub fn list_count(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;
    use std::thread;

    use super::*;
    use crate::domain::types::CustomerId;
    use crate::repository::in_memory::InMemoryRepository;
    use crate::services::query_builder::BookingListContext;

    const LATER: i64 = 4_102_444_800;

    fn list(route: BookingRoute) -> BookingList<InMemoryRepository> {
        let context =
            BookingListContext::new(route, false, Some(CustomerId::new(1).unwrap())).unwrap();
        BookingList::new(InMemoryRepository::default(), context)
    }

    fn open(
        registry: &BookingListRegistry<InMemoryRepository>,
        owner: &str,
        route: BookingRoute,
        expires_at: i64,
    ) -> Arc<BookingList<InMemoryRepository>> {
        registry.get_or_insert_with(owner, route, expires_at, |_| true, || list(route))
    }

    #[test]
    fn lists_are_kept_per_owner_and_route() {
        let registry = BookingListRegistry::new();

        let first = open(&registry, "u1", BookingRoute::Hotel, LATER);
        let other = open(&registry, "u2", BookingRoute::Hotel, LATER);
        let again = open(&registry, "u1", BookingRoute::Hotel, LATER);

        assert!(Arc::ptr_eq(&first, &again));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(registry.list_count(), 2);
    }

    #[test]
    fn rejected_list_is_replaced() {
        let registry = BookingListRegistry::new();
        let old = open(&registry, "u1", BookingRoute::Hotel, LATER);
        let new = registry.get_or_insert_with(
            "u1",
            BookingRoute::Hotel,
            LATER,
            |_| false,
            || list(BookingRoute::Hotel),
        );

        assert!(!Arc::ptr_eq(&old, &new));
        assert!(Arc::ptr_eq(&new, &open(&registry, "u1", BookingRoute::Hotel, LATER)));
        assert_eq!(registry.list_count(), 1);
    }

    #[test]
    fn concurrent_first_visits_share_one_list() {
        let registry = BookingListRegistry::new();
        let barrier = Barrier::new(8);

        let opened: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        open(&registry, "u1", BookingRoute::Carro, LATER)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(opened.iter().all(|list| Arc::ptr_eq(list, &opened[0])));
        assert_eq!(registry.list_count(), 1);
    }

    #[test]
    fn forgetting_owner_drops_all_their_lists() {
        let registry = BookingListRegistry::new();
        open(&registry, "u1", BookingRoute::Hotel, LATER);
        open(&registry, "u1", BookingRoute::Carro, LATER);
        open(&registry, "u2", BookingRoute::Carro, LATER);

        assert_eq!(registry.forget_owner("u1"), 2);
        assert_eq!(registry.list_count(), 1);
    }

    #[test]
    fn expired_logins_are_evicted() {
        let registry = BookingListRegistry::new();
        open(&registry, "gone", BookingRoute::Hotel, 1_000);
        open(&registry, "active", BookingRoute::Hotel, 2_000);

        assert_eq!(registry.evict_expired(1_000), 1);
        assert_eq!(registry.list_count(), 1);

        // A renewed login extends the list it already has.
        open(&registry, "active", BookingRoute::Hotel, 3_000);
        assert_eq!(registry.evict_expired(2_500), 0);
    }
}
