use crate::api::PhotoSource;
use crate::model::SearchResultItem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use tokio::task::JoinHandle;

/// Snapshot of the held results. Cheap to clone and never mutated.
pub type Items = Arc<[SearchResultItem]>;

type Observer = Box<dyn Fn(&Items) + Send>;

struct Observers {
    next_id: u64,
    entries: Vec<(u64, Observer)>,
}

/// Observable holder of the current result list.
///
/// Single writer (`replace`), many readers. `replace` swaps and delivers
/// under the observer lock, so deliveries of successive updates never
/// interleave and every subscriber sees each value exactly once. Observers
/// may call `current` but must not subscribe or replace from inside a
/// delivery.
pub struct ResultStore<S> {
    source: Arc<S>,
    items: Arc<RwLock<Items>>,
    observers: Arc<Mutex<Observers>>,
}

impl<S> Clone for ResultStore<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            items: Arc::clone(&self.items),
            observers: Arc::clone(&self.observers),
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: PhotoSource> ResultStore<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            items: Arc::new(RwLock::new(Arc::from(Vec::new()))),
            observers: Arc::new(Mutex::new(Observers {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Latest value.
    pub fn current(&self) -> Items {
        let guard = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Register `observer`. It is called once right away with the current
    /// value and again after every `replace`, until the returned handle is
    /// dropped.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&Items) + Send + 'static,
    {
        let mut observers = lock(&self.observers);
        observer(&self.current());

        let id = observers.next_id;
        observers.next_id += 1;
        observers.entries.push((id, Box::new(observer)));
        tracing::trace!(id, "store subscriber added");

        Subscription {
            id,
            observers: Arc::downgrade(&self.observers),
        }
    }

    /// Swap in `items` and notify every subscriber.
    pub fn replace(&self, items: Vec<SearchResultItem>) {
        let observers = lock(&self.observers);
        let items: Items = Arc::from(items);
        {
            let mut held = self.items.write().unwrap_or_else(PoisonError::into_inner);
            *held = Arc::clone(&items);
        }
        for (_, observer) in &observers.entries {
            observer(&items);
        }
    }

    /// Fetch in the background and `replace` with whatever comes back; an
    /// absent response becomes an empty list.
    ///
    /// Overlapping refreshes are not deduplicated: whichever completes last
    /// wins, regardless of issue order.
    pub fn refresh(&self) -> RefreshHandle {
        let store = self.clone();
        tracing::debug!("refresh issued");
        let task = tokio::spawn(async move {
            let results = match store.source.fetch_dogs().await {
                Some(resp) => {
                    tracing::debug!(total_pages = resp.total_pages, "search page received");
                    resp.results
                }
                None => Vec::new(),
            };
            tracing::info!(count = results.len(), "refresh applied");
            store.replace(results);
        });
        RefreshHandle { task }
    }
}

/// Keeps an observer attached. Dropping it detaches the observer.
pub struct Subscription {
    id: u64,
    observers: Weak<Mutex<Observers>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(observers) = self.observers.upgrade() {
            lock(&observers).entries.retain(|(id, _)| *id != self.id);
            tracing::trace!(id = self.id, "store subscriber removed");
        }
    }
}

/// Handle to an in-flight refresh.
///
/// Dropping it leaves the fetch running; `cancel` aborts it before it can
/// touch the store.
#[derive(Debug)]
pub struct RefreshHandle {
    task: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn cancel(&self) {
        if !self.task.is_finished() {
            tracing::debug!("refresh cancelled");
            self.task.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StaticSource;
    use crate::model::{SearchResponse, item};
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    impl RefreshHandle {
        async fn join(self) {
            let _ = self.task.await;
        }
    }

    /// Each call waits on its own gate, in call order.
    struct GatedSource {
        calls: AtomicUsize,
        gates: Mutex<Vec<Option<oneshot::Receiver<Option<SearchResponse>>>>>,
    }

    impl GatedSource {
        fn new(n: usize) -> (Self, Vec<oneshot::Sender<Option<SearchResponse>>>) {
            let (txs, rxs): (Vec<_>, Vec<_>) = (0..n).map(|_| oneshot::channel()).unzip();
            let source = Self {
                calls: AtomicUsize::new(0),
                gates: Mutex::new(rxs.into_iter().map(Some).collect()),
            };
            (source, txs)
        }
    }

    impl PhotoSource for GatedSource {
        async fn fetch_dogs(&self) -> Option<SearchResponse> {
            let gate = {
                let i = self.calls.fetch_add(1, Ordering::SeqCst);
                self.gates.lock().unwrap().get_mut(i).and_then(Option::take)
            };
            match gate {
                Some(rx) => rx.await.ok().flatten(),
                None => None,
            }
        }
    }

    fn page(n: usize) -> SearchResponse {
        SearchResponse {
            results: (0..n).map(|i| item(&i.to_string(), Some("Rex"))).collect(),
            total_pages: 1,
        }
    }

    fn ids(items: &Items) -> Vec<String> {
        items.iter().filter_map(|i| i.id.clone()).collect()
    }

    #[test]
    fn test_initial_value_is_empty() {
        let store = ResultStore::new(StaticSource(None));
        assert!(store.current().is_empty());
    }

    #[test]
    fn test_subscribe_delivers_current_immediately() {
        let store = ResultStore::new(StaticSource(None));
        store.replace(page(2).results);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = store.subscribe(move |items| sink.lock().unwrap().push(items.len()));
        assert_eq!(*seen.lock().unwrap(), vec![2]);

        store.replace(page(3).results);
        assert_eq!(*seen.lock().unwrap(), vec![2, 3]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let store = ResultStore::new(StaticSource(None));
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let sub = store.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        store.replace(page(1).results);
        drop(sub);
        store.replace(page(2).results);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_observer_may_read_current() {
        let store = ResultStore::new(StaticSource(None));
        let reader = store.clone();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = store.subscribe(move |items| {
            sink.lock().unwrap().push(reader.current().len() == items.len());
        });
        store.replace(page(4).results);
        assert_eq!(*seen.lock().unwrap(), vec![true, true]);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_store_empty() {
        let store = ResultStore::new(StaticSource(None));
        store.replace(page(3).results);
        store.refresh().join().await;
        assert!(store.current().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_applies_results() {
        let store = ResultStore::new(StaticSource(Some(page(5))));
        store.refresh().join().await;
        assert_eq!(store.current().len(), 5);
    }

    #[tokio::test]
    async fn test_last_completed_refresh_wins() {
        let (source, mut gates) = GatedSource::new(2);
        let store = ResultStore::new(source);

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let _sub = store.subscribe(move |items| {
            let _ = tx.send(items.len());
        });
        assert_eq!(rx.recv().await, Some(0));

        let first = store.refresh();
        let second = store.refresh();
        while store.source.calls.load(Ordering::SeqCst) < 2 {
            tokio::task::yield_now().await;
        }

        let r1 = gates.remove(0);
        let r2 = gates.remove(0);
        r2.send(Some(page(5))).unwrap();
        assert_eq!(rx.recv().await, Some(5));
        r1.send(Some(page(3))).unwrap();
        assert_eq!(rx.recv().await, Some(3));

        first.join().await;
        second.join().await;
        assert_eq!(store.current().len(), 3);
    }

    #[tokio::test]
    async fn test_cancelled_refresh_never_replaces() {
        let (source, mut gates) = GatedSource::new(1);
        let store = ResultStore::new(source);
        store.replace(page(2).results);

        let handle = store.refresh();
        while store.source.calls.load(Ordering::SeqCst) < 1 {
            tokio::task::yield_now().await;
        }
        handle.cancel();
        assert!(handle.task.await.unwrap_err().is_cancelled());

        // The receiver went away with the aborted task.
        let gate = gates.remove(0);
        assert!(gate.send(Some(page(7))).is_err());
        assert_eq!(store.current().len(), 2);
    }

    #[tokio::test]
    async fn test_dropped_handle_keeps_fetch_running() {
        let store = ResultStore::new(StaticSource(Some(page(4))));
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let _sub = store.subscribe(move |items| {
            let _ = tx.send(items.len());
        });
        assert_eq!(rx.recv().await, Some(0));

        drop(store.refresh());
        assert_eq!(rx.recv().await, Some(4));
    }

    proptest! {
        #[test]
        fn prop_every_replace_observed_exactly_once(sizes in prop::collection::vec(0usize..8, 0..20)) {
            let store = ResultStore::new(StaticSource(None));
            let a = Arc::new(Mutex::new(Vec::new()));
            let b = Arc::new(Mutex::new(Vec::new()));
            let (sa, sb) = (Arc::clone(&a), Arc::clone(&b));
            let _s1 = store.subscribe(move |items| sa.lock().unwrap().push(ids(items)));
            let _s2 = store.subscribe(move |items| sb.lock().unwrap().push(ids(items)));

            let mut expected = vec![Vec::new()];
            for n in &sizes {
                let items = page(*n).results;
                expected.push(items.iter().filter_map(|i| i.id.clone()).collect());
                store.replace(items);
            }

            prop_assert_eq!(&*a.lock().unwrap(), &expected);
            prop_assert_eq!(&*b.lock().unwrap(), &expected);
        }

        #[test]
        fn prop_concurrent_replaces_are_not_torn(sizes in prop::collection::vec(1usize..8, 1..12)) {
            let store = ResultStore::new(StaticSource(None));
            let a = Arc::new(Mutex::new(Vec::new()));
            let b = Arc::new(Mutex::new(Vec::new()));
            let (sa, sb) = (Arc::clone(&a), Arc::clone(&b));
            let _s1 = store.subscribe(move |items| sa.lock().unwrap().push(items.len()));
            let _s2 = store.subscribe(move |items| sb.lock().unwrap().push(items.len()));

            std::thread::scope(|scope| {
                for n in &sizes {
                    let store = store.clone();
                    let n = *n;
                    scope.spawn(move || store.replace(page(n).results));
                }
            });

            let a = a.lock().unwrap().clone();
            let b = b.lock().unwrap().clone();
            // Same order for every subscriber, one delivery per replace.
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(a.len(), sizes.len() + 1);
            let mut got = a[1..].to_vec();
            let mut want = sizes.clone();
            got.sort_unstable();
            want.sort_unstable();
            prop_assert_eq!(got, want);
            prop_assert_eq!(store.current().len(), *a.last().unwrap());
        }
    }
}
