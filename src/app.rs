use crate::api::PhotoSource;
use crate::model::SearchResultItem;
use crate::nav::{Navigator, Screen};
use crate::store::{Items, RefreshHandle, ResultStore, Subscription};
use std::cell::RefCell;
use std::sync::mpsc::{self, Receiver};

/// Main application state.
pub struct App<S> {
    pub store: ResultStore<S>,
    pub nav: Navigator,
    pub should_quit: bool,
    pub show_help: bool,

    // Latest snapshot delivered by the store subscription
    pub items: Items,
    updates: Receiver<Items>,
    _subscription: Subscription,

    // List view state
    pub list_selected: usize,
    refresh: Option<RefreshHandle>,
    cancel_on_exit: bool,
    // Fetch indicator as of the last `poll_fetch_state`
    fetch_shown: bool,

    // Drives the per-render age fallback
    pub age_rng: RefCell<fastrand::Rng>,

    // Status message
    pub status_msg: String,
}

impl<S: PhotoSource> App<S> {
    pub fn new(store: ResultStore<S>, cancel_on_exit: bool) -> Self {
        let (tx, updates) = mpsc::channel();
        let subscription = store.subscribe(move |items| {
            // The loop may already be gone during shutdown.
            let _ = tx.send(items.clone());
        });
        let items = updates.try_recv().unwrap_or_else(|_| store.current());

        Self {
            store,
            nav: Navigator::default(),
            should_quit: false,
            show_help: false,

            items,
            updates,
            _subscription: subscription,

            list_selected: 0,
            refresh: None,
            cancel_on_exit,
            fetch_shown: false,

            age_rng: RefCell::new(fastrand::Rng::new()),

            status_msg: String::new(),
        }
    }

    /// List screen entry: kick off a fetch without waiting for it.
    pub fn enter_list(&mut self) {
        self.refresh = Some(self.store.refresh());
        self.status_msg = "Fetching dogs...".to_string();
    }

    /// Pull every pending store update. Returns true if anything arrived.
    pub fn drain_updates(&mut self) -> bool {
        let mut changed = false;
        while let Ok(items) = self.updates.try_recv() {
            self.items = items;
            changed = true;
        }
        if changed {
            self.list_selected = self.list_selected.min(self.items.len().saturating_sub(1));
            self.status_msg = format!("{} loaded", dog_count(self.items.len()));
        }
        changed
    }

    /// Returns true when the fetch indicator flipped since the last call.
    /// The store notifies before its task exits, so the update alone can
    /// leave a stale indicator on screen.
    pub fn poll_fetch_state(&mut self) -> bool {
        let fetching = self.is_fetching();
        let flipped = fetching != self.fetch_shown;
        self.fetch_shown = fetching;
        flipped
    }

    /// Move selection down in the list.
    pub fn list_next(&mut self) {
        if self.list_selected + 1 < self.items.len() {
            self.list_selected += 1;
        }
    }

    /// Move selection up in the list.
    pub fn list_prev(&mut self) {
        self.list_selected = self.list_selected.saturating_sub(1);
    }

    pub fn list_first(&mut self) {
        self.list_selected = 0;
    }

    pub fn list_last(&mut self) {
        self.list_selected = self.items.len().saturating_sub(1);
    }

    pub fn selected_item(&self) -> Option<&SearchResultItem> {
        self.items.get(self.list_selected)
    }

    /// Row tap: hand the highlighted item to the detail screen.
    pub fn open_detail(&mut self) {
        let Some(item) = self.selected_item().cloned() else {
            return;
        };
        if self.cancel_on_exit {
            if let Some(handle) = self.refresh.take() {
                handle.cancel();
            }
        }
        self.nav.select_and_navigate(item);
    }

    /// Back from detail. Re-entering the list fetches again.
    pub fn go_back(&mut self) {
        if self.nav.screen() == Screen::Detail {
            self.nav.navigate_back();
            self.enter_list();
        }
    }

    /// Placeholder for the detail screen's Like action.
    pub fn like(&mut self) {
        tracing::debug!("like pressed");
    }

    pub fn is_fetching(&self) -> bool {
        self.refresh.as_ref().is_some_and(|h| !h.is_finished())
    }
}

/// "1 dog", "3 dogs".
pub fn dog_count(n: usize) -> String {
    if n == 1 {
        "1 dog".to_string()
    } else {
        format!("{n} dogs")
    }
}
