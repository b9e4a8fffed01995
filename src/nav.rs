use crate::model::SearchResultItem;

/// Which screen is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List,
    Detail,
}

/// Two-screen stack with a one-item handoff from list to detail.
#[derive(Debug, Clone)]
pub struct Navigator {
    screen: Screen,
    selection: Option<SearchResultItem>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            screen: Screen::List,
            selection: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Hand `item` to the detail screen and open it.
    pub fn select_and_navigate(&mut self, item: SearchResultItem) {
        tracing::debug!(id = item.id.as_deref().unwrap_or(""), "open detail");
        self.selection = Some(item);
        self.screen = Screen::Detail;
    }

    /// Back to the list. The selection is left in place until the next
    /// `select_and_navigate` overwrites it.
    pub fn navigate_back(&mut self) {
        self.screen = Screen::List;
    }

    /// Record handed to the detail screen, if any.
    pub fn selection(&self) -> Option<&SearchResultItem> {
        self.selection.as_ref()
    }
}
