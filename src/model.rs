use serde::{Deserialize, Serialize};

/// Text shown for an absent name or description.
pub const PLACEHOLDER: &str = "...";

/// Text shown for an absent like count.
pub const ABSENT_LIKES: &str = "null";

/// URL variants of a photo as returned under `urls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageVariants {
    pub thumb: Option<String>,
    pub full: Option<String>,
}

/// A single search result entry.
///
/// Every field is optional on the wire; defaults are applied by the
/// `display_*` helpers at render time, never at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub id: Option<String>,
    pub name: Option<String>,
    pub age: Option<i64>,
    pub description: Option<String>,
    pub urls: Option<ImageVariants>,
    pub likes: Option<i64>,
    pub alt_description: Option<String>,
}

/// Envelope of `GET search/photos`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
    pub total_pages: i64,
}

impl SearchResultItem {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(PLACEHOLDER)
    }

    /// Age to show for this render.
    ///
    /// Known inconsistency: an absent age is drawn from 1..=5 on every call
    /// and not stored, so the same item can show a different age on each
    /// frame. Whether it should be fixed once at parse time is still open.
    pub fn display_age(&self, rng: &mut fastrand::Rng) -> i64 {
        self.age.unwrap_or_else(|| rng.i64(1..=5))
    }

    /// Like count to show.
    ///
    /// Known quirk: an absent count renders as the literal `null` rather
    /// than a friendly default. Kept as observed until someone decides it
    /// was a defect.
    pub fn display_likes(&self) -> String {
        match self.likes {
            Some(likes) => likes.to_string(),
            None => ABSENT_LIKES.to_string(),
        }
    }

    /// `description`, then `alt_description`, then the placeholder.
    pub fn display_description(&self) -> &str {
        self.description
            .as_deref()
            .or(self.alt_description.as_deref())
            .unwrap_or(PLACEHOLDER)
    }

    /// Thumbnail URL, empty when absent.
    pub fn thumb_url(&self) -> &str {
        self.urls
            .as_ref()
            .and_then(|u| u.thumb.as_deref())
            .unwrap_or("")
    }

    /// Full-size URL, empty when absent.
    pub fn full_url(&self) -> &str {
        self.urls
            .as_ref()
            .and_then(|u| u.full.as_deref())
            .unwrap_or("")
    }
}

#[cfg(test)]
pub(crate) fn item(id: &str, name: Option<&str>) -> SearchResultItem {
    SearchResultItem {
        id: Some(id.to_string()),
        name: name.map(str::to_string),
        age: None,
        description: None,
        urls: None,
        likes: None,
        alt_description: None,
    }
}
