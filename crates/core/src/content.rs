//! The document content record.
//!
//! Content is stored as a single JSONB blob on the document row and copied
//! verbatim into publication snapshots. The record is schema-tolerant:
//! every field is optional with a default, and unknown JSON keys are
//! ignored on deserialization so old snapshots survive schema growth.
//! Lifecycle status is embedded here rather than held in a separate
//! column — a deleted document keeps its row (and its snapshot history)
//! forever.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Lifecycle status embedded in the content blob.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocStatus {
    #[default]
    Active,
    Deleted,
}

impl DocStatus {
    /// The JSON string value, as used in `content->>'status'` SQL filters.
    pub fn as_str(self) -> &'static str {
        match self {
            DocStatus::Active => "active",
            DocStatus::Deleted => "deleted",
        }
    }
}

/// Structured fields of an invitation or thank-you card.
///
/// All fields are optional; a freshly created draft is an empty record
/// with `status = active`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentContent {
    pub status: DocStatus,
    /// Display title shown in browser tabs and share cards.
    pub title: Option<String>,
    pub groom_name: Option<String>,
    pub bride_name: Option<String>,
    /// Addressee of a thank-you card.
    pub recipient_name: Option<String>,
    /// Free-form greeting / body message.
    pub message: Option<String>,
    pub event_at: Option<Timestamp>,
    pub venue_name: Option<String>,
    pub venue_address: Option<String>,
    /// Public URLs of uploaded gallery photos, in display order.
    pub photo_urls: Vec<String>,
    pub cover_image_url: Option<String>,
    /// Visual theme key interpreted by the renderer.
    pub theme: Option<String>,
}

impl DocumentContent {
    pub fn is_deleted(&self) -> bool {
        self.status == DocStatus::Deleted
    }

    pub fn mark_deleted(&mut self) {
        self.status = DocStatus::Deleted;
    }

    /// Every uploaded-media URL referenced by this content, for ownership
    /// vetting on edit.
    pub fn referenced_urls(&self) -> impl Iterator<Item = &str> {
        self.photo_urls
            .iter()
            .map(String::as_str)
            .chain(self.cover_image_url.as_deref())
    }

    /// Apply a field-wise patch: present fields replace, absent fields keep
    /// their value. Status is not patchable — it only changes through the
    /// delete flow.
    pub fn apply(&mut self, patch: ContentPatch) {
        macro_rules! take {
            ($field:ident) => {
                if let Some(v) = patch.$field {
                    self.$field = Some(v);
                }
            };
        }
        take!(title);
        take!(groom_name);
        take!(bride_name);
        take!(recipient_name);
        take!(message);
        take!(event_at);
        take!(venue_name);
        take!(venue_address);
        take!(cover_image_url);
        take!(theme);
        if let Some(urls) = patch.photo_urls {
            self.photo_urls = urls;
        }
    }
}

/// Field-wise update payload for a draft. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContentPatch {
    pub title: Option<String>,
    pub groom_name: Option<String>,
    pub bride_name: Option<String>,
    pub recipient_name: Option<String>,
    pub message: Option<String>,
    pub event_at: Option<Timestamp>,
    pub venue_name: Option<String>,
    pub venue_address: Option<String>,
    pub photo_urls: Option<Vec<String>>,
    pub cover_image_url: Option<String>,
    pub theme: Option<String>,
}
