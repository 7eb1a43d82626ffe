//! Document models: invitations and thank-you cards.
//!
//! The two document kinds share one row shape and one repository; the kind
//! selects the table. Lifecycle status lives inside the content blob — a
//! document row is never removed once created.

use keepsake_core::content::DocumentContent;
use keepsake_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// The two document kinds, each backed by its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Invitation,
    ThankyouCard,
}

impl DocumentKind {
    /// The backing table name. Only ever interpolated from this closed
    /// enum, never from request input.
    pub fn table(self) -> &'static str {
        match self {
            DocumentKind::Invitation => "invitations",
            DocumentKind::ThankyouCard => "thankyou_cards",
        }
    }

    /// The `owner_type` tag used by snapshots and file assets.
    pub fn owner_type(self) -> &'static str {
        match self {
            DocumentKind::Invitation => "invitation",
            DocumentKind::ThankyouCard => "thankyou_card",
        }
    }

    /// Entity name for not-found errors.
    pub fn entity(self) -> &'static str {
        match self {
            DocumentKind::Invitation => "Invitation",
            DocumentKind::ThankyouCard => "ThankyouCard",
        }
    }

    /// Path segment of the public share URL.
    pub fn share_path(self) -> &'static str {
        match self {
            DocumentKind::Invitation => "invitations",
            DocumentKind::ThankyouCard => "cards",
        }
    }

    /// Prefix for fully random slug candidates.
    pub fn slug_prefix(self) -> &'static str {
        match self {
            DocumentKind::Invitation => "wedding",
            DocumentKind::ThankyouCard => "thanks",
        }
    }
}

/// A row from the `invitations` or `thankyou_cards` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: DbId,
    pub account_id: DbId,
    /// Unique among non-deleted documents of the same kind when present.
    pub slug: Option<String>,
    pub content: Json<DocumentContent>,
    /// The currently published snapshot; `None` while unpublished.
    pub published_snapshot_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Document {
    pub fn is_published(&self) -> bool {
        self.published_snapshot_id.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.content.is_deleted()
    }
}
