//! HTTP handlers.
//!
//! `documents` holds the kind-generic orchestration; `invitations` and
//! `cards` are the two thin document services bound to a concrete
//! [`DocumentKind`](keepsake_db::models::document::DocumentKind).

pub mod cards;
pub mod documents;
pub mod invitations;
