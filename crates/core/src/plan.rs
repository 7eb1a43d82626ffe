//! Plan tiers and quota decision logic.
//!
//! A plan carries per-calendar-month ceilings for the three governed
//! actions plus the watermark policy applied to snapshots published under
//! it. The ceilings and the check itself are pure; the current counts come
//! from the usage ledger.

use crate::error::CoreError;

/// Plan code every account falls back to without an active subscription.
pub const FREE_PLAN_CODE: &str = "free";

/// The three actions governed by the usage ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaAction {
    Create,
    Edit,
    Publish,
}

impl QuotaAction {
    /// The usage-ledger column holding this action's counter.
    pub fn ledger_column(self) -> &'static str {
        match self {
            QuotaAction::Create => "created_count",
            QuotaAction::Edit => "edited_count",
            QuotaAction::Publish => "published_count",
        }
    }

    /// Human-readable action name for error messages.
    pub fn label(self) -> &'static str {
        match self {
            QuotaAction::Create => "create",
            QuotaAction::Edit => "edit",
            QuotaAction::Publish => "publish",
        }
    }
}

/// Check a period counter against a plan ceiling.
///
/// A ceiling of `0` means unlimited. Otherwise the action is rejected with
/// [`CoreError::Validation`] once `current` has reached the ceiling.
pub fn check_ceiling(action: QuotaAction, ceiling: i32, current: i32) -> Result<(), CoreError> {
    if ceiling == 0 {
        return Ok(());
    }
    if current >= ceiling {
        return Err(CoreError::Validation(format!(
            "Monthly {} limit of {ceiling} reached for the current plan",
            action.label()
        )));
    }
    Ok(())
}
