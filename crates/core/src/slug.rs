//! Slug normalization, validation, and candidate generation.
//!
//! A slug is the human-readable identifier a published document is reached
//! under. Normalization is idempotent; validation is strict. Uniqueness is
//! not decided here — the repository pre-checks availability and the
//! database unique index is the final arbiter at commit time.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

use crate::error::CoreError;

/// Minimum length of a normalized slug.
pub const MIN_LENGTH: usize = 3;

/// Maximum length of a normalized slug.
pub const MAX_LENGTH: usize = 50;

/// Length of the short token appended to a taken name-based candidate.
pub const SHORT_TOKEN_LENGTH: usize = 4;

/// Length of the token used for fully random candidates.
pub const RANDOM_TOKEN_LENGTH: usize = 8;

/// Shape of a valid slug: hyphen-separated runs of `[a-z0-9]`.
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid regex"));

/// Normalize a raw candidate into slug form.
///
/// Lowercases, trims, strips every character outside `[a-z0-9\s-]`,
/// collapses whitespace runs to single hyphens, collapses repeated
/// hyphens, and trims leading/trailing hyphens. The result may still be
/// invalid (too short after stripping); call [`validate`] afterwards.
///
/// Normalization is idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();

    let mut out = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;
    for c in lowered.chars() {
        let mapped = match c {
            'a'..='z' | '0'..='9' => Some(c),
            '-' => None,
            c if c.is_whitespace() => None,
            _ => continue,
        };
        match mapped {
            Some(c) => {
                if pending_hyphen && !out.is_empty() {
                    out.push('-');
                }
                pending_hyphen = false;
                out.push(c);
            }
            // Hyphens and whitespace both separate; runs collapse to one.
            None => pending_hyphen = true,
        }
    }
    out
}

/// Validate an already-normalized slug.
///
/// Fails with [`CoreError::Validation`] when the length is outside
/// `[MIN_LENGTH, MAX_LENGTH]` or the slug does not match the pattern.
pub fn validate(slug: &str) -> Result<(), CoreError> {
    if slug.len() < MIN_LENGTH || slug.len() > MAX_LENGTH {
        return Err(CoreError::Validation(format!(
            "Slug must be between {MIN_LENGTH} and {MAX_LENGTH} characters, got {}",
            slug.len()
        )));
    }
    if !SLUG_RE.is_match(slug) {
        return Err(CoreError::Validation(format!(
            "Slug '{slug}' may only contain lowercase letters, digits, and single hyphens"
        )));
    }
    Ok(())
}

/// Normalize a raw candidate and validate the result.
pub fn normalize_and_validate(raw: &str) -> Result<String, CoreError> {
    let slug = normalize(raw);
    validate(&slug)?;
    Ok(slug)
}

/// Build a name-based candidate from a document's identifying fields,
/// e.g. the two party names of an invitation. Returns `None` when the
/// joined, normalized form does not validate (empty names, all-stripped
/// scripts, over-length).
pub fn from_names(parts: &[&str]) -> Option<String> {
    let joined = parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    let slug = normalize(&joined);
    validate(&slug).ok().map(|_| slug)
}

/// A lowercase alphanumeric token of the given length.
pub fn random_token(len: usize) -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .map(|b| (b as char).to_ascii_lowercase())
        .take(len)
        .collect()
}

/// Suffix a base slug with a short random token, keeping the result
/// within [`MAX_LENGTH`].
pub fn with_short_token(base: &str) -> String {
    let budget = MAX_LENGTH - SHORT_TOKEN_LENGTH - 1;
    let base = if base.len() > budget {
        base[..budget].trim_end_matches('-')
    } else {
        base
    };
    format!("{base}-{}", random_token(SHORT_TOKEN_LENGTH))
}

/// A fully random candidate under a fixed prefix, e.g. `wedding-k3f9a2bq`.
pub fn random_candidate(prefix: &str) -> String {
    format!("{prefix}-{}", random_token(RANDOM_TOKEN_LENGTH))
}
