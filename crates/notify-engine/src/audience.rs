//! Audience label normalization and resolution.

use crate::NotifyResult;
use resident_directory::{DirectoryStore, UserRecord};
use std::collections::HashSet;
use tracing::debug;

/// Reserved label meaning every approved, active resident.
pub const GENERAL_AUDIENCE: &str = "General Residents";

/// Trim labels, drop empties, deduplicate preserving first-seen order.
pub fn normalize_audiences(audiences: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut cleaned = Vec::new();
    for audience in audiences {
        let label = audience.trim();
        if label.is_empty() {
            continue;
        }
        if seen.insert(label) {
            cleaned.push(label.to_string());
        }
    }
    cleaned
}

/// Resolve audience labels to the users to notify.
///
/// - Empty label list: nobody. Sending to "no audience" must never mean
///   "everyone".
/// - Only the reserved [`GENERAL_AUDIENCE`] label: every approved, active
///   resident.
/// - Any specific labels: the approved/active resident population filtered
///   to users whose categories intersect the specific labels
///   (case-insensitive, trimmed). Specific labels always narrow; the
///   reserved label never broadens the result back out.
///
/// Directory queries are case-sensitive, so the population is fetched once
/// and category matching happens in memory.
pub fn resolve_audience<D: DirectoryStore>(
    store: &D,
    audiences: &[String],
) -> NotifyResult<Vec<UserRecord>> {
    let audiences = normalize_audiences(audiences);
    if audiences.is_empty() {
        return Ok(Vec::new());
    }

    let specific: Vec<String> = audiences
        .iter()
        .filter(|label| *label != GENERAL_AUDIENCE)
        .map(|label| label.to_lowercase())
        .collect();

    let residents = store.approved_active_residents()?;
    if specific.is_empty() {
        debug!(matched = residents.len(), "Resolved general audience");
        return Ok(residents);
    }

    let matched: Vec<UserRecord> = residents
        .into_iter()
        .filter(|user| {
            user.categories
                .iter()
                .map(|category| category.trim().to_lowercase())
                .any(|category| !category.is_empty() && specific.contains(&category))
        })
        .collect();

    debug!(labels = specific.len(), matched = matched.len(), "Resolved specific audience");
    Ok(matched)
}
