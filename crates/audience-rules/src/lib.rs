//! Rule-based audience recommendation.
//!
//! Maps announcement text to audience labels through a configurable keyword
//! rule list. No inference involved: matching is transparent and the rules
//! that fired are returned alongside the labels so an admin can see exactly
//! why a group was suggested.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// Audience returned when no rule matches.
pub const DEFAULT_AUDIENCE: &str = "General Residents";

/// One keyword rule: any keyword hit suggests all of the rule's audiences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub keywords: Vec<String>,
    pub audiences: Vec<String>,
}

/// Outcome of a recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    /// Suggested audience labels, deduplicated in rule order.
    pub audiences: Vec<String>,
    /// Rules that fired, for explainability.
    pub matched_rules: Vec<Rule>,
    /// True when no rule matched and [`DEFAULT_AUDIENCE`] was substituted.
    pub default_used: bool,
}

/// Rule file shape: either `{ "rules": [...] }` or a bare rule array.
#[derive(Deserialize)]
struct RuleFile {
    rules: Vec<Rule>,
}

/// Load rules from a JSON file.
///
/// A missing or malformed file yields an empty rule list rather than an
/// error; recommendation then falls back to [`DEFAULT_AUDIENCE`].
pub fn load_rules(path: &Path) -> Vec<Rule> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "No audience rule file");
            return Vec::new();
        }
    };

    if let Ok(file) = serde_json::from_str::<RuleFile>(&content) {
        return file.rules;
    }
    match serde_json::from_str::<Vec<Rule>>(&content) {
        Ok(rules) => rules,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Invalid audience rule file");
            Vec::new()
        }
    }
}

/// Recommend audiences for announcement text.
///
/// Keywords match case-insensitively on word boundaries, tolerating simple
/// English plurals ("road" also hits "roads"). The first matching keyword
/// settles a rule; audiences accumulate across rules without duplicates.
pub fn recommend_audiences(text: &str, rules: &[Rule]) -> Recommendation {
    let text_lower = text.trim().to_lowercase();
    if text_lower.is_empty() {
        return default_recommendation();
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut audiences: Vec<String> = Vec::new();
    let mut matched_rules: Vec<Rule> = Vec::new();

    for rule in rules {
        if rule.keywords.is_empty() || rule.audiences.is_empty() {
            continue;
        }
        let hit = rule
            .keywords
            .iter()
            .any(|keyword| keyword_matches(&text_lower, keyword));
        if !hit {
            continue;
        }

        matched_rules.push(rule.clone());
        for audience in &rule.audiences {
            let label = audience.trim();
            if !label.is_empty() && seen.insert(label.to_string()) {
                audiences.push(label.to_string());
            }
        }
    }

    if audiences.is_empty() {
        return default_recommendation();
    }

    Recommendation {
        audiences,
        matched_rules,
        default_used: false,
    }
}

fn default_recommendation() -> Recommendation {
    Recommendation {
        audiences: vec![DEFAULT_AUDIENCE.to_string()],
        matched_rules: Vec::new(),
        default_used: true,
    }
}

fn keyword_matches(text_lower: &str, keyword: &str) -> bool {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return false;
    }

    // Word boundaries so "road" cannot match inside "broadcast"; the
    // optional suffix tolerates simple plurals. Keywords are escaped, so
    // punctuation like "4p's" is matched literally.
    let pattern = format!(r"\b{}(?:s|es)?\b", regex::escape(&keyword));
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(text_lower),
        Err(_) => false,
    }
}
