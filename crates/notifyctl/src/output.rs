//! Output formatting for the CLI.

use audience_rules::Recommendation;
use clap::ValueEnum;
use notify_engine::{ApprovalDispatchResult, DispatchResult};
use serde::Serialize;
use std::fmt;

/// Output format.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print output in the specified format.
pub fn print<T: Serialize + fmt::Display>(value: &T, format: &OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(value) {
                println!("{}", json);
            } else {
                println!("{}", value);
            }
        }
    }
}

/// Announcement dispatch report.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct AnnouncementReport(pub DispatchResult);

impl fmt::Display for AnnouncementReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matched users:  {}", self.0.user_count)?;
        writeln!(f, "Unique tokens:  {}", self.0.token_count)?;
        writeln!(f, "Delivered:      {}", self.0.success_count)?;
        write!(f, "Failed:         {}", self.0.failure_count)?;
        for (kind, count) in &self.0.error_counts {
            write!(f, "\n  {kind}: {count}")?;
        }
        Ok(())
    }
}

/// Account-approval dispatch report.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ApprovalReport(pub ApprovalDispatchResult);

impl fmt::Display for ApprovalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tokens:     {}", self.0.token_count)?;
        writeln!(f, "Delivered:  {}", self.0.success_count)?;
        write!(f, "Failed:     {}", self.0.failure_count)?;
        for (kind, count) in &self.0.error_counts {
            write!(f, "\n  {kind}: {count}")?;
        }
        Ok(())
    }
}

/// Audience recommendation report.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct RecommendationReport(pub Recommendation);

impl fmt::Display for RecommendationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Audiences: {}", self.0.audiences.join(", "))?;
        if self.0.default_used {
            write!(f, " (default; no rule matched)")?;
        }
        for rule in &self.0.matched_rules {
            write!(
                f,
                "\n  matched [{}] -> [{}]",
                rule.keywords.join(", "),
                rule.audiences.join(", ")
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_announcement_report_text() {
        let mut error_counts = BTreeMap::new();
        error_counts.insert("unregistered".to_string(), 5u32);
        let report = AnnouncementReport(DispatchResult {
            user_count: 50,
            token_count: 60,
            success_count: 55,
            failure_count: 5,
            error_counts,
        });

        let text = report.to_string();
        assert!(text.contains("Matched users:  50"));
        assert!(text.contains("unregistered: 5"));
    }

    #[test]
    fn test_announcement_report_json_is_transparent() {
        let report = AnnouncementReport(DispatchResult {
            user_count: 1,
            token_count: 1,
            success_count: 1,
            failure_count: 0,
            error_counts: BTreeMap::new(),
        });

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["user_count"], 1);
        assert_eq!(json["error_counts"], serde_json::json!({}));
    }

    #[test]
    fn test_recommendation_report_text() {
        let report = RecommendationReport(Recommendation {
            audiences: vec!["General Residents".to_string()],
            matched_rules: vec![],
            default_used: true,
        });

        let text = report.to_string();
        assert!(text.contains("General Residents"));
        assert!(text.contains("no rule matched"));
    }
}
