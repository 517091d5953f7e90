//! Character-based token estimation.
//!
//! The estimate is a heuristic: one token per four characters. It is only
//! meant to warn before a payload blows through the reasoning system's
//! context budget.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::fs::FileSystemProvider;

/// Characters per estimated token.
pub const CHARS_PER_TOKEN: u64 = 4;

/// Default context budget in tokens.
pub const DEFAULT_TOKEN_LIMIT: u64 = 100_000;

/// Severity of a payload relative to its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenSeverity {
    /// Below 80% of the limit
    #[default]
    Safe,
    /// 80% up to (but excluding) 100%
    Warning,
    /// At or above the limit
    Critical,
}

impl TokenSeverity {
    /// Classifies a percentage of the budget.
    pub fn classify(percentage: f64) -> Self {
        if percentage >= 100.0 {
            Self::Critical
        } else if percentage >= 80.0 {
            Self::Warning
        } else {
            Self::Safe
        }
    }
}

/// Estimated cost of an intent payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenStats {
    pub estimated: u64,
    pub limit: u64,
    /// `estimated / limit * 100`, rounded to two decimals
    pub percentage: f64,
    pub severity: TokenSeverity,
}

impl Default for TokenStats {
    fn default() -> Self {
        Self::from_chars(0, DEFAULT_TOKEN_LIMIT)
    }
}

impl TokenStats {
    /// Derives the stats for a total character count.
    pub fn from_chars(total_chars: u64, limit: u64) -> Self {
        let estimated = total_chars.div_ceil(CHARS_PER_TOKEN);
        let percentage = if limit == 0 {
            if estimated == 0 { 0.0 } else { 100.0 }
        } else {
            let raw = estimated as f64 / limit as f64 * 100.0;
            (raw * 100.0).round() / 100.0
        };

        Self {
            estimated,
            limit,
            percentage,
            severity: TokenSeverity::classify(percentage),
        }
    }
}

/// Sums content and file lengths into a [`TokenStats`].
#[derive(Debug, Clone, Copy)]
pub struct TokenEstimator {
    limit: u64,
}

impl TokenEstimator {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Estimates the payload cost of `texts` plus every file in `files`.
    ///
    /// A file that cannot be read is logged and contributes zero; it never
    /// aborts the aggregate. Binary files are counted as (lossy) text.
    pub async fn estimate(
        &self,
        provider: &dyn FileSystemProvider,
        texts: &[&str],
        files: &[PathBuf],
    ) -> TokenStats {
        let mut total_chars: u64 = texts.iter().map(|t| t.chars().count() as u64).sum();

        for path in files {
            match provider.read_to_string(path).await {
                Ok(content) => total_chars += content.chars().count() as u64,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable file in token estimate");
                }
            }
        }

        TokenStats::from_chars(total_chars, self.limit)
    }
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_chars_rounds_up() {
        let stats = TokenStats::from_chars(1200, DEFAULT_TOKEN_LIMIT);
        assert_eq!(stats.estimated, 300);
        assert_eq!(stats.percentage, 0.3);
        assert_eq!(stats.severity, TokenSeverity::Safe);

        assert_eq!(TokenStats::from_chars(1, 100).estimated, 1);
        assert_eq!(TokenStats::from_chars(5, 100).estimated, 2);
        assert_eq!(TokenStats::from_chars(0, 100).estimated, 0);
    }

    #[test]
    fn test_percentage_has_two_decimals() {
        // 1 token of 3 => 33.333...%
        let stats = TokenStats::from_chars(4, 3);
        assert_eq!(stats.percentage, 33.33);
    }

    #[test]
    fn test_severity_thresholds() {
        assert_eq!(TokenSeverity::classify(79.99), TokenSeverity::Safe);
        assert_eq!(TokenSeverity::classify(80.0), TokenSeverity::Warning);
        assert_eq!(TokenSeverity::classify(99.99), TokenSeverity::Warning);
        assert_eq!(TokenSeverity::classify(100.0), TokenSeverity::Critical);
        assert_eq!(TokenSeverity::classify(250.0), TokenSeverity::Critical);

        assert_eq!(TokenStats::from_chars(400, 100).severity, TokenSeverity::Critical);
        assert_eq!(TokenStats::from_chars(320, 100).severity, TokenSeverity::Warning);
    }

    #[test]
    fn test_default_is_empty_estimate() {
        let stats = TokenStats::default();
        assert_eq!(stats.estimated, 0);
        assert_eq!(stats.limit, DEFAULT_TOKEN_LIMIT);
        assert_eq!(stats.severity, TokenSeverity::Safe);
    }
}
