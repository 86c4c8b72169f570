//! Trend Record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{TrendCategory, TrendId};

/// A trending keyword with its observation counter
///
/// An input signal for topic suggestions and trending-bonus eligibility,
/// never a hard gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trend {
    /// Canonical identifier, derived from the keyword
    pub trend_id: TrendId,
    /// The trending keyword
    pub keyword: String,
    /// How often the keyword has been observed
    pub frequency: u64,
    /// Category bucket
    pub category: TrendCategory,
    /// Last observation timestamp
    pub last_updated: DateTime<Utc>,
}

impl Trend {
    /// Create a trend with a single observation
    pub fn new(keyword: impl Into<String>, category: TrendCategory) -> Self {
        let keyword = keyword.into();
        Self {
            trend_id: TrendId::from_keyword(&keyword),
            keyword,
            frequency: 1,
            category,
            last_updated: Utc::now(),
        }
    }

    /// Create a trend with a preset frequency, used when seeding
    pub fn with_frequency(keyword: impl Into<String>, category: TrendCategory, frequency: u64) -> Self {
        let mut trend = Self::new(keyword, category);
        trend.frequency = frequency;
        trend
    }

    /// Record one more observation
    pub fn bump(&mut self) {
        self.frequency += 1;
        self.last_updated = Utc::now();
    }
}
