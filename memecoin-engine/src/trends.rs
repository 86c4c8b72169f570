//! Trend Tracking
//!
//! Keeps the trend table warm. Seeds the built-in keyword set into an empty
//! store, folds fresh keywords from the social feed in when the stored set
//! runs thin, and upserts keywords reported through the API.

use std::sync::Arc;

use tracing::{debug, info};

use memecoin_bridge::SocialBridge;
use memecoin_core::{trend_seeds, CoreError, CoreResult, Trend, TrendCategory, TrendId};
use memecoin_store::LedgerStore;

use crate::ledger::store_error;

/// Stored trend count below which the social feed is consulted
const BACKFILL_THRESHOLD: usize = 5;

/// How many social keywords to pull when backfilling
const BACKFILL_SAMPLES: usize = 10;

/// Trend listing and recording on top of the store and the social feed
pub struct TrendService {
    store: Arc<dyn LedgerStore>,
    social: Arc<SocialBridge>,
}

impl TrendService {
    pub fn new(store: Arc<dyn LedgerStore>, social: Arc<SocialBridge>) -> Self {
        Self { store, social }
    }

    /// Write the built-in seed set, skipping keywords that already exist.
    ///
    /// Returns how many seeds were written. Safe to run on every startup;
    /// reruns never reset frequencies that engagement has since bumped.
    pub async fn seed(&self) -> CoreResult<usize> {
        let mut written = 0;
        for seed in trend_seeds() {
            let trend_id = TrendId::from_keyword(seed.keyword);
            let exists = self
                .store
                .get_trend(&trend_id)
                .await
                .map_err(store_error)?
                .is_some();
            if exists {
                continue;
            }
            let trend = Trend::with_frequency(seed.keyword, seed.category, seed.frequency);
            self.store.save_trend(&trend).await.map_err(store_error)?;
            written += 1;
        }
        if written > 0 {
            info!(seeded = written, "Trend table seeded");
        }
        Ok(written)
    }

    /// List trends by descending frequency, optionally narrowed to a category.
    ///
    /// When fewer than five stored trends match, keywords from the social
    /// feed are folded in and persisted so later reads serve a full table.
    pub async fn list(
        &self,
        category: Option<TrendCategory>,
        limit: usize,
    ) -> CoreResult<Vec<Trend>> {
        let mut trends = self
            .store
            .list_trends(usize::MAX)
            .await
            .map_err(store_error)?;

        // Backfill keys off the matching count, but deduplicates against
        // every stored keyword so a narrow filter cannot re-add trends.
        let matching = trends
            .iter()
            .filter(|t| category.map_or(true, |c| t.category == c))
            .count();
        if matching < BACKFILL_THRESHOLD {
            let added = self.backfill(&mut trends).await?;
            if added > 0 {
                debug!(added, "Backfilled trends from the social feed");
            }
        }

        let mut trends: Vec<Trend> = trends
            .into_iter()
            .filter(|t| category.map_or(true, |c| t.category == c))
            .collect();
        trends.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        trends.truncate(limit);
        Ok(trends)
    }

    /// Record one observation of a keyword.
    ///
    /// Bumps the counter when the keyword is already tracked, otherwise
    /// creates the trend with the given category and starting frequency.
    pub async fn record(
        &self,
        keyword: &str,
        category: Option<TrendCategory>,
        frequency: Option<u64>,
    ) -> CoreResult<Trend> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(CoreError::validation("Keyword required"));
        }

        let trend_id = TrendId::from_keyword(keyword);
        let trend = match self.store.get_trend(&trend_id).await.map_err(store_error)? {
            Some(mut existing) => {
                existing.bump();
                existing
            }
            None => Trend::with_frequency(
                keyword,
                category.unwrap_or_default(),
                frequency.unwrap_or(1),
            ),
        };
        self.store.save_trend(&trend).await.map_err(store_error)?;
        debug!(keyword = %trend.keyword, frequency = trend.frequency, "Trend recorded");
        Ok(trend)
    }

    /// Fold social keywords into `trends`, skipping keywords already present
    /// under any casing. Persists what it adds.
    async fn backfill(&self, trends: &mut Vec<Trend>) -> CoreResult<usize> {
        let samples = self.social.trending_keywords(BACKFILL_SAMPLES).await;
        let mut added = 0;
        for sample in samples {
            let known = trends
                .iter()
                .any(|t| t.keyword.eq_ignore_ascii_case(&sample.keyword));
            if known {
                continue;
            }
            let trend = Trend::with_frequency(&sample.keyword, sample.category, sample.frequency);
            self.store.save_trend(&trend).await.map_err(store_error)?;
            trends.push(trend);
            added += 1;
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use memecoin_bridge::SocialConfig;
    use memecoin_store::{MemoryStore, StoreConfig};

    fn service() -> TrendService {
        let store: Arc<dyn LedgerStore> = Arc::new(MemoryStore::new(StoreConfig::test()));
        let social = Arc::new(SocialBridge::new(SocialConfig::default()).unwrap());
        TrendService::new(store, social)
    }

    #[tokio::test]
    async fn test_seed_writes_once() {
        let trends = service();

        let first = trends.seed().await.unwrap();
        assert_eq!(first, trend_seeds().len());

        // A rerun finds every keyword present and writes nothing.
        let second = trends.seed().await.unwrap();
        assert_eq!(second, 0);
    }

    #[tokio::test]
    async fn test_seed_preserves_bumped_frequency() {
        let trends = service();
        trends.seed().await.unwrap();

        let bumped = trends.record("DeFi", None, None).await.unwrap();
        assert_eq!(bumped.frequency, 96);

        trends.seed().await.unwrap();
        let listed = trends.list(None, 1).await.unwrap();
        assert_eq!(listed[0].keyword, "DeFi");
        assert_eq!(listed[0].frequency, 96);
    }

    #[tokio::test]
    async fn test_list_sorts_and_filters_by_category() {
        let trends = service();
        trends.seed().await.unwrap();

        let all = trends.list(None, 3).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].keyword, "DeFi");
        assert!(all[0].frequency >= all[1].frequency);
        assert!(all[1].frequency >= all[2].frequency);

        let tech = trends.list(Some(TrendCategory::Tech), 20).await.unwrap();
        assert!(tech.iter().all(|t| t.category == TrendCategory::Tech));
        assert!(tech.iter().any(|t| t.keyword == "AI"));
    }

    #[tokio::test]
    async fn test_empty_store_backfills_from_social_feed() {
        let trends = service();

        // No seed() call; the list itself pulls the social fallback set.
        let listed = trends.list(None, 20).await.unwrap();
        assert!(listed.len() >= BACKFILL_THRESHOLD);
        assert!(listed.iter().any(|t| t.keyword == "DeFi"));

        // Backfilled trends were persisted, not just returned.
        let again = trends.list(None, 20).await.unwrap();
        assert_eq!(again.len(), listed.len());
    }

    #[tokio::test]
    async fn test_record_upserts() {
        let trends = service();

        let created = trends
            .record("Restaking", Some(TrendCategory::Crypto), Some(40))
            .await
            .unwrap();
        assert_eq!(created.frequency, 40);
        assert_eq!(created.category, TrendCategory::Crypto);

        let bumped = trends.record("restaking", None, None).await.unwrap();
        assert_eq!(bumped.frequency, 41);
        assert_eq!(bumped.trend_id, created.trend_id);
    }

    #[tokio::test]
    async fn test_record_rejects_blank_keyword() {
        let trends = service();
        let err = trends.record("   ", None, None).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_record_defaults() {
        let trends = service();
        let trend = trends.record("gm", None, None).await.unwrap();
        assert_eq!(trend.frequency, 1);
        assert_eq!(trend.category, TrendCategory::General);
    }
}
