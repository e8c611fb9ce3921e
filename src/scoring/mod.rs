pub mod aggregator;
pub mod coordinator;
mod sentiment;
pub mod translator;

pub use aggregator::{parse_factor_value, FactorAggregator, FactorRecord};
pub use coordinator::{
    clamp_score, AppliedUpdate, PendingUpdate, ScoreBand, ScoreCoordinator, ScoreSnapshot,
    UpdateSource, SCORE_MAX, SCORE_MIN,
};
pub use sentiment::{EntitySentiment, SentimentLabel};
pub use translator::{MagnitudeSource, RngMagnitude, SentimentTranslator};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_table_emission_clamps_at_coordinator() {
        let settings = Settings::default();
        let mut aggregator = FactorAggregator::new(settings.table.factors.clone());
        let coordinator = ScoreCoordinator::from_settings(&settings);

        let delta = aggregator.recompute().unwrap();
        assert_eq!(delta, 53);

        let applied = coordinator
            .request_update(delta, UpdateSource::Table)
            .unwrap()
            .settled()
            .await
            .unwrap();
        assert_eq!(applied.previous, 50);
        assert_eq!(applied.score, 100);
        assert_eq!(coordinator.snapshot().last_source, UpdateSource::Table);
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_producers_feed_one_score() {
        let mut aggregator = FactorAggregator::new(Settings::default().table.factors);
        aggregator.recompute();
        let coordinator = ScoreCoordinator::new(50, Duration::from_secs(3));
        let mut translator = SentimentTranslator::new(RngMagnitude::seeded(11));

        let table_delta = aggregator.set_value(8, "10").unwrap().unwrap();
        coordinator
            .request_update(table_delta, UpdateSource::Table)
            .unwrap()
            .settled()
            .await
            .unwrap();
        assert_eq!(coordinator.snapshot().score, 42);

        let sentiment_delta = translator.translate(&[EntitySentiment::new(
            "Budget Management",
            SentimentLabel::StrongPositive,
        )]);
        coordinator
            .request_update(sentiment_delta, UpdateSource::Sentiment)
            .unwrap()
            .settled()
            .await
            .unwrap();

        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.score, 42 + sentiment_delta);
        assert_eq!(snapshot.last_source, UpdateSource::Sentiment);
    }
}
