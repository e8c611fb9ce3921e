use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::analysis::{AnalysisLog, AnalysisRecord};
use crate::classifier::SentimentClassifier;
use crate::error::{Result, ScoreError};
use crate::scoring::{
    FactorAggregator, FactorRecord, MagnitudeSource, PendingUpdate, RngMagnitude,
    ScoreCoordinator, ScoreSnapshot, SentimentTranslator, UpdateSource,
};
use crate::settings::Settings;
use crate::utils::logs::{log_analysis_deleted, log_analysis_recorded, log_table_delta};

pub struct ScoreSession<M = RngMagnitude<StdRng>> {
    aggregator: FactorAggregator,
    translator: SentimentTranslator<M>,
    coordinator: ScoreCoordinator,
    analyses: AnalysisLog,
    classifier: Arc<dyn SentimentClassifier>,
    success_factors: Vec<String>,
    rng: StdRng,
}

pub struct Analysis {
    pub record: AnalysisRecord,
    pub update: PendingUpdate,
}

impl ScoreSession {
    pub fn new(settings: &Settings, classifier: Arc<dyn SentimentClassifier>) -> Self {
        let (magnitudes, rng) = match settings.seed {
            Some(seed) => (
                RngMagnitude::seeded(seed),
                StdRng::seed_from_u64(seed.wrapping_add(1)),
            ),
            None => (RngMagnitude::from_os_rng(), StdRng::from_os_rng()),
        };
        Self::with_parts(
            settings,
            classifier,
            magnitudes,
            rng,
            settings.score.update_latency(),
        )
    }
}

impl<M: MagnitudeSource> ScoreSession<M> {
    pub fn with_parts(
        settings: &Settings,
        classifier: Arc<dyn SentimentClassifier>,
        magnitudes: M,
        rng: StdRng,
        latency: Duration,
    ) -> Self {
        Self {
            aggregator: FactorAggregator::new(settings.table.factors.clone()),
            translator: SentimentTranslator::new(magnitudes),
            coordinator: ScoreCoordinator::new(settings.score.initial, latency),
            analyses: AnalysisLog::new(&settings.sentiment.success_factors),
            classifier,
            success_factors: settings.sentiment.success_factors.clone(),
            rng,
        }
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        self.coordinator.snapshot()
    }

    pub fn coordinator(&self) -> &ScoreCoordinator {
        &self.coordinator
    }

    pub fn aggregator(&self) -> &FactorAggregator {
        &self.aggregator
    }

    pub fn factors(&self) -> &[FactorRecord] {
        self.aggregator.factors()
    }

    pub fn analyses(&self) -> &AnalysisLog {
        &self.analyses
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.coordinator.is_pending() {
            return Err(ScoreError::UpdatePending);
        }
        Ok(())
    }

    pub fn sync_table(&mut self) -> Result<Option<PendingUpdate>> {
        self.ensure_idle()?;
        let before = self.aggregator.last_emitted();
        let delta = self.aggregator.recompute();
        self.submit_table_delta(before, delta)
    }

    pub fn edit_factor(&mut self, index: usize, raw: &str) -> Result<Option<PendingUpdate>> {
        self.ensure_idle()?;
        let before = self.aggregator.last_emitted();
        let delta = self.aggregator.set_value(index, raw)?;
        self.submit_table_delta(before, delta)
    }

    pub fn randomize_factors(&mut self) -> Result<Option<PendingUpdate>> {
        self.ensure_idle()?;
        let before = self.aggregator.last_emitted();
        let delta = self.aggregator.randomize_all(&mut self.rng);
        self.submit_table_delta(before, delta)
    }

    fn submit_table_delta(
        &mut self,
        before: i32,
        delta: Option<i32>,
    ) -> Result<Option<PendingUpdate>> {
        let Some(delta) = delta else {
            return Ok(None);
        };
        match self.coordinator.request_update(delta, UpdateSource::Table) {
            Ok(update) => {
                log_table_delta(before, self.aggregator.last_emitted());
                Ok(Some(update))
            }
            Err(e) => {
                // the delta was never applied, so the next emission must carry it
                self.aggregator.restore_baseline(before);
                Err(e)
            }
        }
    }

    pub async fn analyze_text(&mut self, text: &str) -> Result<Analysis> {
        self.ensure_idle()?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ScoreError::EmptyText);
        }

        let entities = self
            .classifier
            .classify(text, &self.success_factors)
            .await?;

        let delta = self.translator.translate(&entities);
        let update = self
            .coordinator
            .request_update(delta, UpdateSource::Sentiment)?;

        let record = self.analyses.record(text, entities, delta).clone();
        log_analysis_recorded(&record);

        Ok(Analysis { record, update })
    }

    // the score is never rolled back
    pub fn delete_analysis(&mut self, id: Uuid) -> bool {
        match self.analyses.delete(id) {
            Some(removed) => {
                log_analysis_deleted(&removed);
                true
            }
            None => false,
        }
    }
}
