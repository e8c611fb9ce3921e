use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::scoring::EntitySentiment;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub text: String,
    pub entities: Vec<EntitySentiment>,
    pub delta: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FactorTally {
    pub factor: String,
    pub positive: u32,
    pub negative: u32,
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisLog {
    records: Vec<AnalysisRecord>,
    tallies: Vec<FactorTally>,
}

impl AnalysisLog {
    pub fn new(success_factors: &[String]) -> Self {
        Self {
            records: Vec::new(),
            tallies: success_factors
                .iter()
                .map(|f| FactorTally {
                    factor: f.clone(),
                    ..Default::default()
                })
                .collect(),
        }
    }

    pub fn records(&self) -> &[AnalysisRecord] {
        &self.records
    }

    pub fn tallies(&self) -> &[FactorTally] {
        &self.tallies
    }

    pub fn tally(&self, factor: &str) -> Option<&FactorTally> {
        self.tallies.iter().find(|t| t.factor == factor)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(
        &mut self,
        text: impl Into<String>,
        entities: Vec<EntitySentiment>,
        delta: i32,
    ) -> &AnalysisRecord {
        let record = AnalysisRecord {
            id: Uuid::new_v4(),
            text: text.into(),
            entities,
            delta,
            created_at: Utc::now(),
        };
        self.apply_tally(&record.entities, true);
        self.records.insert(0, record);
        &self.records[0]
    }

    pub fn delete(&mut self, id: Uuid) -> Option<AnalysisRecord> {
        let index = self.records.iter().position(|r| r.id == id)?;
        let removed = self.records.remove(index);
        self.apply_tally(&removed.entities, false);
        Some(removed)
    }

    fn apply_tally(&mut self, entities: &[EntitySentiment], adding: bool) {
        for entity in entities {
            let Some(tally) = self.tallies.iter_mut().find(|t| t.factor == entity.entity) else {
                continue;
            };
            let counter = if entity.sentiment.is_positive() {
                &mut tally.positive
            } else if entity.sentiment.is_negative() {
                &mut tally.negative
            } else {
                continue;
            };
            *counter = if adding {
                counter.saturating_add(1)
            } else {
                counter.saturating_sub(1)
            };
        }
    }
}
