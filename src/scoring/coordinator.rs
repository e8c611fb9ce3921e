use std::sync::Arc;
use std::time::Duration;
use strum::Display;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{Result, ScoreError};
use crate::settings::Settings;
use crate::utils::logs::{log_update_applied, log_update_rejected, log_update_requested};

pub const SCORE_MIN: i32 = 1;
pub const SCORE_MAX: i32 = 100;

pub fn clamp_score(score: i32) -> i32 {
    score.clamp(SCORE_MIN, SCORE_MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum UpdateSource {
    #[strum(serialize = "table")]
    Table,
    #[strum(serialize = "sentiment")]
    Sentiment,
    #[strum(serialize = "none")]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ScoreBand {
    #[strum(serialize = "LOW")]
    Low,
    #[strum(serialize = "MEDIUM")]
    Medium,
    #[strum(serialize = "HIGH")]
    High,
}

impl ScoreBand {
    pub const MEDIUM_THRESHOLD: i32 = 40;
    pub const HIGH_THRESHOLD: i32 = 70;

    pub fn from_score(score: i32) -> Self {
        if score < Self::MEDIUM_THRESHOLD {
            ScoreBand::Low
        } else if score < Self::HIGH_THRESHOLD {
            ScoreBand::Medium
        } else {
            ScoreBand::High
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSnapshot {
    pub score: i32,
    pub last_source: UpdateSource,
    pub pending: bool,
}

impl ScoreSnapshot {
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedUpdate {
    pub previous: i32,
    pub score: i32,
    pub delta: i32,
    pub source: UpdateSource,
}

/// An accepted update. Dropping it does not cancel the update.
#[derive(Debug)]
pub struct PendingUpdate {
    handle: JoinHandle<AppliedUpdate>,
}

impl PendingUpdate {
    pub async fn settled(self) -> Result<AppliedUpdate> {
        Ok(self.handle.await?)
    }
}

#[derive(Debug, Clone)]
pub struct ScoreCoordinator {
    state: Arc<watch::Sender<ScoreSnapshot>>,
    latency: Duration,
}

impl ScoreCoordinator {
    pub fn new(initial_score: i32, latency: Duration) -> Self {
        let (state, _) = watch::channel(ScoreSnapshot {
            score: clamp_score(initial_score),
            last_source: UpdateSource::None,
            pending: false,
        });
        Self {
            state: Arc::new(state),
            latency,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.score.initial, settings.score.update_latency())
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        *self.state.borrow()
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().pending
    }

    pub fn subscribe(&self) -> watch::Receiver<ScoreSnapshot> {
        self.state.subscribe()
    }

    /// Accepts one update at a time; a request made while another is in
    /// flight is refused with [`ScoreError::UpdatePending`].
    pub fn request_update(&self, delta: i32, source: UpdateSource) -> Result<PendingUpdate> {
        let accepted = self.state.send_if_modified(|s| {
            if s.pending {
                false
            } else {
                s.pending = true;
                true
            }
        });

        if !accepted {
            log_update_rejected(delta, source);
            return Err(ScoreError::UpdatePending);
        }

        log_update_requested(delta, source, self.state.borrow().score);

        let state = Arc::clone(&self.state);
        let latency = self.latency;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(latency).await;

            let mut applied = AppliedUpdate {
                previous: 0,
                score: 0,
                delta,
                source,
            };
            state.send_modify(|s| {
                applied.previous = s.score;
                s.score = clamp_score(s.score.saturating_add(delta));
                s.last_source = source;
                s.pending = false;
                applied.score = s.score;
            });

            log_update_applied(&applied);
            applied
        });

        Ok(PendingUpdate { handle })
    }
}
