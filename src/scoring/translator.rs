use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;

use super::sentiment::{EntitySentiment, SentimentLabel};

pub const MAGNITUDE_RANGE: RangeInclusive<i32> = 6..=10;

pub trait MagnitudeSource {
    fn draw(&mut self, range: RangeInclusive<i32>) -> i32;
}

pub struct RngMagnitude<R> {
    rng: R,
}

impl<R: Rng> RngMagnitude<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngMagnitude<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> MagnitudeSource for RngMagnitude<R> {
    fn draw(&mut self, range: RangeInclusive<i32>) -> i32 {
        self.rng.random_range(range)
    }
}

pub fn label_contribution(label: SentimentLabel, magnitude: i32) -> i32 {
    let half = (magnitude + 1) / 2;
    match label {
        SentimentLabel::StrongPositive => magnitude,
        SentimentLabel::Positive => half,
        SentimentLabel::Negative => -half,
        SentimentLabel::StrongNegative => -magnitude,
        SentimentLabel::NotMentioned => 0,
    }
}

pub struct SentimentTranslator<M> {
    magnitudes: M,
}

impl<M: MagnitudeSource> SentimentTranslator<M> {
    pub fn new(magnitudes: M) -> Self {
        Self { magnitudes }
    }

    pub fn translate(&mut self, entities: &[EntitySentiment]) -> i32 {
        entities
            .iter()
            .map(|e| {
                let magnitude = self.magnitudes.draw(MAGNITUDE_RANGE);
                label_contribution(e.sentiment, magnitude)
            })
            .sum()
    }
}
