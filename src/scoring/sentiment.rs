use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr, Serialize, Deserialize,
)]
pub enum SentimentLabel {
    #[strum(to_string = "strong positive")]
    #[serde(rename = "strong positive")]
    StrongPositive,
    #[strum(to_string = "positive")]
    #[serde(rename = "positive")]
    Positive,
    #[strum(to_string = "negative")]
    #[serde(rename = "negative")]
    Negative,
    #[strum(to_string = "strong negative")]
    #[serde(rename = "strong negative")]
    StrongNegative,
    #[strum(to_string = "not mentioned")]
    #[serde(rename = "not mentioned")]
    NotMentioned,
}

impl SentimentLabel {
    pub fn is_positive(&self) -> bool {
        matches!(self, Self::StrongPositive | Self::Positive)
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, Self::StrongNegative | Self::Negative)
    }

    pub fn is_mentioned(&self) -> bool {
        *self != Self::NotMentioned
    }

    pub fn mentioned_labels() -> Vec<&'static str> {
        Self::iter()
            .filter(|l| l.is_mentioned())
            .map(|l| l.into())
            .collect()
    }
}

impl FromStr for SentimentLabel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::iter()
            .find(|l| l.to_string().eq_ignore_ascii_case(wanted))
            .ok_or(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySentiment {
    pub entity: String,
    pub sentiment: SentimentLabel,
}

impl EntitySentiment {
    pub fn new(entity: impl Into<String>, sentiment: SentimentLabel) -> Self {
        Self {
            entity: entity.into(),
            sentiment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_wire_names() {
        assert_eq!(
            SentimentLabel::from_str("strong negative"),
            Ok(SentimentLabel::StrongNegative)
        );
        assert_eq!(
            SentimentLabel::from_str(" Positive "),
            Ok(SentimentLabel::Positive)
        );
        assert!(SentimentLabel::from_str("neutral").is_err());
    }

    #[test]
    fn test_mentioned_labels_exclude_not_mentioned() {
        let labels = SentimentLabel::mentioned_labels();
        assert_eq!(labels.len(), 4);
        assert!(!labels.contains(&"not mentioned"));
    }

    #[test]
    fn test_polarity() {
        assert!(SentimentLabel::StrongPositive.is_positive());
        assert!(SentimentLabel::Negative.is_negative());
        assert!(!SentimentLabel::NotMentioned.is_positive());
        assert!(!SentimentLabel::NotMentioned.is_negative());
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let entity = EntitySentiment::new("Budget Management", SentimentLabel::StrongPositive);
        let json = serde_json::to_string(&entity).unwrap();
        assert!(json.contains("\"strong positive\""));
    }
}
