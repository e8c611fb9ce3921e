use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use crate::scoring::FactorRecord;

static SETTINGS: OnceLock<Settings> = OnceLock::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub score: Score,
    pub table: Table,
    pub sentiment: Sentiment,
    pub classifier: Classifier,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Score {
    pub initial: i32,
    pub update_latency_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub factors: Vec<FactorRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentiment {
    pub success_factors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classifier {
    pub api_base: String,
    pub model: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Score {
    pub fn update_latency(&self) -> Duration {
        Duration::from_millis(self.update_latency_ms)
    }
}

fn factor(category: &str, name: &str, weight: f64, value: f64, unit: &str) -> FactorRecord {
    FactorRecord {
        category: category.into(),
        name: name.into(),
        weight,
        current_value: value,
        unit: unit.into(),
    }
}

fn reference_factors() -> Vec<FactorRecord> {
    const PLANNING: &str = "Project Planning and Management";
    const STAKEHOLDERS: &str = "Stakeholder Engagement and Communication";
    const SCOPE: &str = "Project Objectives and Scope Management";
    const RESOURCES: &str = "Resource and Expertise Management";
    const EXTERNAL: &str = "External Factors and Risk Management";
    const QUALITY: &str = "Quality Assurance and Control";
    const BUDGET: &str = "Budget Management";
    const TIME: &str = "Time Management";
    const TEAM: &str = "Team Performance and Dynamics";

    vec![
        factor(PLANNING, "Percentage of Requirements Completed", 15.0, 55.0, "%"),
        factor(PLANNING, "Number of Change Requests Received", 10.0, 8.0, "Requests"),
        factor(PLANNING, "Milestones Achieved on Time", 10.0, 75.0, "%"),
        factor(PLANNING, "Average Task Completion Time", 15.0, 4.0, "Days"),
        factor(PLANNING, "Number of Identified Risks", 10.0, 12.0, "Count"),
        factor(PLANNING, "Number of Team Meetings Held", 5.0, 10.0, "Count"),
        factor(STAKEHOLDERS, "Number of Stakeholder Meetings Held", 10.0, 6.0, "Count"),
        factor(STAKEHOLDERS, "Stakeholder Feedback Score", 5.0, 82.0, "%"),
        factor(SCOPE, "Percentage of Objectives Met", 10.0, 90.0, "%"),
        factor(SCOPE, "Number of Scope Changes Approved", 5.0, 2.0, "Requests"),
        factor(RESOURCES, "Percentage of Resources Utilized", 5.0, 70.0, "%"),
        factor(RESOURCES, "Number of Training Sessions Conducted", 5.0, 3.0, "Count"),
        factor(EXTERNAL, "Number of Market Research Reports Completed", 5.0, 1.0, "Count"),
        factor(EXTERNAL, "Contingency Budget Utilization Rate", 5.0, 20.0, "%"),
        factor(QUALITY, "Number of Quality Reviews Conducted", 5.0, 4.0, "Count"),
        factor(QUALITY, "Percentage of Defect Resolution", 5.0, 85.0, "%"),
        factor(BUDGET, "Percentage of Budget Spent", 5.0, 60.0, "%"),
        factor(BUDGET, "Number of Budget Variance Reports", 5.0, 3.0, "Count"),
        factor(TIME, "Percentage of Tasks Completed on Schedule", 5.0, 78.0, "%"),
        factor(TIME, "Average Delay per Task", 5.0, 2.0, "Days"),
        factor(TEAM, "Team Satisfaction Score", 5.0, 75.0, "%"),
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            score: Score {
                initial: 50,
                update_latency_ms: 3000,
            },
            table: Table {
                factors: reference_factors(),
            },
            sentiment: Sentiment {
                success_factors: vec![
                    "Project Planning".into(),
                    "Stakeholder Engagement".into(),
                    "Scope Management".into(),
                    "Resource Management".into(),
                    "Risk Management".into(),
                    "Quality Assurance".into(),
                    "Budget Management".into(),
                    "Time Management".into(),
                    "Team Performance".into(),
                ],
            },
            classifier: Classifier {
                api_base: "https://api.openai.com/v1".into(),
                model: "gpt-3.5-turbo".into(),
                api_key_env: "OPENAI_API_KEY".into(),
                timeout_secs: 30,
            },
            seed: None,
        }
    }
}

impl Settings {
    pub fn load() -> &'static Settings {
        SETTINGS.get_or_init(Self::load_from_files)
    }

    fn load_from_files() -> Settings {
        let default_path = Path::new("settings.default.ron");
        let override_path = Path::new("settings.ron");

        let mut settings = if default_path.exists() {
            fs::read_to_string(default_path)
                .ok()
                .and_then(|content| ron::from_str(&content).ok())
                .unwrap_or_default()
        } else {
            Settings::default()
        };

        if override_path.exists() {
            if let Ok(content) = fs::read_to_string(override_path) {
                match ron::from_str::<Settings>(&content) {
                    Ok(overrides) => settings = overrides,
                    Err(e) => tracing::warn!("ignoring settings.ron: {e}"),
                }
            }
        }

        settings
    }
}

pub fn settings() -> &'static Settings {
    Settings::load()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_table_shape() {
        let s = Settings::default();
        assert_eq!(s.table.factors.len(), 21);

        let total_weight: f64 = s.table.factors.iter().map(|f| f.weight).sum();
        assert!((total_weight - 155.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_default_latency() {
        let s = Settings::default();
        assert_eq!(s.score.update_latency(), Duration::from_secs(3));
        assert_eq!(s.score.initial, 50);
    }

    #[test]
    fn test_ron_override_parses() {
        let mut custom = Settings::default();
        custom.score.update_latency_ms = 250;
        custom.seed = Some(42);
        custom.sentiment.success_factors = vec!["Risk Management".into()];

        let text = ron::ser::to_string_pretty(&custom, Default::default()).unwrap();
        let parsed: Settings = ron::from_str(&text).unwrap();

        assert_eq!(parsed.score.update_latency_ms, 250);
        assert_eq!(parsed.seed, Some(42));
        assert_eq!(parsed.sentiment.success_factors, vec!["Risk Management"]);
        assert_eq!(parsed.table.factors.len(), 21);
    }
}
