use console::{measure_text_width, Style};

use crate::analysis::{AnalysisRecord, FactorTally};
use crate::scoring::{
    AppliedUpdate, EntitySentiment, FactorAggregator, ScoreBand, ScoreSnapshot, SentimentLabel,
    UpdateSource,
};
use crate::settings::Settings;

pub const TREE_BRANCH: char = '\u{251C}';
pub const TREE_END: char = '\u{2514}';
pub const TREE_HORIZ: char = '\u{2500}';
pub const TREE_VERT: char = '\u{2502}';

const TREE_PREFIX_WIDTH: usize = 4;
const VALUE_COLUMN: usize = 25;

fn tree_branch() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_BRANCH, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_end() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_END, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_indent() -> String {
    dim().apply_to(format!("{}   ", TREE_VERT)).to_string()
}

fn tree_prefix(index: usize, count: usize) -> String {
    if index + 1 == count {
        tree_end()
    } else {
        tree_branch()
    }
}

pub fn dim() -> Style {
    Style::new().dim()
}

fn blue() -> Style {
    Style::new().blue()
}

fn magenta() -> Style {
    Style::new().magenta()
}

fn cyan() -> Style {
    Style::new().cyan()
}

fn green() -> Style {
    Style::new().green()
}

fn red() -> Style {
    Style::new().red()
}

fn yellow() -> Style {
    Style::new().yellow()
}

fn bold() -> Style {
    Style::new().bold()
}

fn init_prefix() -> String {
    blue().apply_to("[INIT]").to_string()
}

fn score_prefix() -> String {
    cyan().apply_to("[SCORE]").to_string()
}

fn table_prefix() -> String {
    magenta().apply_to("[TABLE]").to_string()
}

fn sentiment_prefix() -> String {
    yellow().apply_to("[SENTIMENT]").to_string()
}

pub fn pad_label(label: &str, depth: usize) -> String {
    let prefix_width = depth * TREE_PREFIX_WIDTH;
    let target_width = VALUE_COLUMN.saturating_sub(prefix_width);
    let current_width = measure_text_width(label);
    if current_width < target_width {
        format!("{}{}", label, " ".repeat(target_width - current_width))
    } else {
        format!("{} ", label)
    }
}

pub fn format_delta(delta: i32) -> String {
    let style = match delta.signum() {
        1 => green(),
        -1 => red(),
        _ => dim(),
    };
    style.apply_to(format!("{:+}", delta)).to_string()
}

fn band_style(band: ScoreBand) -> Style {
    match band {
        ScoreBand::Low => red(),
        ScoreBand::Medium => yellow(),
        ScoreBand::High => green(),
    }
}

fn label_style(label: SentimentLabel) -> Style {
    match label {
        SentimentLabel::StrongPositive => green().bold(),
        SentimentLabel::Positive => green(),
        SentimentLabel::Negative => yellow(),
        SentimentLabel::StrongNegative => red().bold(),
        SentimentLabel::NotMentioned => dim(),
    }
}

pub fn preview(text: &str) -> String {
    let preview = if text.chars().count() > 60 {
        format!("{}...", text.chars().take(57).collect::<String>())
    } else {
        text.to_string()
    };
    preview.replace('\n', " ")
}

pub fn log_init(settings: &Settings, classifier_ready: bool) {
    println!(
        "{} starting project-score with {} factors and {} success factors...",
        init_prefix(),
        bold().apply_to(settings.table.factors.len()),
        bold().apply_to(settings.sentiment.success_factors.len()),
    );
    println!(
        "{} classifier {} via {}",
        init_prefix(),
        cyan().apply_to(&settings.classifier.model),
        if classifier_ready {
            green().apply_to("ready")
        } else {
            yellow().apply_to("missing credentials")
        }
    );
    if let Some(seed) = settings.seed {
        println!("{} fixed seed {}", init_prefix(), dim().apply_to(seed));
    }
}

pub fn log_update_requested(delta: i32, source: UpdateSource, current: i32) {
    println!(
        "{} {} from {} (current {})",
        score_prefix(),
        format_delta(delta),
        bold().apply_to(source),
        dim().apply_to(current),
    );
}

pub fn log_update_rejected(delta: i32, source: UpdateSource) {
    println!(
        "{} {} {} from {}: update already in flight",
        score_prefix(),
        red().apply_to("rejected"),
        format_delta(delta),
        bold().apply_to(source),
    );
}

pub fn log_update_applied(update: &AppliedUpdate) {
    let band = ScoreBand::from_score(update.score);
    println!(
        "{} {} {} {} ({} from {})",
        score_prefix(),
        dim().apply_to(update.previous),
        dim().apply_to("->"),
        band_style(band).bold().apply_to(update.score),
        format_delta(update.delta),
        update.source,
    );
}

pub fn log_table_delta(before: i32, after: i32) {
    println!(
        "{} aggregate {} {} {}",
        table_prefix(),
        dim().apply_to(before),
        dim().apply_to("->"),
        bold().apply_to(after),
    );
}

pub fn log_analysis_recorded(record: &AnalysisRecord) {
    println!(
        "{} \"{}\" {} factors, {}",
        sentiment_prefix(),
        dim().apply_to(preview(&record.text)),
        bold().apply_to(record.entities.len()),
        format_delta(record.delta),
    );
}

pub fn log_analysis_deleted(record: &AnalysisRecord) {
    println!(
        "{} {} {}",
        sentiment_prefix(),
        dim().apply_to("deleted"),
        dim().apply_to(record.id),
    );
}

pub fn log_thinking() {
    println!("{} {}", score_prefix(), yellow().apply_to("AI is thinking..."));
}

pub fn log_error(context: &str, error: &str) {
    println!("{} {}", red().apply_to(format!("[{context}]")), error);
}

pub fn print_score(snapshot: &ScoreSnapshot) {
    let band = snapshot.band();
    let mut lines = vec![format!("{}", bold().apply_to("PROJECT SCORE"))];
    lines.push(format!(
        "{}{} {} {}",
        tree_branch(),
        pad_label("score", 1),
        band_style(band).bold().apply_to(snapshot.score),
        dim().apply_to(format!("({band})")),
    ));
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("last source", 1),
        snapshot.last_source,
    ));
    lines.push(format!(
        "{}{} {}",
        tree_end(),
        pad_label("status", 1),
        if snapshot.pending {
            yellow().apply_to("thinking")
        } else {
            green().apply_to("idle")
        }
    ));
    println!("{}\n", lines.join("\n"));
}

pub fn print_table(aggregator: &FactorAggregator) {
    let factors = aggregator.factors();
    let mut lines = vec![format!("{}", bold().apply_to("FACTORS"))];

    let mut category: Option<&str> = None;
    for (i, factor) in factors.iter().enumerate() {
        if category != Some(factor.category.as_str()) {
            category = Some(factor.category.as_str());
            lines.push(format!("{}{}", tree_branch(), dim().apply_to(&factor.category)));
        }
        let last_in_category = factors
            .get(i + 1)
            .map(|next| next.category != factor.category)
            .unwrap_or(true);
        let branch = if last_in_category {
            tree_end()
        } else {
            tree_branch()
        };
        lines.push(format!(
            "{}{}{} {} {} {}",
            tree_indent(),
            branch,
            cyan().apply_to(format!("{i:>2}")),
            factor.name,
            bold().apply_to(format!("{} {}", factor.current_value, factor.unit)),
            dim().apply_to(format!("(weight {}%)", factor.weight)),
        ));
    }

    lines.push(format!(
        "{}{} {:.2}",
        tree_branch(),
        pad_label("weighted sum", 1),
        aggregator.weighted_sum()
    ));
    lines.push(format!(
        "{}{} {}%",
        tree_branch(),
        pad_label("total weight", 1),
        aggregator.total_weight()
    ));
    lines.push(format!(
        "{}{} {}",
        tree_end(),
        pad_label("aggregate", 1),
        bold().apply_to(aggregator.aggregate_score())
    ));
    println!("{}\n", lines.join("\n"));
}

pub fn print_entities(entities: &[EntitySentiment]) {
    if entities.is_empty() {
        println!("{}{}", tree_end(), dim().apply_to("no success factors detected"));
        return;
    }
    let count = entities.len();
    for (i, entity) in entities.iter().enumerate() {
        println!(
            "{}{} {}",
            tree_prefix(i, count),
            pad_label(&entity.entity, 1),
            label_style(entity.sentiment).apply_to(entity.sentiment),
        );
    }
}

pub fn print_sentence(label: SentimentLabel) {
    println!(
        "{}{} {}",
        tree_end(),
        pad_label("sentiment", 1),
        label_style(label).apply_to(label),
    );
}

pub fn print_history(records: &[AnalysisRecord]) {
    println!("{}", bold().apply_to("ANALYSES"));
    if records.is_empty() {
        println!("{}{}\n", tree_end(), dim().apply_to("none"));
        return;
    }
    let count = records.len();
    for (i, record) in records.iter().enumerate() {
        println!(
            "{}{} \"{}\" {} {}",
            tree_prefix(i, count),
            dim().apply_to(record.created_at.format("%H:%M:%S")),
            preview(&record.text),
            format_delta(record.delta),
            dim().apply_to(record.id),
        );
        for (j, entity) in record.entities.iter().enumerate() {
            let indent = if i + 1 == count {
                "    ".to_string()
            } else {
                tree_indent()
            };
            println!(
                "{}{}{} {}",
                indent,
                tree_prefix(j, record.entities.len()),
                pad_label(&entity.entity, 2),
                label_style(entity.sentiment).apply_to(entity.sentiment),
            );
        }
    }
    println!();
}

pub fn print_tally(tallies: &[FactorTally]) {
    println!("{}", bold().apply_to("SENTIMENT TALLY"));
    let count = tallies.len();
    for (i, tally) in tallies.iter().enumerate() {
        println!(
            "{}{} {} {}",
            tree_prefix(i, count),
            pad_label(&tally.factor, 1),
            green().apply_to(format!("+{}", tally.positive)),
            red().apply_to(format!("-{}", tally.negative)),
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_label_aligns_values() {
        let padded = pad_label("score", 1);
        assert_eq!(measure_text_width(&padded), VALUE_COLUMN - TREE_PREFIX_WIDTH);

        let long = "a label that is much longer than the column";
        assert_eq!(pad_label(long, 1), format!("{long} "));
    }

    #[test]
    fn test_preview_truncates() {
        let text = "x".repeat(80);
        let p = preview(&text);
        assert_eq!(p.chars().count(), 60);
        assert!(p.ends_with("..."));
        assert_eq!(preview("line one\nline two"), "line one line two");
    }

    #[test]
    fn test_format_delta_sign() {
        console::set_colors_enabled(false);
        assert_eq!(format_delta(5), "+5");
        assert_eq!(format_delta(-3), "-3");
        assert_eq!(format_delta(0), "+0");
    }
}
