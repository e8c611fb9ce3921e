use project_score::classifier::{OpenAiClassifier, SentimentClassifier};
use project_score::scoring::{RngMagnitude, SentimentTranslator};
use project_score::settings::settings;
use project_score::utils::{format_delta, log_error, preview, print_entities, print_sentence};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

fn print_usage() {
    eprintln!("Usage: score-text [--sentence] <text>");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <text>       Free text to analyze for success-factor sentiment");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --sentence   Only label the text as positive or negative");
}

#[derive(Debug, PartialEq)]
struct Args {
    sentence: bool,
    text: String,
}

fn parse_args(args: &[String]) -> Option<Args> {
    if args.iter().any(|a| a == "--help" || a == "-h") {
        return None;
    }
    let sentence = args.iter().any(|a| a == "--sentence");
    let text = args
        .iter()
        .filter(|a| *a != "--sentence")
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");
    if text.trim().is_empty() {
        return None;
    }
    Some(Args { sentence, text })
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("project_score=warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(Args { sentence, text }) = parse_args(&args) else {
        print_usage();
        process::exit(1);
    };

    let s = settings();
    let classifier = match OpenAiClassifier::from_settings(s) {
        Ok(classifier) => classifier,
        Err(e) => {
            log_error("ERROR", &format!("Failed to build classifier: {e}"));
            process::exit(1);
        }
    };

    println!("\"{}\"", preview(&text));

    if sentence {
        match classifier.classify_sentence(&text).await {
            Ok(label) => print_sentence(label),
            Err(e) => {
                log_error("CLASSIFIER", &e.to_string());
                process::exit(1);
            }
        }
        return;
    }

    let entities = match classifier
        .classify(&text, &s.sentiment.success_factors)
        .await
    {
        Ok(entities) => entities,
        Err(e) => {
            log_error("CLASSIFIER", &e.to_string());
            process::exit(1);
        }
    };

    print_entities(&entities);

    let magnitudes = match s.seed {
        Some(seed) => RngMagnitude::seeded(seed),
        None => RngMagnitude::from_os_rng(),
    };
    let delta = SentimentTranslator::new(magnitudes).translate(&entities);
    println!("\nscore delta: {}", format_delta(delta));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_joins_text() {
        assert_eq!(
            parse_args(&args(&["Budget", "is", "fine"])),
            Some(Args {
                sentence: false,
                text: "Budget is fine".into()
            })
        );
    }

    #[test]
    fn test_parse_args_sentence_flag() {
        assert_eq!(
            parse_args(&args(&["--sentence", "The launch slipped."])),
            Some(Args {
                sentence: true,
                text: "The launch slipped.".into()
            })
        );
    }

    #[test]
    fn test_parse_args_requires_text() {
        assert_eq!(parse_args(&args(&[])), None);
        assert_eq!(parse_args(&args(&["--sentence"])), None);
        assert_eq!(parse_args(&args(&["-h", "text"])), None);
    }
}
