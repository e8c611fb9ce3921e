use anyhow::Result;
use project_score::classifier::OpenAiClassifier;
use project_score::scoring::PendingUpdate;
use project_score::session::ScoreSession;
use project_score::settings::settings;
use project_score::utils::{
    log_error, log_init, log_thinking, print_entities, print_history, print_score, print_table,
    print_tally,
};
use project_score::ScoreError;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::subscriber::set_global_default;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

const HELP: &str = "\
commands:
  score                 show the project score
  table                 show the factor table
  set <row> <value>     edit a factor's current value
  randomize             reload every factor with random values
  analyze <text>        analyze free text for success-factor sentiment
  history               list past analyses
  tally                 per-factor sentiment counts
  delete <id>           delete a past analysis
  help                  show this message
  quit                  exit";

#[derive(Debug, PartialEq)]
enum Command {
    Score,
    Table,
    Set { row: usize, value: String },
    Randomize,
    Analyze(String),
    History,
    Tally,
    Delete(Uuid),
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (name, rest) = line
            .split_once(char::is_whitespace)
            .map(|(n, r)| (n, r.trim()))
            .unwrap_or((line, ""));

        let command = match name.to_lowercase().as_str() {
            "score" => Command::Score,
            "table" => Command::Table,
            "set" => {
                let (row, value) = rest
                    .split_once(char::is_whitespace)
                    .map(|(r, v)| (r, v.trim()))
                    .unwrap_or((rest, ""));
                let row = row
                    .parse()
                    .map_err(|_| format!("invalid row {row:?}, try `set 3 42`"))?;
                Command::Set {
                    row,
                    value: value.to_string(),
                }
            }
            "randomize" | "reload" => Command::Randomize,
            "analyze" => Command::Analyze(rest.to_string()),
            "history" => Command::History,
            "tally" => Command::Tally,
            "delete" => {
                let id = Uuid::parse_str(rest).map_err(|_| format!("invalid id {rest:?}"))?;
                Command::Delete(id)
            }
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("unknown command {other:?}, type `help`")),
        };
        Ok(Some(command))
    }
}

fn track(update: Option<PendingUpdate>) {
    let Some(update) = update else {
        return;
    };
    log_thinking();
    tokio::spawn(async move {
        if let Err(e) = update.settled().await {
            log_error("SCORE", &e.to_string());
        }
    });
}

fn report(context: &str, error: ScoreError) {
    match error {
        ScoreError::UpdatePending => log_thinking(),
        other => log_error(context, &other.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("project_score=info".parse()?))
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        );
    set_global_default(subscriber)?;

    let s = settings();
    let classifier = OpenAiClassifier::from_settings(s)?;
    log_init(s, classifier.has_credential());

    let mut session = ScoreSession::new(s, Arc::new(classifier));
    print_table(session.aggregator());
    match session.sync_table() {
        Ok(update) => track(update),
        Err(e) => report("TABLE", e),
    }
    println!("{HELP}\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                log_error("INPUT", &message);
                continue;
            }
        };

        match command {
            Command::Score => print_score(&session.snapshot()),
            Command::Table => print_table(session.aggregator()),
            Command::Set { row, value } => match session.edit_factor(row, &value) {
                Ok(update) => track(update),
                Err(e) => report("TABLE", e),
            },
            Command::Randomize => match session.randomize_factors() {
                Ok(update) => {
                    print_table(session.aggregator());
                    track(update);
                }
                Err(e) => report("TABLE", e),
            },
            Command::Analyze(text) => match session.analyze_text(&text).await {
                Ok(analysis) => {
                    print_entities(&analysis.record.entities);
                    track(Some(analysis.update));
                }
                Err(e) => report("SENTIMENT", e),
            },
            Command::History => print_history(session.analyses().records()),
            Command::Tally => print_tally(session.analyses().tallies()),
            Command::Delete(id) => {
                if !session.delete_analysis(id) {
                    log_error("SENTIMENT", &format!("no analysis {id}"));
                }
            }
            Command::Help => println!("{HELP}\n"),
            Command::Quit => break,
        }
    }

    Ok(())
}
