use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chatbot_agents::{ConversationJournal, ConversationOrchestrator, FileJournal, TracingJournal};
use chatbot_observability::{init_tracing, AppMetrics};
use chatbot_text::{UnicodeTokenClassifier, DEFAULT_MAX_MESSAGE_CHARS};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "chatbot")]
#[command(about = "Keyword chatbot CLI")]
struct Cli {
    #[arg(long, env = "CHATBOT_MAX_MESSAGE_CHARS", default_value_t = DEFAULT_MAX_MESSAGE_CHARS)]
    max_message_chars: usize,

    /// Append conversation records to this file as JSON lines.
    #[arg(long, env = "CHATBOT_LOG_FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive session; `exit` or `quit` leaves.
    Chat,
    Analyze {
        message: String,
    },
    Keywords {
        message: String,
    },
    /// One message per line, from a file or stdin.
    Batch {
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing("chatbot_cli");
    let cli = Cli::parse();

    let orchestrator = build_orchestrator(&cli)?;

    match cli.command {
        Command::Chat => run_chat(&orchestrator)?,
        Command::Analyze { message } => {
            let analysis = orchestrator.analyze(&message)?;
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        Command::Keywords { message } => {
            let keywords = orchestrator.extract_keywords(&message)?;
            if keywords.is_empty() {
                anyhow::bail!("No valid keywords found");
            }
            println!("{}", serde_json::to_string_pretty(&keywords)?);
        }
        Command::Batch { file } => {
            let input = match file {
                Some(path) => fs::read_to_string(&path)
                    .with_context(|| format!("failed reading batch file {}", path.display()))?,
                None => {
                    let mut buffer = String::new();
                    io::stdin()
                        .read_to_string(&mut buffer)
                        .context("failed reading batch from stdin")?;
                    buffer
                }
            };
            let messages: Vec<String> = input.lines().map(ToString::to_string).collect();
            let responses = orchestrator.respond_batch(&messages);
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "responses": responses }))?
            );
        }
    }

    Ok(())
}

fn run_chat(orchestrator: &ConversationOrchestrator) -> Result<()> {
    println!("Chatbot ready. type 'exit' to quit.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        match orchestrator.respond(message) {
            Ok(reply) => println!("\n{reply}\n"),
            Err(err) => eprintln!("\nerror: {err}\n"),
        }
    }

    Ok(())
}

fn build_orchestrator(cli: &Cli) -> Result<ConversationOrchestrator> {
    let journal: Arc<dyn ConversationJournal> = match cli.log_file.as_ref() {
        Some(path) => Arc::new(FileJournal::open(path)?),
        None => Arc::new(TracingJournal),
    };

    Ok(ConversationOrchestrator::new(
        Arc::new(UnicodeTokenClassifier::new(cli.max_message_chars)),
        journal,
        AppMetrics::shared(),
    ))
}
