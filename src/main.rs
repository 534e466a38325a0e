use anyhow::Result;
use clap::Parser;
use memochat::cli::{Cli, Commands};
use memochat::session::transcript;
use memochat::{utils, ConversationSession, Settings};
use tokio::io::{self, AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            utils::print_error(&format!("Configuration error: {}", e));
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Chat { prompt, system } => handle_chat(settings, prompt, system).await,
        Commands::Interactive { system } => handle_interactive(settings, system).await,
    }
}

async fn handle_chat(settings: Settings, prompt: String, system: Option<String>) -> Result<()> {
    let mut session = memochat::session_from_settings(settings)?;
    if let Some(sys) = system {
        session.set_system_prompt(sys);
    }

    utils::print_info("Sending request...");
    let response = session.send_turn(&prompt).await?;
    println!("\n{}", response);
    Ok(())
}

async fn handle_interactive(settings: Settings, system: Option<String>) -> Result<()> {
    utils::print_header("Memochat - Interactive Mode");
    utils::print_info(&format!("Model: {}", settings.model));
    utils::print_info(&format!(
        "Temperature: {} | Max tokens: {}",
        settings.temperature, settings.max_tokens
    ));
    match settings.window_pair_capacity {
        Some(pairs) => utils::print_info(&format!("Sliding window: {} pairs", pairs)),
        None => utils::print_info("Sliding window: disabled (unbounded memory)"),
    }
    match settings.token_ceiling {
        Some(ceiling) => utils::print_info(&format!("Token ceiling: {}", ceiling)),
        None => utils::print_info("Token alerts: disabled"),
    }
    utils::print_info("Type /help for commands\n");

    let mut session = memochat::session_from_settings(settings)?;
    if let Some(sys) = system {
        session.set_system_prompt(sys);
    }
    if let Some(snapshot) = session.debug_snapshot().recorder {
        if let Some(path) = snapshot.log_path {
            utils::print_info(&format!("Debug log: {}", path.display()));
        }
    }

    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin);

    loop {
        utils::print_prompt("You: ");
        use std::io::Write;
        std::io::stdout().flush()?;

        let mut input = String::new();
        if reader.read_line(&mut input).await? == 0 {
            break; // EOF
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" | "/exit" => {
                utils::print_info("Goodbye!");
                break;
            }
            "/help" => {
                print_help();
                continue;
            }
            "/clear" => {
                let removed = session.clear_history();
                utils::print_success(&format!("Memory cleared ({} messages removed)\n", removed));
                continue;
            }
            "/history" => {
                show_history(&session);
                continue;
            }
            "/tokens" => {
                utils::print_info(&format!(
                    "Approximate tokens in history: {}\n",
                    session.estimated_tokens()
                ));
                continue;
            }
            "/debug" => {
                show_debug(&session);
                continue;
            }
            "/chart" => {
                let ceiling = session.settings().token_ceiling;
                print!(
                    "{}",
                    utils::render_token_chart(&session.token_timeline(), ceiling)
                );
                println!();
                continue;
            }
            _ => {}
        }

        if let Some(file) = input.strip_prefix("/export") {
            export_transcript(&session, file.trim())?;
            continue;
        }

        // Anything else is a message for the assistant. An API error aborts
        // this turn only; the session stays usable.
        match session.send_turn_report(input).await {
            Ok(report) => {
                utils::print_info("Assistant:");
                println!("{}\n", report.reply);
                if report.evicted > 0 {
                    utils::print_info(&format!(
                        "(sliding window evicted {} old messages)",
                        report.evicted
                    ));
                }
                for advisory in &report.advisories {
                    utils::print_advisory(advisory);
                }
            }
            Err(e) => {
                utils::print_error(&format!("Error: {}\n", e));
            }
        }
    }

    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  /clear          - Clear conversation memory");
    println!("  /history        - Show the full conversation history");
    println!("  /tokens         - Show the approximate token count");
    println!("  /debug          - Show the memory debug snapshot");
    println!("  /chart          - Show the token usage chart");
    println!("  /export [file]  - Export the transcript to a file");
    println!("  /help           - Show this help");
    println!("  /quit           - Exit\n");
}

fn show_history(session: &ConversationSession) {
    let history = session.history();
    if history.is_empty() {
        utils::print_info("History is empty.\n");
        return;
    }
    utils::print_header("Conversation History");
    for (i, msg) in history.iter().enumerate() {
        println!("\n[{}] {}:", i + 1, msg.role.label());
        println!("{}", msg.content);
    }
    println!();
}

fn show_debug(session: &ConversationSession) {
    let snapshot = session.debug_snapshot();
    utils::print_header("Memory Snapshot");
    println!(
        "Messages: {} ({} pairs)",
        snapshot.message_count, snapshot.pair_count
    );
    println!("Estimated tokens: {}", snapshot.estimated_tokens);
    if let Some(window) = &snapshot.window {
        println!(
            "Window: {}/{} pairs used",
            window.pairs_used, window.pair_capacity
        );
    }
    if let Some(ceiling) = &snapshot.ceiling {
        println!(
            "Ceiling: {}/{} tokens ({:.1}%, {})",
            snapshot.estimated_tokens,
            ceiling.token_ceiling,
            ceiling.percent_used,
            ceiling.severity
        );
    }
    if let Some(recorder) = &snapshot.recorder {
        if let Some(path) = &recorder.log_path {
            println!("Debug log: {}", path.display());
        }
        println!("Interactions recorded: {}", recorder.interactions);
    }
    println!();
}

fn export_transcript(session: &ConversationSession, file: &str) -> Result<()> {
    let filename = if file.is_empty() {
        transcript::default_filename(chrono::Local::now())
    } else {
        file.to_string()
    };

    let mut out = std::fs::File::create(&filename)?;
    session.export_transcript(&mut out)?;
    utils::print_success(&format!("Conversation exported to: {}\n", filename));
    Ok(())
}
