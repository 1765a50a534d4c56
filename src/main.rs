use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{info, warn};
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use socketio_codec::{AckCallback, AckDecoder, AckReply};

mod cli;
mod config;

use cli::Cli;
use cli::chat::{self, ChatEvent, Receipt};
use cli::commands::Commands;
use cli::frame::{EventFrame, render_arguments};
use config::Config;

fn setup_logging(level: Option<&str>) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("socketio-codec")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("sioc.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let env = env_logger::Env::default().default_filter_or(level.unwrap_or("info"));
    env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if !config.output.color {
        colored::control::set_override(false);
    }

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Decode { input } => handle_decode_command(input.as_deref(), config),
        Commands::Encode { event, ack } => handle_encode_command(event, *ack, config),
        Commands::Events => handle_events_command(config),
    }
}

fn render<T: serde::Serialize>(value: &T, config: &Config) -> Result<String> {
    let rendered = if config.output.pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    rendered.context("Failed to render output")
}

fn handle_decode_command(input: Option<&Path>, config: &Config) -> Result<()> {
    info!("Decoding frames from: {:?}", input);
    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(
            fs::File::open(path).context(format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let decoder = chat::decoder(&config.events, config.ack.require_ack_for_messages);
    let mut handled = 0u64;

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }
        let sequence = index as u64 + 1;

        let frame = EventFrame::parse(&line).context(format!("Line {}", sequence))?;
        let ack = AckCallback::new(|arguments| {
            println!("  {} {}", "ack ->".blue(), render_arguments(&arguments));
        });
        let event = frame.into_event(Some(ack)).context(format!("Line {}", sequence))?;

        match decoder.dispatch(&event) {
            None => {
                warn!("No decoder for event '{}' on line {}", event.name, sequence);
                println!("{} {}", "unhandled:".yellow(), event.name);
            }
            Some(Err(e)) => {
                warn!("Failed to decode event '{}' on line {}: {}", event.name, sequence, e);
                println!("{} {}: {}", "error:".red(), event.name, e);
            }
            Some(Ok((decoded, reply))) => {
                handled += 1;
                println!("{} {}", "decoded:".green(), render(&decoded, config)?);
                if let Some(reply) = reply {
                    if config.ack.auto_reply {
                        let receipt = Receipt {
                            event: event.name.clone(),
                            sequence,
                        };
                        if let Err(e) = reply.reply(receipt) {
                            warn!("Failed to ack event '{}' on line {}: {}", event.name, sequence, e);
                        }
                    }
                }
            }
        }
    }

    info!("Decoded {} events", handled);
    Ok(())
}

fn handle_encode_command(json: &str, ack: bool, config: &Config) -> Result<()> {
    info!("Encoding chat event (ack: {})", ack);
    let value: ChatEvent = serde_json::from_str(json).context("Invalid chat event JSON")?;

    let encoder = chat::encoder(&config.events);
    let event = if ack {
        let handler = AckReply::new(|receipt: socketio_codec::Result<Receipt>| match receipt {
            Ok(receipt) => info!("Received receipt: {:?}", receipt),
            Err(e) => warn!("Invalid receipt: {}", e),
        });
        encoder
            .with_ack(AckDecoder::<Receipt>::json())
            .encode(&(value, handler))
    } else {
        encoder.encode(&value)
    }
    .context("Failed to encode chat event")?;

    println!("{}", EventFrame::from_event(&event).to_line()?);
    Ok(())
}

fn handle_events_command(config: &Config) -> Result<()> {
    info!("Listing handled events");
    println!("{}", "Inbound events:".cyan());
    for name in chat::decoder(&config.events, false).event_names() {
        println!("  {}", name);
    }
    println!("{}", "Outbound variants:".cyan());
    for variant in chat::encoder_table(&config.events).variants() {
        println!("  {}", variant);
    }
    Ok(())
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration, which decides the log level
    let (config, notes) = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging at the configured level
    setup_logging(config.log_level.as_deref()).context("Failed to setup logging")?;

    // Report how the config was resolved now that logging is up
    for note in &notes {
        note.log();
    }

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).context("Application failed")?;

    Ok(())
}
