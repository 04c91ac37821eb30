// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, LevelFilter, Level, Log, Metadata, Record, SetLoggerError};
use serde::Serialize;
use serde_json::json;
use std::io::Write;

use polyfaq::app_config::{self, Config};
use polyfaq::{Controller, FaqUpdate, WriteStatus};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a FAQ and translate it into every supported language
    Create {
        /// Question in the source language
        question: String,
        /// Answer in the source language
        answer: String,
    },

    /// Show one FAQ in a language
    Get {
        /// FAQ id
        id: i64,
        /// Language code, the source language when omitted
        #[arg(long, default_value = "")]
        lang: String,
    },

    /// Show one page of FAQs in a language
    List {
        /// Language code, the source language when omitted
        #[arg(long, default_value = "")]
        lang: String,
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        /// Page size, the configured default when omitted
        #[arg(short = 's', long)]
        page_size: Option<usize>,
    },

    /// Show every FAQ in a language
    All {
        /// Language code, the source language when omitted
        #[arg(long, default_value = "")]
        lang: String,
    },

    /// Change the question and/or answer of a FAQ
    Update {
        /// FAQ id
        id: i64,
        /// New question
        #[arg(short, long)]
        question: Option<String>,
        /// New answer
        #[arg(short, long)]
        answer: Option<String>,
    },

    /// Delete a FAQ
    Delete {
        /// FAQ id
        id: i64,
    },

    /// Show record count and cache statistics
    Stats,

    /// Drop expired cache entries
    PurgeCache,

    /// Generate shell completions for polyfaq
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// polyfaq - multilingual FAQ store
///
/// Stores questions and answers once in a source language, translates them
/// on creation and serves them per language through a cache.
#[derive(Parser, Debug)]
#[command(name = "polyfaq")]
#[command(version)]
#[command(about = "Multilingual FAQ store with a translation cache")]
#[command(long_about = "polyfaq stores FAQs in a source language, translates them on creation and serves them per language.

EXAMPLES:
    polyfaq create \"What is REST?\" \"REST is an architectural style.\"
    polyfaq get 1 --lang hi                 # Resolve FAQ 1 in Hindi
    polyfaq list --lang bn -p 2 -s 5        # Second page of five, in Bengali
    polyfaq update 1 -a \"A better answer.\"  # Translations are kept as they are
    polyfaq completions bash > polyfaq.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, color) = Self::style_for_level(record.level());

            // stdout carries the JSON output, logs go to stderr
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                emoji,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Trace lets every record through the logger; the max level filters
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "polyfaq", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());
    debug!("Loaded configuration from {}", cli.config_path);

    let controller = Controller::from_config(config)?;
    run_command(&controller, cli.command).await
}

async fn run_command(controller: &Controller, command: Commands) -> Result<()> {
    let store = controller.store();
    let query = controller.query();

    match command {
        Commands::Create { question, answer } => {
            let record = store.create(&question, &answer).await?;
            print_json(&json!({
                "status": WriteStatus::Created.http_status(),
                "faq": record.to_snapshot(),
            }))
        }
        Commands::Get { id, lang } => print_json(&query.get_one(id, &lang).await?),
        Commands::List {
            lang,
            page,
            page_size,
        } => {
            let page_size = page_size.unwrap_or_else(|| query.default_page_size());
            print_json(&query.get_page(&lang, page, page_size).await?)
        }
        Commands::All { lang } => print_json(&query.get_all(&lang).await?),
        Commands::Update {
            id,
            question,
            answer,
        } => {
            let record = store.update(id, FaqUpdate { question, answer }).await?;
            print_json(&json!({
                "status": WriteStatus::Updated.http_status(),
                "faq": record.to_snapshot(),
            }))
        }
        Commands::Delete { id } => {
            store.delete(id).await?;
            print_json(&json!({
                "status": WriteStatus::Deleted.http_status(),
                "id": id,
            }))
        }
        Commands::Stats => print_json(&controller.stats().await?),
        Commands::PurgeCache => {
            let removed = controller.purge_cache().await;
            print_json(&json!({ "purged": removed }))
        }
        Commands::Completions { .. } => Ok(()),
    }
}
