// Binary-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use cad_translator::app_config::{self, Config, TranslationEngine};
use cad_translator::app_controller::{Controller, suspend_progress};
use cad_translator::sanitizer::strip_invalid_chars;
use cad_translator::translation::PairKey;

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

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a drawing or every drawing of a folder
    Translate(TranslateArgs),

    /// List the labels that would be translated
    Extract(ExtractArgs),

    /// List the supported language pairs
    Pairs,

    /// Inspect or clear the persistent translation cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Generate shell completions for cad-translator
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Show entry and hit counts
    Stats,
    /// Remove every cached translation
    Clear,
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input drawing or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Directory for translated drawings (defaults to the input's directory)
    #[arg(short, long, env = "CAD_TRANSLATOR_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Language pair (zh_to_fr, fr_to_zh, zh_to_en, en_to_zh)
    #[arg(short, long, env = "CAD_TRANSLATOR_PAIR")]
    pair: Option<PairKey>,

    /// Translation engine (google, deepl, openai)
    #[arg(short, long, env = "CAD_TRANSLATOR_ENGINE")]
    engine: Option<TranslationEngine>,

    /// Also translate labels inside blocks
    #[arg(short = 'b', long)]
    include_blocks: bool,

    /// Skip the backend reachability probe
    #[arg(long)]
    no_connectivity_check: bool,

    /// Do not write the CSV report
    #[arg(long)]
    no_report: bool,
}

#[derive(Parser, Debug)]
struct ExtractArgs {
    /// Input drawing
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Language pair deciding the source script
    #[arg(short, long)]
    pair: Option<PairKey>,

    /// Also list labels inside blocks
    #[arg(short = 'b', long)]
    include_blocks: bool,
}

/// CAD drawing label translator
///
/// Extracts text labels from drawings, translates them between Chinese,
/// French and English, and writes the translations back in place.
#[derive(Parser, Debug)]
#[command(name = "cad-translator")]
#[command(version)]
#[command(about = "Translate text labels of CAD drawings")]
#[command(long_about = "cad-translator extracts the text labels of CAD drawings, translates them and writes them back.

EXAMPLES:
    cad-translator translate plan.json                  # Translate using default config
    cad-translator translate -p fr_to_zh plan.json      # Translate French labels to Chinese
    cad-translator translate -e deepl -b plans/         # Whole folder with DeepL, blocks included
    cad-translator extract plan.json                    # List labels without translating
    cad-translator cache stats                          # Persistent cache statistics
    cad-translator completions bash > cad-translator.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    is created and the program exits so it can be reviewed.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json", env = "CAD_TRANSLATOR_CONFIG")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
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

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());
            // Drawing text can carry control characters; keep them out of the terminal
            let message = strip_invalid_chars(&record.args().to_string());

            suspend_progress(|| {
                let mut stderr = std::io::stderr();
                let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, tag, message);
            });
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Load the config file, or write a default one and stop
fn load_config(config_path: &Path) -> Result<Option<Config>> {
    if !config_path.exists() {
        warn!("Config file not found at {:?}, creating default config.", config_path);
        let config_json = serde_json::to_string_pretty(&Config::default())
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", config_path))?;
        info!("Review {:?} (engine, API key, language pair) and run again.", config_path);
        return Ok(None);
    }

    let file = File::open(config_path)
        .with_context(|| format!("Failed to open config file: {:?}", config_path))?;
    let config: Config = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
    Ok(Some(config))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // The level is updated after loading the config
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();
    if let Some(level) = &cli.log_level {
        log::set_max_level(level_filter(&level.clone().into()));
    }

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "cad-translator", &mut std::io::stdout());
        return Ok(());
    }
    if let Commands::Pairs = &cli.command {
        print_pairs();
        return Ok(());
    }

    let Some(mut config) = load_config(&cli.config_path)? else {
        return Ok(());
    };
    match &cli.log_level {
        Some(level) => config.log_level = level.clone().into(),
        None => log::set_max_level(level_filter(&config.log_level)),
    }

    match cli.command {
        Commands::Translate(args) => run_translate(config, args).await,
        Commands::Extract(args) => run_extract(config, args),
        Commands::Cache { action } => run_cache(config, action).await,
        Commands::Completions { .. } | Commands::Pairs => Ok(()),
    }
}

fn print_pairs() {
    for key in PairKey::ALL {
        let pair = key.config();
        println!(
            "{:<10} {:<22} {} glossary terms, {} corrections",
            key.as_str(),
            pair.display_name,
            pair.glossary.len(),
            pair.corrections.len()
        );
    }
}

async fn run_translate(mut config: Config, args: TranslateArgs) -> Result<()> {
    // Override config with CLI options if provided
    if let Some(pair) = args.pair {
        config.pair = pair;
    }
    if let Some(engine) = args.engine {
        config.translation.engine = engine;
    }
    if args.include_blocks {
        config.document.include_blocks = true;
    }
    if args.no_connectivity_check {
        config.connectivity.enabled = false;
    }

    if !args.input_path.exists() {
        return Err(anyhow!("Input path does not exist: {:?}", args.input_path));
    }

    let controller = Controller::with_config(config)?;
    let summaries = controller
        .run(&args.input_path, args.output_dir.as_deref(), !args.no_report)
        .await?;

    let failed: usize = summaries.iter().map(|s| s.failed).sum();
    if failed > 0 {
        warn!("{} label(s) kept their original text after translation failures", failed);
    }
    Ok(())
}

fn run_extract(mut config: Config, args: ExtractArgs) -> Result<()> {
    if let Some(pair) = args.pair {
        config.pair = pair;
    }
    if args.include_blocks {
        config.document.include_blocks = true;
    }

    let controller = Controller::with_config(config)?;
    let extraction = controller.extract(&args.input_path)?;
    for item in &extraction.items {
        println!(
            "{}\t{}\t{}\t{}",
            item.location,
            item.layer,
            item.kind,
            strip_invalid_chars(&item.original_text)
        );
    }
    info!(
        "{} label(s) to translate, {} skipped",
        extraction.items.len(),
        extraction.skipped
    );
    Ok(())
}

async fn run_cache(config: Config, action: CacheAction) -> Result<()> {
    let controller = Controller::with_config(config)?;
    match action {
        CacheAction::Stats => {
            let (path, stats) = controller.cache_stats().await?;
            println!("{}: {}", path.display(), stats);
        }
        CacheAction::Clear => {
            let removed = controller.clear_cache().await?;
            info!("Removed {} cached translation(s)", removed);
        }
    }
    Ok(())
}
