// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, LevelFilter, Level, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use anuvad::app_config::{self, CacheBackend, Config, ConfigOverrides, PipelineDiscovery};
use anuvad::app_controller::Controller;
use anuvad::language_utils;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
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

/// CLI Wrapper for CacheBackend to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliCacheBackend {
    Sqlite,
    Memory,
}

impl From<CliCacheBackend> for CacheBackend {
    fn from(backend: CliCacheBackend) -> Self {
        match backend {
            CliCacheBackend::Sqlite => CacheBackend::Sqlite,
            CliCacheBackend::Memory => CacheBackend::Memory,
        }
    }
}

/// CLI Wrapper for PipelineDiscovery to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliDiscovery {
    Static,
    Search,
}

impl From<CliDiscovery> for PipelineDiscovery {
    fn from(discovery: CliDiscovery) -> Self {
        match discovery {
            CliDiscovery::Static => PipelineDiscovery::Static,
            CliDiscovery::Search => PipelineDiscovery::Search,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP translation service (default command)
    Serve,

    /// Translate a single text and print the result
    Translate {
        /// Text to translate
        #[arg(value_name = "TEXT")]
        text: String,

        /// Source language code (e.g., 'en', 'hi')
        #[arg(short, long, default_value = "en")]
        source_lang: String,

        /// Target language code (e.g., 'hi', 'ta')
        #[arg(short, long)]
        target_lang: String,
    },

    /// Delete expired cache entries
    CleanCache {
        /// Delete every entry, not only expired ones
        #[arg(long)]
        all: bool,
    },

    /// Show cache entry counts
    CacheStats,

    /// List supported language codes
    Languages,

    /// Generate shell completions for anuvad
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Values overriding the config file; each can also come from the environment
#[derive(Args, Debug)]
struct OverrideArgs {
    /// Bhashini auth/config base URL
    #[arg(long, env = "BHASHINI_BASE_URL", global = true)]
    base_url: Option<String>,

    /// ULCA user id
    #[arg(long, env = "BHASHINI_USER_ID", hide_env_values = true, global = true)]
    user_id: Option<String>,

    /// ULCA API key (ulcaApiKey)
    #[arg(long, env = "BHASHINI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Pipeline tried first on a cache miss
    #[arg(long, env = "BHASHINI_PIPELINE_ID", global = true)]
    pipeline_id: Option<String>,

    /// Cache entry lifetime (90s, 30m, 24h, 2d or seconds)
    #[arg(long, env = "TRANSLATION_CACHE_TTL", global = true)]
    cache_ttl: Option<String>,

    /// Cache storage backend
    #[arg(long, value_enum, global = true)]
    cache_backend: Option<CliCacheBackend>,

    /// SQLite database file
    #[arg(long, env = "DATABASE_PATH", global = true)]
    database_path: Option<PathBuf>,

    /// Fallback pipeline strategy
    #[arg(long, value_enum, global = true)]
    discovery: Option<CliDiscovery>,

    /// Interface the server binds to
    #[arg(long, global = true)]
    host: Option<String>,

    /// Port the server listens on
    #[arg(long, env = "PORT", global = true)]
    port: Option<u16>,
}

/// Anuvad - cached translation relay for the Bhashini pipeline API
#[derive(Parser, Debug)]
#[command(name = "anuvad")]
#[command(version)]
#[command(about = "Cache-aside translation service in front of the Bhashini (ULCA) pipeline API")]
#[command(long_about = "Anuvad serves translations for English and Indian languages from a local
cache, calling the Bhashini pipeline API only on a cache miss.

EXAMPLES:
    anuvad                                      # Run the HTTP service on port 3001
    anuvad serve --port 8080                    # Run on another port
    anuvad translate \"Hello\" -s en -t hi        # Translate one text
    anuvad clean-cache                          # Delete expired entries
    anuvad completions bash > anuvad.bash       # Generate bash completions

CONFIGURATION:
    Configuration is stored in anuvad.json by default. If the file doesn't exist,
    a default one is created. Environment variables (BHASHINI_USER_ID,
    BHASHINI_API_KEY, ...) and flags take precedence over the file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, default_value = "anuvad.json", global = true)]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    #[command(flatten)]
    overrides: OverrideArgs,
}

impl CommandLineOptions {
    fn config_overrides(&self) -> ConfigOverrides {
        let args = &self.overrides;
        ConfigOverrides {
            base_url: args.base_url.clone(),
            user_id: args.user_id.clone(),
            api_key: args.api_key.clone(),
            pipeline_id: args.pipeline_id.clone(),
            cache_ttl: args.cache_ttl.clone(),
            cache_backend: args.cache_backend.map(Into::into),
            database_path: args.database_path.clone(),
            discovery: args.discovery.map(Into::into),
            host: args.host.clone(),
            port: args.port,
            log_level: self.log_level.map(Into::into),
        }
    }
}

// Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger accepts everything; `log::set_max_level` does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
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
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Load the config file and apply environment/CLI overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&cli.config)?;
    config
        .apply_overrides(&cli.config_overrides())
        .context("Invalid configuration override")?;
    config.validate().context("Configuration validation failed")?;

    log::set_max_level(config.log_level.to_level_filter());
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config is loaded, then the configured level
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match &cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(*shell, &mut cmd, "anuvad", &mut std::io::stdout());
            return Ok(());
        }
        Some(Commands::Languages) => {
            for (code, name) in language_utils::supported_languages() {
                println!("{:<4} {}", code, name);
            }
            return Ok(());
        }
        _ => {}
    }

    let config = load_config(&cli)?;
    let controller = Controller::with_config(config)?;

    match cli.command {
        None | Some(Commands::Serve) => controller.serve().await?,
        Some(Commands::Translate {
            text,
            source_lang,
            target_lang,
        }) => {
            let translated = controller.translate(&text, &source_lang, &target_lang).await?;
            println!("{}", translated);
        }
        Some(Commands::CleanCache { all }) => {
            let removed = controller.clean_cache(all).await?;
            info!("Removed {} cache entries", removed);
        }
        Some(Commands::CacheStats) => {
            let stats = controller.cache_stats().await?;
            println!("{}", stats);
        }
        Some(Commands::Languages) | Some(Commands::Completions { .. }) => {}
    }

    Ok(())
}
