// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use asstosrt::app_config::{self, ChineseConversion, Config, LineStrip};
use asstosrt::chinese_convert::DictCache;
use asstosrt::converter::{self, BatchResult};
use asstosrt::errors::AppError;
use asstosrt::file_utils::FileManager;

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

/// CLI Wrapper for ChineseConversion to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliChineseConversion {
    Keep,
    /// Traditional to Simplified
    T2s,
    /// Simplified to Traditional
    S2t,
}

impl From<CliChineseConversion> for ChineseConversion {
    fn from(cli_conv: CliChineseConversion) -> Self {
        match cli_conv {
            CliChineseConversion::Keep => ChineseConversion::Keep,
            CliChineseConversion::T2s => ChineseConversion::ToSimplified,
            CliChineseConversion::S2t => ChineseConversion::ToTraditional,
        }
    }
}

/// CLI Wrapper for LineStrip to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLineStrip {
    All,
    First,
    Last,
}

impl From<CliLineStrip> for LineStrip {
    fn from(cli_lines: CliLineStrip) -> Self {
        match cli_lines {
            CliLineStrip::All => LineStrip::All,
            CliLineStrip::First => LineStrip::First,
            CliLineStrip::Last => LineStrip::Last,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for asstosrt
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// asstosrt - ASS/SSA to SRT subtitle converter
///
/// Converts Advanced SubStation Alpha scripts to SubRip files, with charset
/// conversion, timeline shifting and Chinese script variant conversion.
#[derive(Parser, Debug)]
#[command(name = "asstosrt")]
#[command(version)]
#[command(about = "Convert ASS/SSA subtitles to SRT")]
#[command(long_about = "asstosrt converts ASS/SSA subtitle scripts to SRT.

EXAMPLES:
    asstosrt movie.ass                         # Write movie.srt into the current directory
    asstosrt -o out/ season1/                  # Convert a whole directory into out/
    asstosrt a.ass b.ass                       # Bundle both results into subtitles.zip
    asstosrt --no-zip a.ass b.ass              # Write a.srt and b.srt separately
    asstosrt --in-charset gb18030 old.ass      # Force the input charset
    asstosrt --out-charset utf-16le movie.ass  # Write UTF-16 with a BOM
    asstosrt --offset -2.5 movie.ass           # Shift every cue 2.5s earlier
    asstosrt --chinese t2s --dict-dir dict/ movie.ass
    asstosrt completions bash > asstosrt.bash  # Generate bash completions

CONFIGURATION:
    Options are stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically. Command line flags override the file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Subtitle files, directories or zip archives to convert
    #[arg(value_name = "INPUT_PATH")]
    inputs: Vec<PathBuf>,

    /// Directory to write results into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Input charset label (e.g. 'utf-8', 'gb18030', 'big5'); sniffed from the BOM otherwise
    #[arg(long)]
    in_charset: Option<String>,

    /// Output charset label; UTF-8 when omitted
    #[arg(long)]
    out_charset: Option<String>,

    /// Which lines of each cue to keep
    #[arg(long, value_enum, conflicts_with = "max_lines")]
    lines: Option<CliLineStrip>,

    /// Keep at most this many leading lines of each cue
    #[arg(long)]
    max_lines: Option<usize>,

    /// Replace undecodable bytes instead of failing
    #[arg(long)]
    ignore_codec_err: bool,

    /// Seconds added to every timestamp (may be negative)
    #[arg(long, allow_hyphen_values = true)]
    offset: Option<f64>,

    /// Chinese script variant conversion
    #[arg(long, value_enum)]
    chinese: Option<CliChineseConversion>,

    /// Directory holding t2s.txt and s2t.txt
    #[arg(long)]
    dict_dir: Option<PathBuf>,

    /// Write each result separately instead of one zip archive
    #[arg(long)]
    no_zip: bool,

    /// Keep dialogue events that carry an effect
    #[arg(long)]
    keep_effects: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
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
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                color,
                now,
                tag,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Accept every level here; the effective one is set once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match &cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(*shell, &mut cmd, "asstosrt", &mut std::io::stdout());
            Ok(())
        }
        None => {
            if cli.inputs.is_empty() {
                return Err(anyhow!("INPUT_PATH is required when no subcommand is specified"));
            }
            run_convert(cli).await
        }
    }
}

// @loads: Config file, creating a default one when missing, then applies CLI overrides
fn load_config(options: &CommandLineOptions) -> Result<Config> {
    let config_path = Path::new(&options.config_path);
    let mut config = if config_path.exists() {
        Config::load(config_path)?
    } else {
        warn!(
            "Config file not found at '{}', creating default config.",
            options.config_path
        );
        let config = Config::default();
        config
            .save(config_path)
            .context("Failed to write default config")?;
        config
    };

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    if let Some(label) = &options.in_charset {
        config.options.in_charset = Some(label.clone());
    }
    if let Some(label) = &options.out_charset {
        config.options.out_charset = Some(label.clone());
    }
    if let Some(lines) = &options.lines {
        config.options.lines = lines.clone().into();
    }
    if let Some(n) = options.max_lines {
        config.options.lines = LineStrip::Max(n);
    }
    if let Some(offset) = options.offset {
        config.options.offset_secs = offset;
    }
    if let Some(chinese) = &options.chinese {
        config.chinese_conversion = chinese.clone().into();
    }
    if let Some(dir) = &options.dict_dir {
        config.dict_dir = dir.clone();
    }
    config.options.ignore_codec_err |= options.ignore_codec_err;
    config.options.no_zip |= options.no_zip;
    if options.keep_effects {
        config.options.skip_effects = false;
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

async fn run_convert(options: CommandLineOptions) -> Result<()> {
    let mut config = load_config(&options)?;
    log::set_max_level((&config.log_level).into());

    let cache = DictCache::new();
    if let Some(dict_path) = config.dict_path() {
        let source = FileManager::read_bytes(&dict_path).await?;
        let name = dict_path.to_string_lossy();
        let dict = cache
            .get_or_load(&name, &source)
            .map_err(|e| anyhow!("Failed to load dictionary {:?}: {}", dict_path, e))?;
        info!("Loaded {} dictionary entries from {:?}", dict.len(), dict_path);
        config.options.conv_dict = Some(dict);
    }

    let inputs = FileManager::collect_inputs(&options.inputs).await?;
    if inputs.is_empty() {
        warn!("No .ass or .ssa files found in the given inputs");
        return Ok(());
    }
    info!("Converting {} subtitle files", inputs.len());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .context("Invalid progress bar template")?,
    );
    spinner.set_message(format!("Converting {} files...", inputs.len()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let conversion_options = config.options.clone();
    let result = tokio::task::spawn_blocking(move || {
        let pairs: Vec<(String, Vec<u8>)> = inputs
            .into_iter()
            .map(|input| (input.name, input.bytes))
            .collect();
        converter::convert_many(&pairs, &conversion_options)
    })
    .await
    .context("Conversion task failed")?;
    spinner.finish_and_clear();

    let batch = result.map_err(AppError::from)?;
    write_results(batch, &options.output_dir, options.force_overwrite)
}

// @writes: Archive or individual documents, then reports failed inputs
fn write_results(batch: BatchResult, output_dir: &Path, force: bool) -> Result<()> {
    for failure in &batch.failures {
        error!("{}", failure.to_payload().message);
    }
    let failed = batch.failures.len();
    let converted = batch.documents.len();
    for document in &batch.documents {
        for diagnostic in &document.diagnostics {
            debug!("{}: skipped {}", document.filename, diagnostic);
        }
    }

    let mut written = 0;
    for payload in batch.into_payloads() {
        if let Some(path) =
            FileManager::write_output(output_dir, &payload.filename, &payload.bytes, force)?
        {
            info!("Success: {:?}", path);
            written += 1;
        }
    }

    info!(
        "Finished: {} converted, {} failed, {} files written",
        converted, failed, written
    );
    Ok(())
}
