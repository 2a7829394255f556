use anyhow::{anyhow, bail, Context};
use config::{Config, File};
use domino::{
    pattern::{presets, Pattern},
    timed, CommandParser, Connection, DominoConfig, DominoMessage,
};
use log::{info, warn, LevelFilter};
use serde_json::Value;
use simple_logger::SimpleLogger;
use std::{
    collections::BTreeMap,
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    process,
};
use structopt::StructOpt;
use strum::{Display, EnumString};

/// CLI for checking Domino patterns and command batches.
#[derive(Debug, StructOpt)]
#[structopt(name = "domino")]
struct Opt {
    /// Path to a config file with parser and connection options. Supported
    /// formats: JSON, TOML. Anything left out uses the default.
    #[structopt(short, long)]
    config: Option<PathBuf>,

    /// Path to a JSON pattern definition to validate
    #[structopt(short, long)]
    pattern: Option<PathBuf>,

    /// Name of a built-in pattern to use instead of a pattern file. Supported
    /// patterns: square, rhombille
    #[structopt(long, conflicts_with = "pattern")]
    preset: Option<PresetPattern>,

    /// Path to a JSON file holding an array of wire messages to parse
    #[structopt(short = "m", long)]
    commands: Option<PathBuf>,

    /// Skip malformed messages instead of failing on the first one
    #[structopt(long)]
    lenient: bool,

    /// If given, output files will be written to this directory. See
    /// `--output-formats` for what gets written.
    #[structopt(short, long)]
    output: Option<PathBuf>,

    /// The format(s) to write output in. Supported formats:
    ///
    /// cfg - The full config in effect, in TOML format
    ///
    /// commands - The parsed messages, re-encoded in canonical wire form
    ///
    /// pattern - The pattern definition, in JSON format
    #[structopt(short = "f", long)]
    output_formats: Vec<OutputFormat>,

    /// The logging level to use. See
    /// https://docs.rs/log/0.4.11/log/enum.LevelFilter.html for options
    #[structopt(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Copy, Clone, Debug, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
enum PresetPattern {
    Square,
    Rhombille,
}

/// Different output formats.
#[derive(Copy, Clone, Debug, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
enum OutputFormat {
    // If you change this, make sure to update the help text for
    // `--output-formats`!
    /// The full config, including defaults, in a human-readable file
    Cfg,
    /// Every parsed message, in canonical wire form
    Commands,
    /// The loaded pattern's definition
    Pattern,
}

impl OutputFormat {
    fn file_name(self) -> &'static str {
        match self {
            Self::Cfg => "domino.toml",
            Self::Commands => "commands.json",
            Self::Pattern => "pattern.json",
        }
    }
}

/// Everything loaded from the input files
struct Loaded {
    config: DominoConfig,
    parser: CommandParser,
    pattern: Option<Pattern>,
    messages: Vec<DominoMessage>,
}

fn load_config(config_path: &Path) -> anyhow::Result<DominoConfig> {
    let mut settings = Config::new();
    let config_path = config_path.to_str().ok_or_else(|| {
        anyhow!("invalid character in path {:?}", config_path)
    })?;
    settings
        .merge(File::with_name(config_path))
        .context("error reading config file")?;
    settings.try_into().context("error reading config")
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let file = OpenOptions::new()
        .read(true)
        .open(path)
        .with_context(|| format!("error opening file {:?}", path))?;
    serde_json::from_reader(file)
        .with_context(|| format!("error parsing JSON in {:?}", path))
}

fn load_pattern(opt: &Opt) -> anyhow::Result<Option<Pattern>> {
    let pattern = match (&opt.pattern, opt.preset) {
        (Some(pattern_path), _) => {
            let value = read_json(pattern_path)?;
            // Deserializing runs the full pattern validation
            serde_json::from_value(value).with_context(|| {
                format!("invalid pattern in {:?}", pattern_path)
            })?
        }
        (None, Some(PresetPattern::Square)) => presets::square(),
        (None, Some(PresetPattern::Rhombille)) => presets::rhombille(),
        (None, None) => return Ok(None),
    };
    info!(
        "Pattern {:?} has {} tiles per group over {} shapes",
        pattern.name(),
        pattern.tile_count(),
        pattern.shape_count()
    );
    Ok(Some(pattern))
}

fn load_messages(
    parser: &CommandParser,
    commands_path: &Path,
    lenient: bool,
) -> anyhow::Result<Vec<DominoMessage>> {
    let value = read_json(commands_path)?;
    if !lenient {
        return parser.parse_batch(&value).with_context(|| {
            format!("invalid commands in {:?}", commands_path)
        });
    }

    let (messages, errors) = parser.parse_batch_lenient(&value);
    if !errors.is_empty() {
        warn!(
            "Skipped {} of {} messages in {:?}",
            errors.len(),
            messages.len() + errors.len(),
            commands_path
        );
    }
    Ok(messages)
}

/// Log how many of each kind of message there are
fn summarize(messages: &[DominoMessage]) {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for message in messages {
        *counts.entry(message.kind().into()).or_default() += 1;
    }
    info!("Parsed {} messages", messages.len());
    for (kind, count) in counts {
        info!("  {}: {}", kind, count);
    }
}

/// Generate an output file in the given format.
fn gen_output(
    output_dir: &Path,
    output_format: OutputFormat,
    loaded: &Loaded,
) -> anyhow::Result<()> {
    fn generate_bytes(
        output_format: OutputFormat,
        loaded: &Loaded,
    ) -> anyhow::Result<Vec<u8>> {
        Ok(match output_format {
            OutputFormat::Cfg => {
                // Serialize just the config via toml
                toml::to_string_pretty(&loaded.config)
                    // Panics only if config format isn't serializable (a bug)
                    .expect("error serializing config")
                    .into_bytes()
            }
            OutputFormat::Commands => {
                let values = loaded
                    .messages
                    .iter()
                    .map(|message| loaded.parser.encode_command(message))
                    .collect::<Result<Vec<Value>, _>>()?;
                serde_json::to_vec_pretty(&values)?
            }
            OutputFormat::Pattern => match &loaded.pattern {
                Some(pattern) => serde_json::to_vec_pretty(pattern)?,
                None => bail!("pattern output requested, but no pattern given"),
            },
        })
    }

    let output_file_path = output_dir.join(output_format.file_name());

    timed!(
        format!(
            "Generating {} output and writing to {:?}",
            output_format, &output_file_path
        ),
        log::Level::Info,
        {
            let bytes = generate_bytes(output_format, loaded)?;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&output_file_path)
                .with_context(|| {
                    format!("error opening output file {:?}", &output_file_path)
                })?;
            file.write_all(&bytes).with_context(|| {
                format!("error writing to file {:?}", &output_file_path)
            })?;
        }
    );

    Ok(())
}

/// Run the CLI with some options
fn run(opt: Opt) -> anyhow::Result<()> {
    SimpleLogger::new().with_level(opt.log_level).init()?;

    let config = match &opt.config {
        Some(config_path) => load_config(config_path)?,
        None => DominoConfig::default(),
    };
    let parser =
        CommandParser::new(config.wire).context("invalid wire config")?;

    let pattern = load_pattern(&opt)?;
    let messages = match &opt.commands {
        Some(commands_path) => {
            let messages = load_messages(&parser, commands_path, opt.lenient)?;
            summarize(&messages);
            messages
        }
        None => Vec::new(),
    };

    // The connection half of the config is only checked here, nothing in
    // the CLI sends messages anywhere
    Connection::new(config.connection)
        .context("invalid connection config")?;

    let loaded = Loaded {
        config,
        parser,
        pattern,
        messages,
    };

    // If an output dir was specified, write out output format(s) there
    if let Some(output_dir) = &opt.output {
        if opt.output_formats.is_empty() {
            bail!("output dir was specified, but no output formats were given")
        }
        fs::create_dir_all(output_dir)?;
        for output_format in &opt.output_formats {
            gen_output(output_dir, *output_format, &loaded)?;
        }
    }

    Ok(())
}

fn main() {
    let exit_code = match run(Opt::from_args()) {
        Ok(_) => 0,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            1
        }
    };
    process::exit(exit_code);
}
