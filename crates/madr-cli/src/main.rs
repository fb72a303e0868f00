//! madr: CLI tool to convert MADR decision records between Markdown and JSON

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::{CONFIG_FILE_NAME, Config};
use madr_core::{
    ArchitecturalDecisionRecord, ExplanationSplit, GeneratorOptions, TitleMatching,
    parse_with_options, serialize,
};

#[derive(Parser, Debug)]
#[command(name = "madr")]
#[command(about = "Convert MADR decision records between Markdown and JSON")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
#[command(after_help = "Examples:
  madr 0001-use-postgres.md              # Convert to 0001-use-postgres.json
  madr 0001-use-postgres.json            # Render a record as Markdown
  madr 0001-use-postgres.md -f md        # Re-format in canonical layout
  madr docs/decisions/ -o out/ -j4       # Convert directory with 4 jobs
  madr docs/decisions/ --check           # List records not in canonical layout")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Input Markdown or JSON file, or a directory of Markdown files
    #[arg(required = true)]
    input: Option<PathBuf>,

    /// Output file or directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (defaults to json for Markdown input, md for JSON input)
    #[arg(short, long, value_parser = ["md", "json"])]
    format: Option<String>,

    /// Number of parallel jobs (defaults to number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Process directories recursively
    #[arg(short, long)]
    recursive: bool,

    /// Report Markdown files that are not in canonical layout instead of converting
    #[arg(long)]
    check: bool,

    /// Configuration file (defaults to _madr.toml next to the input)
    #[arg(long)]
    config: Option<PathBuf>,

    /// How to cut the explanation out of the "Chosen option" line
    #[arg(long, value_parser = ["first", "legacy"])]
    explanation_split: Option<String>,

    /// Only match option headings that equal a considered option
    #[arg(long)]
    exact_titles: bool,

    /// Fail on malformed decision outcome lines
    #[arg(long)]
    strict: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only show errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a sample _madr.toml
    Init {
        /// Directory to write the configuration file into
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
    /// Print the JSON schema of _madr.toml
    Schema,
}

/// Output format of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Markdown,
    Json,
}

impl Format {
    fn from_name(name: &str) -> Result<Self> {
        match name {
            "md" | "markdown" => Ok(Format::Markdown),
            "json" => Ok(Format::Json),
            other => anyhow::bail!("Unknown output format: {} (expected md or json)", other),
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Format::Markdown => "md",
            Format::Json => "json",
        }
    }
}

/// Settings shared by every file of one run, after merging config and flags
#[derive(Debug, Clone)]
struct Settings {
    format: Option<Format>,
    generator: GeneratorOptions,
    strict: bool,
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    if let Some(command) = &cli.command {
        return run_command(command);
    }

    let Some(input) = cli.input.as_deref() else {
        anyhow::bail!("No input given");
    };

    let config = load_config(&cli, input)?;
    let settings = resolve_settings(&cli, &config)?;

    if input.is_file() {
        if cli.check {
            ensure_markdown(input)?;
            check_files(&[input.to_path_buf()], &settings)
        } else {
            convert_file(input, cli.output.as_deref(), &settings)
        }
    } else if input.is_dir() {
        let files = collect_md_files(input, cli.recursive)?;
        if files.is_empty() {
            if !settings.quiet {
                eprintln!("No .md files found in {}", input.display());
            }
            return Ok(());
        }
        configure_thread_pool(cli.jobs);
        if cli.check {
            check_files(&files, &settings)
        } else {
            convert_directory(input, &files, cli.output.as_deref(), &settings)
        }
    } else {
        anyhow::bail!("Input path does not exist: {}", input.display());
    }
}

/// Log to stderr; `RUST_LOG` takes precedence over `-v`/`-q`
fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run_command(command: &Command) -> Result<()> {
    match command {
        Command::Init { dir, force } => {
            let path = dir.join(CONFIG_FILE_NAME);
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            fs::write(&path, Config::sample().to_toml()?)
                .with_context(|| format!("Failed to write: {}", path.display()))?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Schema => {
            println!("{}", Config::json_schema_string()?);
            Ok(())
        }
    }
}

/// Explicit `--config`, else `_madr.toml` in the input directory
fn load_config(cli: &Cli, input: &Path) -> Result<Config> {
    if let Some(path) = &cli.config {
        return Config::load(path);
    }

    let dir = if input.is_dir() {
        Some(input)
    } else {
        input.parent().filter(|p| !p.as_os_str().is_empty())
    };
    let dir = dir.unwrap_or(Path::new("."));

    let config = Config::load_from_dir(dir)?;
    if config.is_some() {
        debug!("Loaded {}", dir.join(CONFIG_FILE_NAME).display());
    }
    Ok(config.unwrap_or_default())
}

/// Command line flags override configuration values
fn resolve_settings(cli: &Cli, config: &Config) -> Result<Settings> {
    let format = cli
        .format
        .as_deref()
        .or(config.output.format.as_deref())
        .map(Format::from_name)
        .transpose()?;

    let explanation_split = match cli
        .explanation_split
        .as_deref()
        .or(config.parse.explanation_split.as_deref())
    {
        None | Some("first") => ExplanationSplit::First,
        Some("legacy") => ExplanationSplit::Legacy,
        Some(other) => anyhow::bail!(
            "Unknown explanation_split: {} (expected first or legacy)",
            other
        ),
    };

    let title_matching = if cli.exact_titles || config.parse.exact_titles.unwrap_or(false) {
        TitleMatching::Exact
    } else {
        TitleMatching::Prefix
    };

    Ok(Settings {
        format,
        generator: GeneratorOptions {
            explanation_split,
            title_matching,
        },
        strict: cli.strict || config.parse.strict.unwrap_or(false),
        quiet: cli.quiet,
    })
}

fn configure_thread_pool(jobs: Option<usize>) {
    if let Some(n) = jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .ok(); // Ignore error if already initialized
    }
}

/// Convert a single file
fn convert_file(input: &Path, output: Option<&Path>, settings: &Settings) -> Result<()> {
    let format = output_format(input, settings);
    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => input.with_extension(format.extension()),
    };

    info!(
        "Converting: {} -> {}",
        input.display(),
        output_path.display()
    );

    convert_file_inner(input, &output_path, format, settings)?;

    if !settings.quiet {
        println!("{}", output_path.display());
    }

    Ok(())
}

/// Convert a directory of Markdown files
fn convert_directory(
    input: &Path,
    files: &[PathBuf],
    output: Option<&Path>,
    settings: &Settings,
) -> Result<()> {
    let output_dir = output.unwrap_or(input);
    let format = settings.format.unwrap_or(Format::Json);

    info!("Found {} .md files", files.len());

    let success = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    let errors: Vec<_> = files
        .par_iter()
        .filter_map(|file| {
            let relative = file.strip_prefix(input).unwrap_or(file);
            let output_file = output_dir.join(relative).with_extension(format.extension());

            match convert_file_inner(file, &output_file, format, settings) {
                Ok(()) => {
                    success.fetch_add(1, Ordering::Relaxed);
                    if !settings.quiet {
                        println!("{}", output_file.display());
                    }
                    None
                }
                Err(e) => {
                    failed.fetch_add(1, Ordering::Relaxed);
                    Some((file.clone(), e))
                }
            }
        })
        .collect();

    for (file, e) in &errors {
        eprintln!("Error converting {}: {:#}", file.display(), e);
    }

    let success_count = success.load(Ordering::Relaxed);
    let failed_count = failed.load(Ordering::Relaxed);

    if !settings.quiet {
        eprintln!("Converted {} files, {} failed", success_count, failed_count);
    }

    if failed_count > 0 {
        anyhow::bail!("{} files failed to convert", failed_count);
    }

    Ok(())
}

/// Inner conversion function that doesn't print (for parallel use)
fn convert_file_inner(
    input: &Path,
    output: &Path,
    format: Format,
    settings: &Settings,
) -> Result<()> {
    let content =
        fs::read_to_string(input).with_context(|| format!("Failed to read: {}", input.display()))?;

    let record = if is_json(input) {
        serde_json::from_str::<ArchitecturalDecisionRecord>(&content)
            .with_context(|| format!("Invalid decision record JSON: {}", input.display()))?
    } else {
        markdown_to_record(&content, settings)?
    };

    let rendered = render(&record, format)?;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(output, &rendered).with_context(|| format!("Failed to write: {}", output.display()))?;

    Ok(())
}

/// Compare each Markdown file with its canonical rendering
fn check_files(files: &[PathBuf], settings: &Settings) -> Result<()> {
    let results: Vec<_> = files
        .par_iter()
        .map(|file| (file, check_file(file, settings)))
        .collect();

    let mut failed = 0;
    for (file, result) in results {
        match result {
            Ok(true) => debug!("{} is canonical", file.display()),
            Ok(false) => {
                failed += 1;
                println!("{}", file.display());
            }
            Err(e) => {
                failed += 1;
                eprintln!("Error checking {}: {:#}", file.display(), e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} files are not canonical", failed, files.len());
    }

    if !settings.quiet {
        eprintln!("{} files are canonical", files.len());
    }

    Ok(())
}

fn check_file(file: &Path, settings: &Settings) -> Result<bool> {
    let content =
        fs::read_to_string(file).with_context(|| format!("Failed to read: {}", file.display()))?;
    let record = markdown_to_record(&content, settings)?;
    Ok(serialize(&record) == normalize_newlines(&content))
}

/// Core conversion function
fn markdown_to_record(content: &str, settings: &Settings) -> Result<ArchitecturalDecisionRecord> {
    let parsed = parse_with_options(content, &settings.generator)
        .map_err(|e| anyhow::anyhow!("Parse error: {}", e))?;

    if settings.strict {
        if let Some(warning) = parsed.warnings.first() {
            anyhow::bail!("{}", warning);
        }
    }

    Ok(parsed.record)
}

fn render(record: &ArchitecturalDecisionRecord, format: Format) -> Result<String> {
    match format {
        Format::Markdown => Ok(serialize(record)),
        Format::Json => {
            let mut json = serde_json::to_string_pretty(record)
                .context("Failed to serialize decision record")?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Explicit format, else the opposite of the input format
fn output_format(input: &Path, settings: &Settings) -> Format {
    settings.format.unwrap_or(if is_json(input) {
        Format::Markdown
    } else {
        Format::Json
    })
}

/// `--check` compares Markdown with its canonical layout; other input has none
fn ensure_markdown(path: &Path) -> Result<()> {
    let is_markdown = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
    if !is_markdown {
        anyhow::bail!(
            "--check only accepts Markdown (.md) input: {}",
            path.display()
        );
    }
    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn normalize_newlines(content: &str) -> String {
    content.replace("\r\n", "\n")
}

/// Collect all .md files in a directory
fn collect_md_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_file() {
            if let Some(ext) = path.extension() {
                if ext.eq_ignore_ascii_case("md") {
                    files.push(path);
                }
            }
        } else if path.is_dir() && recursive {
            files.extend(collect_md_files(&path, recursive)?);
        }
    }

    files.sort();
    Ok(files)
}
