//! CLI Application logic

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use mdocx_ooxml::{
    Config, Converter, DirectoryResolver, TemplateLoader, CONFIG_FILE_NAME, STANDARD_TEMPLATE,
};

#[derive(Parser)]
#[command(name = "mdocx")]
#[command(author, version, about = "Markdown to DOCX through Word templates", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a Markdown file to DOCX
    Convert {
        /// Input Markdown file
        input: PathBuf,

        /// Output DOCX file (default: input with .docx extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (default: mdocx.toml next to the input, if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory searched for templates not built into mdocx
        #[arg(long)]
        template_dir: Option<PathBuf>,

        /// Template name
        #[arg(short, long)]
        template: Option<String>,

        /// Insert at the paragraph containing this text instead of replacing the body
        #[arg(short, long)]
        placeholder: Option<String>,

        /// Disable strikethrough and other emphasis extensions
        #[arg(long)]
        no_extras: bool,
    },

    /// Write the standard template to a file
    Template {
        /// Output DOCX file
        #[arg(short, long, default_value = "markdown-template.docx")]
        output: PathBuf,
    },
}

/// Settings for one conversion
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub template_dir: Option<PathBuf>,
    pub template: Option<String>,
    pub placeholder: Option<String>,
    pub no_extras: bool,
}

impl ConvertOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    /// Output path, defaulting to the input with a `.docx` extension
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.with_extension("docx"))
    }
}

/// Install the stderr tracing subscriber
///
/// `RUST_LOG` selects the filter (default `info`); `verbose` forces `debug`.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    // A subscriber may already be installed when embedded or under test
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the CLI application
///
/// Parses arguments and dispatches to the matching command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert {
            input,
            output,
            config,
            template_dir,
            template,
            placeholder,
            no_extras,
        } => {
            let options = ConvertOptions {
                input,
                output,
                config,
                template_dir,
                template,
                placeholder,
                no_extras,
            };
            let written = convert_command(&options)?;
            println!("Written: {}", written.display());
        }
        Commands::Template { output } => {
            template_command(&output)?;
            println!("Written: {}", output.display());
        }
    }

    Ok(())
}

/// Execute the convert command and return the path written
pub fn convert_command(options: &ConvertOptions) -> Result<PathBuf> {
    let input = &options.input;
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let config = load_config(input, options.config.as_deref())?;
    let mut pipeline = config.pipeline;
    if options.no_extras {
        pipeline.emphasis_extras = false;
    }

    let mut loader = TemplateLoader::new();
    if let Some(dir) = &options.template_dir {
        if !dir.is_dir() {
            anyhow::bail!("Template directory not found: {}", dir.display());
        }
        loader = loader.with_fallback(DirectoryResolver::new(dir));
    }
    let template = options.template.as_deref().unwrap_or(STANDARD_TEMPLATE);

    let converter = Converter::new()
        .with_loader(loader)
        .with_template(template)
        .with_styles(config.styles)
        .with_pipeline(pipeline);

    let markdown = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;

    let stream = match &options.placeholder {
        Some(placeholder) => converter.convert_at_placeholder(&markdown, placeholder),
        None => converter.convert(&markdown),
    }
    .with_context(|| format!("Failed to convert {} with template {template}", input.display()))?;

    let output = options.output_path();
    fs::write(&output, stream.into_inner())
        .with_context(|| format!("Failed to write output file: {}", output.display()))?;
    Ok(output)
}

/// Execute the template command
pub fn template_command(output: &Path) -> Result<()> {
    let buffer = TemplateLoader::new()
        .standard()
        .context("Failed to load the standard template")?;
    fs::write(output, buffer.into_inner())
        .with_context(|| format!("Failed to write template: {}", output.display()))?;
    Ok(())
}

/// Explicit configuration file, else `mdocx.toml` beside the input, else defaults
fn load_config(input: &Path, explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return Config::load(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display()));
    }

    let beside = input
        .parent()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file());
    match beside {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load configuration: {}", path.display())),
        None => {
            debug!("No configuration file; using defaults");
            Ok(Config::default())
        }
    }
}
