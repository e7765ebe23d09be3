//! Command-line interface for the processmap utility
//!
//! Converts between draw.io XML and the JSON diagram model, checks diagrams
//! against their notation, and manages a local JSON diagram store.

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::debug;

use processmap::core::logging::init_logging;
use processmap::core::repository::JsonFileRepository;
use processmap::plugins::notation::NotationConfig;
use processmap::plugins::service::DiagramService;
use processmap::plugins::Orchestrator;
use processmap::{Diagram, Notation, Point, ValidationReport};

/// Default directory of the diagram store
pub const DEFAULT_STORE: &str = ".processmap";

/// processmap - Business-process diagrams in draw.io format
#[derive(Parser)]
#[command(name = "processmap")]
#[command(about = "Import, export and check draw.io business-process diagrams")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    /// TOML file adjusting the notation catalogue
    #[arg(long, global = true)]
    pub notations: Option<PathBuf>,

    /// Directory of the diagram store
    #[arg(long, default_value = DEFAULT_STORE, global = true)]
    pub store: PathBuf,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// Output format of `new`
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// draw.io XML
    #[default]
    Xml,
    /// JSON diagram model
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert draw.io XML to the JSON diagram model
    Import {
        /// draw.io file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// JSON output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also keep the diagram in the store
        #[arg(long)]
        save: bool,
    },

    /// Convert a JSON diagram model to draw.io XML
    Export {
        /// JSON file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// draw.io output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the notation of a draw.io document
    Detect {
        /// draw.io file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Check a diagram (draw.io XML or JSON model) against its notation
    Validate {
        /// Input file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Create an empty diagram
    New {
        /// Notation (vad|epc|org|bpmn)
        notation: Notation,

        /// Diagram name
        #[arg(long)]
        name: Option<String>,

        /// Stencil to place on the new diagram (repeatable)
        #[arg(long = "add", value_name = "STENCIL")]
        stencils: Vec<String>,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Xml)]
        format: OutputFormat,
    },

    /// Show available notations and their stencils
    Notations {
        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List diagrams in the store
    List {
        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Remove a diagram from the store
    Delete {
        /// Diagram id
        id: String,
    },
}

/// One row of `list`
#[derive(Debug, Serialize)]
struct ListEntry<'a> {
    id: &'a str,
    notation: Option<Notation>,
    name: &'a str,
    elements: usize,
    modified_at: String,
}

/// Main CLI application
pub struct ProcessmapApp {
    orchestrator: Orchestrator,
    config: NotationConfig,
    store: PathBuf,
}

impl ProcessmapApp {
    /// Create an application with the built-in catalogue and the default store
    pub fn new() -> Self {
        Self::with_config(NotationConfig::default(), PathBuf::from(DEFAULT_STORE))
    }

    pub fn with_config(config: NotationConfig, store: PathBuf) -> Self {
        Self {
            orchestrator: Orchestrator::with_default_detectors(),
            config,
            store,
        }
    }

    /// Build the application for parsed arguments, loading `--notations` if given
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = match &cli.notations {
            Some(path) => NotationConfig::load(path).map_err(|e| {
                anyhow!("Failed to load notation config '{}': {}", path.display(), e)
            })?,
            None => NotationConfig::default(),
        };
        Ok(Self::with_config(config, cli.store.clone()))
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flags
        let log_level_str = std::env::var("PROCESSMAP_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| Some(cli.log_level.as_str().to_string()));

        let log_format_str = std::env::var("PROCESSMAP_LOG_FORMAT")
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        if let Err(e) = init_logging(log_level_str.as_deref(), log_format_str.as_deref()) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("processmap v{}", env!("CARGO_PKG_VERSION"));
        }

        let verbose = cli.verbose;
        match cli.command {
            Commands::Import {
                input,
                output,
                save,
            } => self.import_command(input, output, save, verbose),
            Commands::Export { input, output } => self.export_command(input, output, verbose),
            Commands::Detect { input } => self.detect_command(input, verbose),
            Commands::Validate { input } => self.validate_command(input, verbose),
            Commands::New {
                notation,
                name,
                stencils,
                output,
                format,
            } => self.new_command(notation, name, &stencils, output, format),
            Commands::Notations { json } => self.notations_command(json),
            Commands::List { json } => self.list_command(json),
            Commands::Delete { id } => self.delete_command(&id),
        }
    }

    fn service(&self) -> Result<DiagramService<JsonFileRepository>> {
        let repository = JsonFileRepository::open(&self.store).map_err(|e| {
            anyhow!("Failed to open store '{}': {}", self.store.display(), e)
        })?;
        Ok(DiagramService::new(repository))
    }

    /// Handle the import command
    fn import_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        save: bool,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input)?;
        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let mut diagram = self.orchestrator.import(&content)?;
        if save {
            self.service()?.save_diagram(&mut diagram)?;
            if verbose {
                eprintln!("Saved diagram {} to {}", diagram.id, self.store.display());
            }
        }
        self.write_output(output, &diagram.to_json()?)
    }

    /// Handle the export command
    fn export_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input)?;
        let diagram = Diagram::from_json(&content)?;
        if verbose {
            eprintln!(
                "Exporting {} element(s), {} connection(s)",
                diagram.all_elements().len(),
                diagram.connections().len()
            );
        }
        let xml = self.orchestrator.export(&diagram)?;
        self.write_output(output, &xml)
    }

    /// Handle the detect command
    fn detect_command(&self, input: Option<PathBuf>, verbose: bool) -> Result<()> {
        let content = self.read_input(input)?;
        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        match self.orchestrator.detect_notation(&content) {
            Ok(notation) => {
                println!("{}", notation);
                Ok(())
            }
            Err(e) => {
                eprintln!("Could not detect notation: {}", e);
                Err(e.into())
            }
        }
    }

    /// Diagram from draw.io XML or the JSON model, judged by the first character
    pub fn load_diagram(&self, content: &str) -> Result<Diagram> {
        if content.trim_start().starts_with('<') {
            self.orchestrator.import(content)
        } else {
            Ok(Diagram::from_json(content)?)
        }
    }

    /// Diagram-level findings plus the per-element rules of its notation
    pub fn check(&self, diagram: &Diagram) -> ValidationReport {
        let report = diagram.validate();
        let mut errors = report.errors;
        let mut warnings = report.warnings;

        if let Some(notation) = diagram.notation {
            for element in diagram.all_elements() {
                let findings = self.config.validate_element(element, notation);
                let label = if element.name.is_empty() {
                    element.id.as_str()
                } else {
                    element.name.as_str()
                };
                errors.extend(findings.errors.into_iter().map(|e| format!("{}: {}", label, e)));
                warnings.extend(
                    findings
                        .warnings
                        .into_iter()
                        .map(|w| format!("{}: {}", label, w)),
                );
            }
        }

        ValidationReport::from_findings(errors, warnings)
    }

    /// Handle the validate command
    fn validate_command(&self, input: Option<PathBuf>, verbose: bool) -> Result<()> {
        let content = self.read_input(input)?;
        let diagram = self.load_diagram(&content)?;
        if verbose {
            eprintln!("Checking diagram {}", diagram.id);
        }

        let report = self.check(&diagram);
        for error in &report.errors {
            println!("error: {}", error);
        }
        for warning in &report.warnings {
            println!("warning: {}", warning);
        }

        let notation = diagram
            .notation
            .map(|n| n.to_string())
            .unwrap_or_else(|| "untyped".to_string());
        if report.is_valid {
            println!("✓ Valid {} diagram", notation);
            Ok(())
        } else {
            println!("✗ Invalid {} diagram", notation);
            bail!("{} validation error(s)", report.errors.len())
        }
    }

    /// Empty diagram of a notation, with one element per requested stencil
    pub fn build_new(
        &self,
        notation: Notation,
        name: Option<String>,
        stencils: &[String],
    ) -> Result<Diagram> {
        if !self.config.is_enabled(notation) {
            bail!("Notation '{}' is disabled", notation);
        }

        let mut diagram = Diagram::create_new(notation);
        if let Some(name) = name {
            diagram.rename(name);
        }
        for (i, stencil) in stencils.iter().enumerate() {
            let mut element = self.config.create_element(notation, stencil)?;
            let origin = element.position;
            element.move_to(Point::new(origin.x + 160.0 * i as f64, origin.y))?;
            debug!(stencil = %stencil, element_id = %element.id, "Placing stencil");
            diagram.add_element(element)?;
        }
        Ok(diagram)
    }

    /// Handle the new command
    fn new_command(
        &self,
        notation: Notation,
        name: Option<String>,
        stencils: &[String],
        output: Option<PathBuf>,
        format: OutputFormat,
    ) -> Result<()> {
        let diagram = self.build_new(notation, name, stencils)?;
        let content = match format {
            OutputFormat::Xml => self.orchestrator.export(&diagram)?,
            OutputFormat::Json => diagram.to_json()?,
        };
        self.write_output(output, &content)
    }

    /// Handle the notations command
    pub fn notations_command(&self, json: bool) -> Result<()> {
        let available = self.config.available_notations();

        if json {
            println!("{}", serde_json::to_string_pretty(&available)?);
            return Ok(());
        }

        println!("Available notations:");
        for settings in &available {
            println!("  {:<5} - {}", settings.notation.as_str(), settings.name);
            for (key, shape) in &settings.shapes {
                println!("          {:<20} {}", key, shape.label);
            }
        }
        println!();
        println!("Total: {} notation(s) available", available.len());
        Ok(())
    }

    /// Handle the list command
    fn list_command(&self, json: bool) -> Result<()> {
        let diagrams = self.service()?.list_diagrams()?;

        if json {
            let entries: Vec<ListEntry<'_>> = diagrams
                .iter()
                .map(|d| ListEntry {
                    id: &d.id,
                    notation: d.notation,
                    name: &d.name,
                    elements: d.all_elements().len(),
                    modified_at: d.modified_at().to_rfc3339(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
            return Ok(());
        }

        if diagrams.is_empty() {
            println!("No diagrams in {}", self.store.display());
            return Ok(());
        }
        for diagram in diagrams {
            let notation = diagram
                .notation
                .map(|n| n.to_string())
                .unwrap_or_default();
            println!("{}\t{}\t{}", diagram.id, notation, diagram.name);
        }
        Ok(())
    }

    /// Handle the delete command
    fn delete_command(&self, id: &str) -> Result<()> {
        if self.service()?.delete_diagram(id)? {
            println!("Deleted {}", id);
            Ok(())
        } else {
            Err(anyhow!("Diagram with ID {} not found", id))
        }
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                let mut stdout = io::stdout();
                stdout.write_all(content.as_bytes())?;
                if !content.is_empty() && !content.ends_with('\n') {
                    stdout.write_all(b"\n")?;
                }
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

impl Default for ProcessmapApp {
    fn default() -> Self {
        Self::new()
    }
}
