//! The sqforge CLI
//!
//! Generates SQLDelight `.sq` files from a declaration manifest.
//!
//! # Usage
//!
//! ```bash
//! # Generate into ./build/generated
//! sqforge generate schema.json -o build/generated
//!
//! # Dry run (print the SQL only)
//! sqforge generate schema.json --dry-run
//!
//! # Check the DDL against SQLite first
//! sqforge generate schema.json --verify
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use sqforge::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqforge")]
#[command(version)]
#[command(about = "Generate SQLDelight .sq files from annotated declarations", long_about = None)]
#[command(after_help = "EXAMPLES:
    sqforge generate schema.json -o build/generated
    sqforge explain schema.json --format json
    sqforge normalize 'SELECT * FROM user WHERE id = :id'")]
struct Cli {
    /// Configuration file (defaults to ./sqforge.toml, then the user config dir)
    #[arg(short, long, global = true, env = "SQFORGE_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate .sq files for every declaration in a manifest
    Generate {
        /// Declaration manifest (.json or .toml)
        manifest: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Don't write anything, just print the generated SQL
        #[arg(long)]
        dry_run: bool,

        /// Apply the generated DDL to an in-memory SQLite database first
        #[arg(long)]
        verify: bool,
    },
    /// Show the models extracted from a manifest
    Explain {
        /// Declaration manifest (.json or .toml)
        manifest: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Normalize a query the way Query directives are normalized
    Normalize {
        /// The SQL to normalize
        sql: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "sqforge=debug" } else { "sqforge=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Generate {
            manifest,
            out,
            dry_run,
            verify,
        } => generate(cli, manifest, out, *dry_run, *verify).await,
        Commands::Explain { manifest, format } => explain(cli, manifest, format),
        Commands::Normalize { sql } => {
            println!("{}", normalize_sql(sql));
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::discover()?,
    };
    Ok(config)
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    Catalog::load(path).with_context(|| format!("Failed to load manifest {}", path.display()))
}

async fn generate(
    cli: &Cli,
    manifest: &Path,
    out: &Path,
    dry_run: bool,
    verify: bool,
) -> Result<()> {
    let config = load_config(cli)?;
    let catalog = load_catalog(manifest)?;

    if cli.verbose {
        println!("{} {}", "Manifest:".dimmed(), manifest.display().to_string().yellow());
    }

    let processor = Processor::new(config);
    let outcome = processor.process(&catalog);

    for failure in &outcome.failures {
        eprintln!(
            "{} {}: {}",
            "✗".red(),
            failure.declaration.yellow(),
            failure.error
        );
    }

    if verify {
        verify_schema(&outcome.files).await?;
        println!("{} Schema applies cleanly to SQLite", "✓".green());
    }

    if dry_run {
        for file in &outcome.files {
            let path = file.relative_path(processor.config());
            println!("{}", format!("-- {}", path.display()).dimmed());
            println!("{}", file.text.white());
        }
    } else {
        let written = write_all(&outcome.files, out, processor.config())
            .with_context(|| format!("Failed to write into {}", out.display()))?;
        println!(
            "{} {} file(s) generated, {} written to {}",
            "✓".green(),
            outcome.files.len().to_string().cyan(),
            written.to_string().cyan(),
            out.display()
        );
    }

    if !outcome.is_success() {
        bail!("{} declaration(s) failed", outcome.failures.len());
    }
    Ok(())
}

fn explain(cli: &Cli, manifest: &Path, format: &OutputFormat) -> Result<()> {
    let config = load_config(cli)?;
    let catalog = load_catalog(manifest)?;
    let explanation = Processor::new(config).explain(&catalog);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&explanation.to_json()?)?);
        }
        OutputFormat::Table => {
            for (name, model) in &explanation.entities {
                print_entity(name, model);
            }
            for (name, statements) in &explanation.daos {
                print_dao(name, statements);
            }
            for failure in &explanation.failures {
                eprintln!(
                    "{} {}: {}",
                    "✗".red(),
                    failure.declaration.yellow(),
                    failure.error
                );
            }
        }
    }

    if !explanation.failures.is_empty() {
        bail!("{} declaration(s) failed", explanation.failures.len());
    }
    Ok(())
}

fn print_entity(name: &str, model: &EntityModel) {
    println!("{} {}", "Entity".green().bold(), name.cyan());
    println!("  {} {}", "Table:".dimmed(), model.table_name.white());
    println!("  {}", "Columns:".dimmed());
    for col in &model.columns {
        let mut flags = Vec::new();
        if !col.nullable {
            flags.push("NOT NULL");
        }
        if col.auto_increment {
            flags.push("AUTOINCREMENT");
        }
        println!(
            "    • {:20} {:8} {}",
            col.name.white(),
            col.sql_type.to_string().yellow(),
            flags.join(" ").dimmed()
        );
    }
    if let Some(pk) = &model.primary_key {
        let auto = if pk.auto_generate { " (auto)" } else { "" };
        println!("  {} {}{}", "Primary key:".dimmed(), pk.columns.join(", ").white(), auto);
    }
    for index in &model.indices {
        let unique = if index.unique { "unique " } else { "" };
        println!(
            "  {} {}{} ({})",
            "Index:".dimmed(),
            unique,
            index.resolved_name(&model.table_name).white(),
            index.columns.join(", ")
        );
    }
    println!();
}

fn print_dao(name: &str, statements: &[SqlStatement]) {
    println!("{} {}", "DAO".green().bold(), name.cyan());
    for statement in statements {
        let kind = match statement {
            SqlStatement::Query { .. } => "Query",
            SqlStatement::Insert { replace: true, .. } => "Insert (replace)",
            SqlStatement::Insert { .. } => "Insert",
            SqlStatement::Delete { .. } => "Delete",
            SqlStatement::Update { .. } => "Update",
            SqlStatement::Upsert { .. } => "Upsert",
        };
        println!("  [{}] {}", kind.cyan(), statement.name().white());
        for line in statement.to_sql().lines().skip(1) {
            println!("      {}", line.dimmed());
        }
    }
    println!();
}
