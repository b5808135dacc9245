//! attribution-tools: open source attribution document generator
//!
//! Turns a catalog snapshot of a product into an attribution notice.

#![allow(clippy::struct_excessive_bools, clippy::needless_pass_by_value)]

use anyhow::{Context, Result};
use attribution_tools::{
    attribution::ItemFilter,
    cli,
    config::{
        AppConfig, AttributionConfig, CheckLicenseConfig, ExpressionSyntax, GenerateConfig,
        LicensingConfig, OutputConfig, TocMode, DEFAULT_MAX_DEPTH,
    },
    pipeline::exit_codes,
    reports::ReportFormat,
};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "attribution-tools")]
#[command(version)]
#[command(about = "Generate open source attribution documents", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success
    1  Rejected options or license expression
    3  Error occurred

EXAMPLES:
    # HTML notice for the direct components of a product
    attribution-tools generate snapshot.json -O notice.html

    # Full hierarchy with a nested table of contents grouped by feature
    attribution-tools generate snapshot.json --expand-subcomponents --toc nested --group-by-feature

    # Check an expression against the licenses the snapshot provides
    attribution-tools check-license \"mit OR apache-2.0\" --snapshot snapshot.json")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `generate` subcommand
#[derive(Parser)]
struct GenerateArgs {
    /// Path to the product snapshot (JSON, or YAML by extension)
    snapshot: PathBuf,

    /// Output format
    #[arg(short, long)]
    output: Option<ReportFormat>,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Syntax of license expressions in the snapshot
    #[arg(long)]
    syntax: Option<ExpressionSyntax>,

    /// Include custom (non-catalog) relationships
    #[arg(long)]
    include_custom: bool,

    /// Include package relationships
    #[arg(long)]
    include_packages: bool,

    /// Expand the subcomponent hierarchy
    #[arg(long)]
    expand_subcomponents: bool,

    /// Include license texts referenced at every level
    #[arg(long)]
    all_license_texts: bool,

    /// Table of contents layout
    #[arg(long)]
    toc: Option<TocMode>,

    /// Group entries under feature headers (requires --toc nested)
    #[arg(long)]
    group_by_feature: bool,

    /// Show item homepage URLs
    #[arg(long)]
    homepage_urls: bool,

    /// Show standard license notices
    #[arg(long)]
    standard_notices: bool,

    /// Maximum subcomponent depth below a top-level entry
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_depth: Option<u32>,

    /// Only include component relationships whose item matches PATTERN
    #[arg(long, value_name = "PATTERN", conflicts_with = "package_query")]
    component_query: Option<String>,

    /// Only include package relationships whose item matches PATTERN
    #[arg(long, value_name = "PATTERN")]
    package_query: Option<String>,

    /// Narrow the query by owner
    #[arg(long)]
    query_owner: Option<String>,

    /// Narrow the query by declared license
    #[arg(long)]
    query_license: Option<String>,

    /// Narrow the query by version (exact, or a semver range like ">=2.0, <3")
    #[arg(long)]
    query_version: Option<String>,

    /// Narrow the query to active items
    #[arg(long)]
    query_active_only: bool,
}

impl GenerateArgs {
    fn query(&self, pattern: Option<&String>) -> Option<ItemFilter> {
        pattern.map(|pattern| ItemFilter {
            pattern: Some(pattern.clone()),
            owner: self.query_owner.clone(),
            license: self.query_license.clone(),
            version: self.query_version.clone(),
            active_only: self.query_active_only,
            ..ItemFilter::default()
        })
    }

    /// Options given on the command line, in config-file shape.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            attribution: AttributionConfig {
                include_custom: self.include_custom,
                include_packages: self.include_packages,
                expand_subcomponents: self.expand_subcomponents,
                all_license_texts: self.all_license_texts,
                toc: self.toc.unwrap_or_default(),
                group_by_feature: self.group_by_feature,
                include_homepage_url: self.homepage_urls,
                include_standard_notice: self.standard_notices,
                component_query: self.query(self.component_query.as_ref()),
                package_query: self.query(self.package_query.as_ref()),
                max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
            },
            output: OutputConfig {
                format: self.output.unwrap_or_default(),
                file: self.output_file.clone(),
            },
            licensing: LicensingConfig {
                syntax: self.syntax.unwrap_or_default(),
            },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an attribution document for a product snapshot
    Generate(GenerateArgs),

    /// Check a license expression against the available licenses
    CheckLicense {
        /// Expression to check
        expression: String,

        /// Snapshot providing licenses and approved license choices
        #[arg(long)]
        snapshot: PathBuf,

        /// Restrict the available license keys (comma-separated)
        #[arg(long, value_delimiter = ',')]
        keys: Option<Vec<String>>,

        /// Expression syntax
        #[arg(long)]
        syntax: Option<ExpressionSyntax>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate JSON Schema for the config file format
    ConfigSchema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print the discovered config file
    Path,
    /// Generate an example .attribution-tools.yaml in the current directory
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    match cli.command {
        Commands::Generate(args) => {
            let (app, loaded_from) =
                AppConfig::from_file_with_overrides(cli.config.as_deref(), &args.overrides());
            if let Some(path) = &loaded_from {
                tracing::debug!("Using config file {}", path.display());
            }

            let config = GenerateConfig {
                snapshot_path: args.snapshot,
                attribution: app.attribution,
                output: app.output,
                syntax: app.licensing.syntax,
            };
            exit_with(cli::run_generate(config))
        }

        Commands::CheckLicense {
            expression,
            snapshot,
            keys,
            syntax,
        } => {
            let (app, _) = attribution_tools::config::load_or_default(cli.config.as_deref());
            let config = CheckLicenseConfig {
                expression,
                snapshot_path: snapshot,
                keys,
                syntax: syntax.unwrap_or(app.licensing.syntax),
            };
            exit_with(cli::run_check_license(config))
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "attribution-tools", &mut io::stdout());
            Ok(())
        }

        Commands::ConfigSchema { output } => {
            let schema = attribution_tools::config::generate_json_schema()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
            Ok(())
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let (config, loaded_from) =
                    attribution_tools::config::load_or_default(cli.config.as_deref());
                if let Some(path) = &loaded_from {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults");
                }
                let yaml =
                    serde_yaml_ng::to_string(&config).context("failed to serialize config")?;
                print!("{yaml}");
                Ok(())
            }
            ConfigAction::Path => {
                match attribution_tools::config::discover_config_file(cli.config.as_deref()) {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!("No config file found."),
                }
                Ok(())
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(".attribution-tools.yaml");
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                let content = attribution_tools::config::generate_example_config();
                std::fs::write(&target, content)
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(())
            }
        },
    }
}

/// Exit with the handler's code; errors map to [`exit_codes::ERROR`].
fn exit_with(result: Result<i32>) -> Result<()> {
    match result {
        Ok(exit_codes::SUCCESS) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_codes::ERROR);
        }
    }
}
