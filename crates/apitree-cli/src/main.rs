use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use apitree_core::config::{self, CONFIG_FILE_NAME, IrConfig};
use apitree_core::ir::IrSpec;
use apitree_core::parse::{self, spec::OpenApiSpec};
use apitree_core::transform;

#[derive(Parser)]
#[command(name = "apitree", about = "OpenAPI 3.x to language-neutral IR", version)]
struct Cli {
    /// Config file to use instead of ./.apitree.yaml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump the resolved IR of an OpenAPI document
    Inspect {
        /// Path to the OpenAPI document (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,

        /// Print only the route tree and type names
        #[arg(long)]
        summary: bool,
    },

    /// Resolve a document and report every component or route that fails
    Validate {
        /// Path to the OpenAPI document
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<ExitCode> {
    env_logger::init();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

    match cli.command {
        Commands::Inspect {
            input,
            format,
            summary,
        } => cmd_inspect(&input, &config_path, format, summary).map(|()| ExitCode::SUCCESS),

        Commands::Validate { input } => cmd_validate(&input, &config_path),

        Commands::Init { force } => cmd_init(&config_path, force).map(|()| ExitCode::SUCCESS),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "apitree", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Load the config file if it exists.
fn load_config(path: &Path) -> Result<Option<IrConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = IrConfig::from_yaml(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(Some(config))
}

fn read_spec(path: &Path) -> Result<OpenApiSpec> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let parsed = match ext {
        "json" => parse::from_json(&content),
        _ => parse::from_yaml(&content),
    };
    parsed.with_context(|| format!("failed to parse {}", path.display()))
}

fn load_ir(input: &Path, config_path: &Path) -> Result<IrSpec> {
    let cfg = load_config(config_path)?.unwrap_or_default();
    let spec = read_spec(input)?;
    let ir = transform::transform_with_config(&spec, &cfg)
        .with_context(|| format!("failed to transform {}", input.display()))?;
    Ok(ir)
}

fn cmd_inspect(
    input: &Path,
    config_path: &Path,
    format: InspectFormat,
    summary: bool,
) -> Result<()> {
    let ir = load_ir(input, config_path)?;

    if summary {
        print!("{}", outline(&ir));
        return Ok(());
    }

    match format {
        InspectFormat::Yaml => print!("{}", serde_yaml_ng::to_string(&ir)?),
        InspectFormat::Json => println!("{}", serde_json::to_string_pretty(&ir)?),
    }
    Ok(())
}

/// An indented outline of the route tree followed by the assigned type names.
fn outline(ir: &IrSpec) -> String {
    let mut out = format!("{}\n", ir.root.name);
    for route in &ir.root.routes {
        out.push_str(&format!(
            "  {} {} ({})\n",
            route.method.as_str(),
            route.path,
            route.operation_id
        ));
    }
    let mut stack: Vec<(usize, &apitree_core::ir::Api)> =
        ir.root.apis.iter().rev().map(|api| (1, api)).collect();
    while let Some((depth, api)) = stack.pop() {
        let indent = "  ".repeat(depth);
        out.push_str(&format!("{indent}{}/\n", api.name));
        for route in &api.routes {
            out.push_str(&format!(
                "{indent}  {} {} ({})\n",
                route.method.as_str(),
                route.path,
                route.operation_id
            ));
        }
        stack.extend(api.nested.iter().rev().map(|nested| (depth + 1, nested)));
    }
    out.push_str("types:\n");
    for (_, entry) in ir.names.iter() {
        out.push_str(&format!("  {} <- {}\n", entry.identifier, entry.context));
    }
    out
}

fn cmd_validate(input: &Path, config_path: &Path) -> Result<ExitCode> {
    let ir = load_ir(input, config_path)?;

    eprintln!("{} {}", ir.info.title, ir.info.version);
    eprintln!("  Models: {}", ir.models.len());
    eprintln!("  Named types: {}", ir.names.len());
    eprintln!("  Routes: {}", ir.root.all_routes().len());

    if ir.report.is_empty() {
        eprintln!("Validation successful.");
        return Ok(ExitCode::SUCCESS);
    }

    eprintln!("{} unit(s) failed to resolve:", ir.report.len());
    for entry in ir.report.entries() {
        eprintln!("  {entry}");
    }
    Ok(ExitCode::FAILURE)
}

fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    log::info!("wrote default config to {}", config_path.display());
    eprintln!("Created {}", config_path.display());
    Ok(())
}
