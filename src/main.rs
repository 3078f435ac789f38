use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use broodline::breed::{child_composition, BreedComponent, BreedComposition};
use broodline::{common, plan, plan_execution};

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dry-run an import plan and print the per-file report
    Check {
        #[clap(short, long)]
        plan: String,
    },
    /// Write a starter import plan
    Init {
        #[clap(short, long)]
        plan: String,
    },
    /// Compute a child's breed composition from its parents
    Child {
        /// Sire composition, e.g. "Kelso=50,Sweater=50"
        #[clap(short, long)]
        sire: Option<String>,
        /// Dam composition, e.g. "Hatch=100"
        #[clap(short, long)]
        dam: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    match args.command {
        Commands::Check { plan } => {
            info!("Checking plan: {}", plan);
            let reports = plan_execution::execute_plan(&plan).await?;
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        Commands::Init { plan } => {
            info!("Initializing plan: {}", plan);
            let plan_file_path = plan;
            let plan = plan::Plan::default();
            let serialized_plan = serde_yaml::to_string(&plan)?;
            common::write_string_to_file(&plan_file_path, &serialized_plan)?;
        }
        Commands::Child { sire, dam } => {
            let sire = sire.as_deref().map(parse_composition).transpose()?;
            let dam = dam.as_deref().map(parse_composition).transpose()?;
            let child = child_composition(sire.as_ref(), dam.as_ref());
            println!("{}", serde_json::to_string_pretty(&child)?);
        }
    }

    Ok(())
}

/// Parse a "Breed=pct,Breed=pct" argument into a composition.
fn parse_composition(raw: &str) -> Result<BreedComposition> {
    let mut components = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (breed, pct) = part
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Expected 'Breed=pct', got '{}'", part))?;
        let percentage: u32 = pct
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid percentage '{}' for '{}'", pct.trim(), breed.trim()))?;
        components.push(BreedComponent::new(breed.trim(), percentage));
    }
    Ok(BreedComposition::new(components))
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level.to_string()))
        .without_time()
        .init();
}
