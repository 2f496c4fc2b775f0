//! simfix - launch and tear down simulator fixtures from the command line

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::warn;

use sim_fixture::config::FixtureConfig;
use sim_fixture::engine::{ContainerEngine, DockerEngine};
use sim_fixture::logging::init_logging;
use sim_fixture::network::{IdSource, Network, Service};
use sim_fixture::runner::{Fixture, StepReport, StepStatus};

/// Config file used when a command needs one and `-c` is not given
const DEFAULT_CONFIG: &str = "simfix.yaml";

/// simfix - simulator containers for integration tests
#[derive(Parser)]
#[command(name = "simfix")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Launch and tear down simulator fixtures", long_about = None)]
struct Cli {
    /// Fixture configuration file (YAML or TOML), simfix.yaml when required
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and show the resolved simulator image
    Check,

    /// Set up the simulator, wait, then tear it down
    Run {
        /// Tear down after this many seconds instead of waiting for Ctrl-C
        #[arg(long)]
        hold: Option<u64>,

        /// Leave the container and image in place
        #[arg(long)]
        keep: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: String,
    },

    /// Manage fixture networks
    Network {
        #[command(subcommand)]
        action: NetworkAction,
    },

    /// Manage fixture services
    Service {
        #[command(subcommand)]
        action: ServiceAction,
    },
}

#[derive(Subcommand)]
enum NetworkAction {
    /// Create a bridge network, using the configured IPAM pool if any
    Create,

    /// Remove a network by ID
    Rm { id: String },
}

#[derive(Subcommand)]
enum ServiceAction {
    /// Create a service running an image
    Create {
        /// Image reference
        #[arg(long)]
        image: String,

        /// Network ID to attach to
        #[arg(long)]
        network: Option<String>,
    },

    /// Remove a service by ID
    Rm { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref(), config_file_required(&cli.command))?;
    init_logging(&config.log_level)?;

    match cli.command {
        Commands::Check => check(&config),
        Commands::Run { hold, keep, output } => run(&config, hold, keep, &output).await,
        Commands::Network { action } => {
            let engine = connect(&config)?;
            match action {
                NetworkAction::Create => {
                    let network = Network::create(
                        engine.as_ref(),
                        IdSource::global(),
                        config.network.ipam_pool.as_ref(),
                    )
                    .await?;
                    println!("{} {} ({})", "Network:".bright_cyan(), network.name, network.id);
                }
                NetworkAction::Rm { id } => {
                    let network = Network {
                        name: id.clone(),
                        id,
                    };
                    network.remove(engine.as_ref()).await?;
                    println!("{} {}", "Removed network".green(), network.id);
                }
            }
            Ok(())
        }
        Commands::Service { action } => {
            let engine = connect(&config)?;
            match action {
                ServiceAction::Create { image, network } => {
                    let network = network.map(|id| Network {
                        name: id.clone(),
                        id,
                    });
                    let service = Service::create(
                        engine.as_ref(),
                        IdSource::global(),
                        &image,
                        network.as_ref(),
                    )
                    .await?;
                    println!("{} {} ({})", "Service:".bright_cyan(), service.name, service.id);
                }
                ServiceAction::Rm { id } => {
                    let service = Service {
                        name: id.clone(),
                        id,
                    };
                    service.remove(engine.as_ref()).await?;
                    println!("{} {}", "Removed service".green(), service.id);
                }
            }
            Ok(())
        }
    }
}

/// Commands that read simulator or network settings from the file
fn config_file_required(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Check
            | Commands::Run { .. }
            | Commands::Network {
                action: NetworkAction::Create
            }
    )
}

fn load_config(path: Option<&Path>, required: bool) -> Result<FixtureConfig> {
    let path = match path {
        Some(path) => path,
        None if required => Path::new(DEFAULT_CONFIG),
        None => return FixtureConfig::from_env(),
    };
    FixtureConfig::load(path).with_context(|| format!("Failed to load config {}", path.display()))
}

fn connect(config: &FixtureConfig) -> Result<Arc<dyn ContainerEngine>> {
    let engine = DockerEngine::connect(config.docker_socket.as_deref())
        .context("Failed to connect to container engine")?;
    Ok(Arc::new(engine))
}

fn check(config: &FixtureConfig) -> Result<()> {
    let image_ref = config.simulator.image_ref()?;
    let name = config.simulator.container_name()?;

    println!("{} {}", "Image:".bright_cyan(), image_ref);
    println!("{} {}", "Container:".bright_cyan(), name);
    println!(
        "{} {}",
        "Start request:".bright_cyan(),
        if config.start.enabled {
            format!("http://{}:{}/simulator", config.start.sim_ip, config.start.sim_port).normal()
        } else {
            "disabled".dimmed()
        }
    );
    println!("{} {}", "Cleanup:".bright_cyan(), config.cleanup);

    Ok(())
}

async fn run(config: &FixtureConfig, hold: Option<u64>, keep: bool, output: &str) -> Result<()> {
    let engine = connect(config)?;
    let mut fixture = Fixture::simulator(engine, config).with_cleanup(config.cleanup && !keep);

    if let Err(err) = fixture.setup().await {
        // Roll back whatever did start before reporting the failure
        if let Err(cleanup_err) = fixture.teardown().await {
            warn!(error = %cleanup_err, "Teardown after failed setup also failed");
        }
        print_reports(fixture.reports(), output)?;
        return Err(err).context("Fixture setup failed");
    }

    println!("{}", "Simulator is up".green().bold());
    wait(hold).await?;

    let result = fixture.teardown().await;
    print_reports(fixture.reports(), output)?;
    result.context("Fixture teardown failed")
}

async fn wait(hold: Option<u64>) -> Result<()> {
    match hold {
        Some(secs) => {
            println!("Holding for {}s (Ctrl-C to stop early)", secs);
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                res = tokio::signal::ctrl_c() => res?,
            }
        }
        None => {
            println!("Press Ctrl-C to tear down");
            tokio::signal::ctrl_c().await?;
        }
    }
    Ok(())
}

fn print_reports(reports: &[StepReport], output: &str) -> Result<()> {
    if output == "json" {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }

    println!("{}", "=".repeat(60).bright_blue());
    for report in reports {
        let status = match report.status {
            StepStatus::Passed => "PASS".green(),
            StepStatus::Failed => "FAIL".red(),
            StepStatus::Skipped => "SKIP".yellow(),
        };
        println!(
            "{} {:<9} {} [{}] {}ms",
            status,
            report.phase.as_str(),
            report.description,
            report.component,
            report.duration_ms
        );
        if let Some(ref error) = report.error {
            println!("     {}", error.red());
        }
    }
    println!("{}", "=".repeat(60).bright_blue());

    Ok(())
}
