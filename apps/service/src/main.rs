mod notifier;
mod output;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use portwatch::validation::parse_port;
use portwatch::{
    AlertNotifier, Config, FileBlobStore, Identity, Registry, ResourceDraft, ResourceStore,
    SweepEngine, SweepOutcome, SweepScheduler, SweepTrigger, TcpProber,
};
use tracing::info;

use notifier::TerminalNotifier;

#[derive(Parser, Debug)]
#[command(name = "portwatch")]
#[command(about = "Watch TCP endpoints and get told when they go down")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show every registered resource and its latest status
    List {
        /// Print the stored records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Register a resource and probe it once
    Add(EndpointArgs),
    /// Replace the resource at INDEX (as shown by `list`)
    Edit {
        index: usize,
        #[command(flatten)]
        endpoint: EndpointArgs,
    },
    /// Remove a resource
    Delete {
        url: String,
        #[arg(required_unless_present = "all_ports")]
        port: Option<String>,
        /// Remove every resource on this host
        #[arg(long, conflicts_with = "port")]
        all_ports: bool,
    },
    /// Probe every resource now
    Check,
    /// Probe every resource on a schedule until interrupted
    Watch {
        /// Seconds between sweeps, overrides sweep.interval_seconds
        #[arg(short, long)]
        interval: Option<u64>,
    },
    /// Print the effective configuration
    Config,
    /// Drop every stored resource
    Reset,
}

#[derive(Args, Debug)]
struct EndpointArgs {
    /// Hostname or address
    url: String,
    /// TCP port, defaults to the conventional port of --type
    #[arg(short, long, allow_negative_numbers = true)]
    port: Option<i64>,
    /// Protocol label, inferred from the port when omitted
    #[arg(short = 't', long = "type")]
    kind: Option<String>,
}

impl EndpointArgs {
    fn draft(&self) -> ResourceDraft {
        ResourceDraft { url: self.url.clone(), kind: self.kind.clone(), port: self.port }
    }
}

/// Everything a command may need, wired from the configuration
struct App {
    config: Config,
    store: Arc<ResourceStore>,
    engine: Arc<SweepEngine>,
    registry: Registry,
}

impl App {
    fn new(config: Config) -> Self {
        let blob = Arc::new(FileBlobStore::new(&config.storage.data_dir));
        let store = Arc::new(ResourceStore::new(blob).with_history_limit(config.history.limit));
        let prober = Arc::new(TcpProber::new(config.probe_timeout()));
        let notifier: Arc<dyn AlertNotifier> = Arc::new(TerminalNotifier::default());

        let engine = Arc::new(
            SweepEngine::new(store.clone(), prober.clone(), notifier.clone())
                .with_concurrency(config.sweep.concurrency),
        );
        let registry = Registry::new(store.clone(), prober, notifier);

        Self { config, store, engine, registry }
    }

    async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::List { json } => self.list(json).await,
            Commands::Add(endpoint) => self.submit(&endpoint, None).await,
            Commands::Edit { index, endpoint } => self.submit(&endpoint, Some(index)).await,
            Commands::Delete { url, port, all_ports } => self.delete(&url, port, all_ports).await,
            Commands::Check => self.check().await,
            Commands::Watch { interval } => self.watch(interval).await,
            Commands::Config => {
                print!("{}", self.config);
                Ok(())
            }
            Commands::Reset => {
                self.store.clear().await.context("Failed to reset the resource store")?;
                println!("All resources removed");
                Ok(())
            }
        }
    }

    async fn list(&self, json: bool) -> Result<()> {
        let resources = self.store.list().await;
        if json {
            println!("{}", serde_json::to_string_pretty(&resources)?);
        } else {
            print!("{}", output::resource_table(&resources));
        }
        Ok(())
    }

    async fn submit(&self, endpoint: &EndpointArgs, index: Option<usize>) -> Result<()> {
        let submission = self
            .registry
            .submit(&endpoint.draft(), index)
            .await
            .with_context(|| format!("Failed to save {}", endpoint.url))?;

        let resource = &submission.resource;
        println!(
            "{} {} ({}), currently {}",
            submission.action,
            resource.identity(),
            resource.kind,
            if resource.status { "up" } else { "down" }
        );
        Ok(())
    }

    async fn delete(&self, url: &str, port: Option<String>, all_ports: bool) -> Result<()> {
        let removed = match (port, all_ports) {
            (_, true) => self.store.delete_host(url).await?,
            (Some(port), false) => {
                let port = parse_port(&port)?;
                self.store.delete(&Identity::new(url, port)).await?
            }
            (None, false) => bail!("Either a port or --all-ports is required"),
        };

        println!("Removed {removed} resource(s)");
        Ok(())
    }

    async fn check(&self) -> Result<()> {
        match self.engine.run_sweep(SweepTrigger::UserInitiated).await {
            SweepOutcome::Completed(report) => println!("{}", output::sweep_summary(&report)),
            SweepOutcome::Skipped => println!("A sweep is already running"),
        }
        print!("{}", output::resource_table(&self.store.list().await));
        Ok(())
    }

    async fn watch(&self, interval: Option<u64>) -> Result<()> {
        let period = match interval {
            Some(0) => bail!("--interval must be greater than 0"),
            Some(secs) => Duration::from_secs(secs),
            None => self.config.sweep_interval(),
        };

        println!("Watching every {}s, press Ctrl-C to stop", period.as_secs());
        let scheduler = SweepScheduler::new(self.engine.clone(), period);
        let sweeps = scheduler
            .run_until(async {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %err, "Failed to listen for Ctrl-C");
                }
            })
            .await;

        info!(sweeps, "Watch stopped");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init();

    let config = Config::from_config(cli.config.as_ref()).context("Failed to load configuration")?;
    App::new(config).run(cli.command).await
}
