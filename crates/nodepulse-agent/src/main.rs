// ============================================
// File: crates/nodepulse-agent/src/main.rs
// ============================================
//! # nodepulse Entry Point
//!
//! ## Creation Reason
//! Main entry point for the `nodepulse` binary.
//! Handles CLI parsing, logging setup, and supervisor startup.
//!
//! ## Usage
//! ```bash
//! nodepulse run -c nodepulse.toml            # keep the node alive
//! nodepulse run --identity config.json       # legacy identity file
//! nodepulse status -c nodepulse.toml         # one-shot status report
//! nodepulse validate -c nodepulse.toml       # check the config
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Ctrl+C and SIGTERM both trigger graceful shutdown
//! - A missing config file means defaults; identity then comes from
//!   `--identity` or `./config.json`
//!
//! ## Last Modified
//! v0.1.0 - Initial CLI implementation

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nodepulse_agent::lifecycle::session_age;
use nodepulse_agent::{AgentConfig, Reporter, Scheduler, ShutdownHandle, Supervisor};
use nodepulse_client::{HttpNodeApi, NodeApi};

// ============================================
// CLI Definition
// ============================================

/// Node session keep-alive agent
#[derive(Parser, Debug)]
#[command(name = "nodepulse")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the agent until interrupted
    Run {
        /// Path to configuration file
        #[arg(short, long, default_value = "nodepulse.toml")]
        config: PathBuf,

        /// Legacy JSON identity file (overrides the [node] section)
        #[arg(long)]
        identity: Option<PathBuf>,
    },

    /// Fetch and print the node status once
    Status {
        /// Path to configuration file
        #[arg(short, long, default_value = "nodepulse.toml")]
        config: PathBuf,

        /// Legacy JSON identity file (overrides the [node] section)
        #[arg(long)]
        identity: Option<PathBuf>,
    },

    /// Validate configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long, default_value = "nodepulse.toml")]
        config: PathBuf,
    },
}

// ============================================
// Main
// ============================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config, identity } => cmd_run(config, identity).await,
        Commands::Status { config, identity } => cmd_status(config, identity).await,
        Commands::Validate { config } => cmd_validate(config).await,
    };

    if let Err(e) = result {
        init_logging("info");
        error!("{:#}", e);
        std::process::exit(1);
    }
}

// ============================================
// Commands
// ============================================

/// Runs the supervisor until shutdown.
async fn cmd_run(config_path: PathBuf, identity: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_or_default_config(&config_path).await?;
    init_logging(&config.logging.level);

    let identity = config.resolve_identity(identity.as_deref()).await?;
    let node_id = identity.node_id.clone();
    let api = HttpNodeApi::new(identity, &config.api.client_options())?;

    info!("════════════════════════════════════════");
    info!("Node ID:    {}", node_id);
    info!("API:        {}", config.api.base_url);
    info!("════════════════════════════════════════");

    let reporter = Reporter::new(config.logging.dump_error_bodies);
    let scheduler = Scheduler::new(
        Arc::new(api),
        node_id,
        reporter.clone(),
        config.schedule.clone(),
    );
    let supervisor = Supervisor::new(
        scheduler,
        reporter,
        config.schedule.restart_delay(),
        config.schedule.shutdown_grace(),
    );

    let signals = tokio::spawn(wait_for_signal(supervisor.shutdown_handle()));
    supervisor.run().await;
    signals.abort();

    Ok(())
}

/// Fetches the node status once.
async fn cmd_status(config_path: PathBuf, identity: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_or_default_config(&config_path).await?;
    init_logging(&config.logging.level);

    let identity = config.resolve_identity(identity.as_deref()).await?;
    let api = HttpNodeApi::new(identity, &config.api.client_options())?;
    let reporter = Reporter::new(config.logging.dump_error_bodies);

    match api.fetch_status().await {
        Ok(status) => {
            let age = session_age(&status, chrono::Utc::now()).ok();
            reporter.status(&status, age);
            Ok(())
        }
        Err(e) => {
            reporter.client_failure("Status check", &e);
            Err(e.into())
        }
    }
}

/// Validates configuration file.
async fn cmd_validate(config_path: PathBuf) -> anyhow::Result<()> {
    if !config_path.exists() {
        println!("⚠️  Config file not found: {}", config_path.display());
        println!("   Agent will use default values.");
        return Ok(());
    }

    let config = AgentConfig::load(&config_path).await?;

    println!("✅ Configuration is valid");
    println!();
    println!("API:");
    println!("   Base URL:   {}", config.api.base_url);
    println!("   Timeout:    {}s", config.api.request_timeout_secs);
    println!();
    println!("Schedule:");
    println!("   Ping:            {}s", config.schedule.ping_interval_secs);
    println!("   Status:          {}s", config.schedule.status_interval_secs);
    println!("   Session Refresh: {}s", config.schedule.session_refresh_interval_secs);
    println!("   Restart Delay:   {}s", config.schedule.restart_delay_secs);
    println!();
    match config.resolve_identity(None).await {
        Ok(identity) => println!("Identity:   {}", identity.node_id.short()),
        Err(e) => println!("Identity:   ⚠️  {}", e),
    }
    println!();

    Ok(())
}

// ============================================
// Helper Functions
// ============================================

/// Initializes the tracing subscriber.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init()
        .ok();
}

/// Loads config, or defaults when the file does not exist.
async fn load_or_default_config(path: &Path) -> anyhow::Result<AgentConfig> {
    if path.exists() {
        Ok(AgentConfig::load(path).await?)
    } else {
        Ok(AgentConfig::default())
    }
}

/// Triggers shutdown on Ctrl+C or SIGTERM.
async fn wait_for_signal(handle: ShutdownHandle) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C"),
        () = terminate => info!("Received SIGTERM"),
    }

    handle.shutdown();
}
