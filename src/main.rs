//! Coinbot CLI
//!
//! Runs the bot over the console transport, serves the dashboard, and
//! performs the out-of-band promo administration.

use clap::{Parser, Subcommand};
use coinbot::{
    bot::{transport, BotRouter, ConsoleTransport},
    config::{CoinbotConfig, ConfigLoader},
    dashboard::{shutdown_signal, DashboardServer},
    errors::CoinbotResult,
    ledger::normalize_code,
    Coordinator, Ledger,
};
use std::{path::PathBuf, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coinbot")]
#[command(about = "Coin ledger chat bot with game advice and a read-only dashboard")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot on stdin/stdout, plus the dashboard when enabled
    Run,

    /// Serve only the dashboard
    Dashboard,

    /// Manage promo codes
    Promo {
        #[command(subcommand)]
        action: PromoAction,
    },

    /// Print every user record
    Users,

    /// Write the effective configuration to a TOML file
    InitConfig {
        /// Destination path
        #[arg(default_value = "coinbot.toml")]
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum PromoAction {
    /// Add or replace a promo code
    Add { code: String, reward: i64 },

    /// Remove a promo code
    Remove { code: String },

    /// List all promo codes
    List,
}

#[tokio::main]
async fn main() -> CoinbotResult<()> {
    let cli = Cli::parse();

    let loader = match &cli.config {
        Some(path) => ConfigLoader::new().with_path(path),
        None => ConfigLoader::new(),
    };
    let config = loader.load()?;

    init_tracing(&config);

    match cli.command {
        Commands::Run => run_bot(config).await,
        Commands::Dashboard => run_dashboard(config).await,
        Commands::Promo { action } => manage_promos(&config, action),
        Commands::Users => print_users(&config),
        Commands::InitConfig { path } => {
            loader.save(&config, &path.to_string_lossy())?;
            println!("Wrote configuration to {}", path.display());
            Ok(())
        }
    }
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(config: &CoinbotConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("coinbot={0},tower_http={0}", config.monitoring.log_level.as_filter())));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_bot(config: CoinbotConfig) -> CoinbotResult<()> {
    let ledger = Arc::new(Ledger::open(&config)?);
    if config.bot.admin_id.is_none() {
        warn!("No admin_id configured, /bonus is disabled");
    }

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let dashboard = if config.dashboard.enabled {
        let server = DashboardServer::new(config.dashboard.clone(), ledger.reader());
        Some(tokio::spawn(server.run_until(async move {
            tokio::select! {
                _ = stop_rx => {}
                _ = shutdown_signal() => {}
            }
        })))
    } else {
        None
    };

    let coordinator = Arc::new(Coordinator::new(Arc::clone(&ledger), &config));
    let router = Arc::new(BotRouter::new(coordinator));
    info!(data_dir = %config.storage.data_directory, "Coinbot ready, reading `<user_id> <text>` lines from stdin");

    let result = tokio::select! {
        result = transport::run(router, ConsoleTransport::stdio()) => result,
        _ = shutdown_signal() => Ok(()),
    };

    let _ = stop_tx.send(());
    if let Some(handle) = dashboard {
        match handle.await {
            Ok(Err(e)) => warn!(error = %e, "Dashboard exited with error"),
            Err(e) => warn!(error = %e, "Dashboard task failed"),
            Ok(Ok(())) => {}
        }
    }

    result
}

async fn run_dashboard(config: CoinbotConfig) -> CoinbotResult<()> {
    let ledger = Arc::new(Ledger::open(&config)?);
    DashboardServer::new(config.dashboard.clone(), ledger.reader()).run().await
}

fn manage_promos(config: &CoinbotConfig, action: PromoAction) -> CoinbotResult<()> {
    let ledger = Ledger::open(config)?;

    match action {
        PromoAction::Add { code, reward } => {
            let promo = ledger.insert_promo(&code, reward)?;
            println!("Added {} -> {} coin", promo.code, promo.reward);
        }
        PromoAction::Remove { code } => {
            let code = normalize_code(&code);
            if ledger.remove_promo(&code)? {
                println!("Removed {}", code);
            } else {
                println!("No promo code {}", code);
            }
        }
        PromoAction::List => {
            let promos = ledger.list_promos()?;
            if promos.is_empty() {
                println!("No promo codes");
            }
            for promo in promos {
                println!("{:<16} {:>8}", promo.code, promo.reward);
            }
        }
    }

    Ok(())
}

fn print_users(config: &CoinbotConfig) -> CoinbotResult<()> {
    let ledger = Ledger::open(config)?;
    let users = ledger.list_users()?;

    println!("{:>20} {:>10} {:>10}", "USER ID", "BALANCE", "REFERRALS");
    for user in &users {
        println!("{:>20} {:>10} {:>10}", user.user_id, user.balance, user.referral_count);
    }
    println!("{} users, {} coin total", users.len(), users.iter().map(|u| u.balance).sum::<i64>());

    Ok(())
}
