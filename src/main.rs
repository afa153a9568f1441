//! Salesboard - sales team targets and performance reports
//!
//! A CLI for recording an agent's daily flags, deals and nights against
//! monthly team targets, with weekly, daily and cumulative reports and a
//! cross-team overview for supervisors.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (sign-in, access, store, config, etc.)
//!   2 - An edit was rejected by validation

mod analysis;
mod cli;
mod commands;
mod config;
mod dates;
mod models;
mod report;
mod session;
mod store;
mod targets;

use anyhow::{Context, Result};
use cli::Args;
use commands::App;
use config::{Config, CONFIG_FILE};
use dates::SystemClock;
use session::{authenticate, AccessError};
use store::Backend;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Salesboard v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args.command);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Command failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .salesboard.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the store, teams and accounts.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Sign in, open the store and run the command. Returns the exit code.
async fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let Some(command) = args.command else {
        return Ok(0);
    };

    let store = Backend::from_config(&config.store).context("Failed to open the record store")?;

    let session = match (args.user.as_deref(), args.password.as_deref()) {
        (Some(user), Some(password)) => {
            let session = authenticate(&config.accounts, user, password)
                .context("Invalid username or password")?;
            info!("Signed in as {} ({})", session.username, session.role);
            Some(session)
        }
        _ => None,
    };

    if session.is_none() && !matches!(command, cli::Command::Months { .. }) {
        return Err(AccessError::NotSignedIn.into());
    }

    let app = App {
        config,
        store,
        clock: SystemClock,
        session,
    };

    app.run(&command).await
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
