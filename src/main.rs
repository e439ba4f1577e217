use anyhow::Result;
use clap::{Parser, Subcommand};
use remilk_auth::{AuthController, RestoreOutcome};
use remilk_backend::RtmClient;
use remilk_config::Config;
use remilk_mcp::AppState;
use remilk_store::FileTokenStore;
use remilk_types::{RtmApi, TokenStore};
use std::{path::PathBuf, sync::Arc, time::Duration};

#[derive(Parser, Debug)]
#[command(
    name = "remilk",
    about = "remilk — Remember The Milk gateway for AI-assistant clients"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the gateway server.
    Serve {
        /// Path to the YAML configuration file.
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Override the listening port (default: 8018).
        #[arg(short, long)]
        port: Option<u16>,
        /// Override the listening address (default: 127.0.0.1).
        #[arg(long)]
        host: Option<String>,
    },
    /// Authorize this gateway against the backend interactively.
    Login {
        /// Path to the YAML configuration file.
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Delete the stored token.
    Logout {
        /// Path to the YAML configuration file.
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Show authentication status.
    Status {
        /// Path to the YAML configuration file.
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { config, port, host } => cmd_serve(config, port, host).await,
        Commands::Login { config } => cmd_login(config).await,
        Commands::Logout { config } => cmd_logout(config).await,
        Commands::Status { config } => cmd_status(config).await,
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(p) => Config::from_file(p).map_err(|e| anyhow::anyhow!("config error: {e}"))?,
        None => Config::from_yaml("").map_err(|e| anyhow::anyhow!("config error: {e}"))?,
    };
    Ok(config)
}

fn build_backend(config: &Config) -> Result<Arc<RtmClient>> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("config error: {e}"))?;
    let client = RtmClient::new(
        config.api_key.clone(),
        config.shared_secret.clone(),
        config.perms.clone(),
        Duration::from_secs(config.timeout_secs),
    )?;
    Ok(Arc::new(client))
}

fn open_store(config: &Config) -> Result<Arc<FileTokenStore>> {
    let path = config
        .resolved_token_path()
        .map_err(|e| anyhow::anyhow!("config error: {e}"))?;
    Ok(Arc::new(FileTokenStore::new(path)))
}

async fn cmd_serve(
    config_path: Option<PathBuf>,
    port: Option<u16>,
    host: Option<String>,
) -> Result<()> {
    let mut config = load_config(config_path.as_ref())?;
    if let Some(p) = port {
        config.port = p;
    }
    if let Some(h) = host {
        config.host = h;
    }

    let backend = build_backend(&config)?;
    let store = open_store(&config)?;
    let auth = Arc::new(AuthController::new(backend.clone(), store));

    match auth.restore().await? {
        RestoreOutcome::Restored { username } => {
            tracing::info!(%username, "starting authenticated");
        }
        RestoreOutcome::NoToken => {
            tracing::info!("no stored token; clients must authenticate");
        }
        RestoreOutcome::StaleTokenDiscarded => {
            tracing::warn!("stored token was stale and has been discarded");
        }
        RestoreOutcome::Unverified => {
            tracing::warn!("stored token could not be validated; starting unauthenticated");
        }
    }

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(backend, auth);
    let app = remilk_mcp::make_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    eprintln!("remilk listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn cmd_login(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_ref())?;
    let backend = build_backend(&config)?;
    let store = open_store(&config)?;
    let auth = AuthController::new(backend, store);

    let flow = auth
        .start_flow()
        .await
        .map_err(|e| anyhow::anyhow!("could not start authorization: {e}"))?;

    eprintln!("Open this URL in a browser and allow access:");
    eprintln!("{}", flow.auth_url);
    eprintln!();
    eprintln!("Press Enter once you have authorized the application...");
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;

    match auth.complete_flow(Some(&flow.frob)).await {
        Ok(_) => {
            let user = auth.username().unwrap_or_else(|| "unknown".into());
            eprintln!("Login successful; connected as {user}");
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("login failed: {e}")),
    }
}

async fn cmd_logout(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_ref())?;
    let store = open_store(&config)?;
    store
        .delete()
        .await
        .map_err(|e| anyhow::anyhow!("logout failed: {e}"))?;
    eprintln!("stored token deleted");
    Ok(())
}

async fn cmd_status(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_ref())?;
    let store = open_store(&config)?;
    // Validate against the backend when credentials are configured; fall
    // back to inspecting the stored record otherwise.
    if config.validate().is_ok() {
        let Some(token) = store
            .load()
            .await
            .map_err(|e| anyhow::anyhow!("status failed: {e}"))?
        else {
            println!("not authenticated");
            return Ok(());
        };
        let backend = build_backend(&config)?;
        match backend.check_token(&token.token).await {
            Ok(true) => println!("authenticated as {} (perms: {})", token.username, token.perms),
            Ok(false) => println!("stored token for {} is no longer valid", token.username),
            Err(e) => println!(
                "token stored for {} but validation failed: {e}",
                token.username
            ),
        }
    } else {
        match store
            .inspect()
            .await
            .map_err(|e| anyhow::anyhow!("status failed: {e}"))?
        {
            Some(info) => println!("token stored for {} (not validated)", info.username),
            None => println!("not authenticated"),
        }
    }
    Ok(())
}
