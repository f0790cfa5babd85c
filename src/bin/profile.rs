//! profile: command-line client for the profile service.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use profile_client::{ClientConfig, Context, ProfileClient, ProfileObject};

/// Profile service CLI
#[derive(Parser)]
#[command(name = "profile")]
#[command(version = profile_client::PKG_VERSION)]
#[command(about = "Look up and create profiles")]
struct Args {
    /// Service address (overrides the config file)
    #[arg(short, long, env = "PROFILE_ENDPOINT")]
    endpoint: Option<String>,

    /// Path to a TOML config file (default: <config dir>/profile-client/config.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bearer token sent with every call
    #[arg(long, env = "PROFILE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a profile by id
    GetId {
        /// Profile id
        id: String,
    },

    /// Fetch the profile owning a contact
    GetContact {
        /// Email address or phone number
        contact: String,
    },

    /// Create a profile for a contact
    Create {
        /// Email address or phone number
        contact: String,
        /// Display name
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!(version = %profile_client::version_string(), "profile cli starting");
    let config = load_config(&args)?;

    let ctx = Context::background();
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let client = ProfileClient::connect(&ctx, config).await?;

    let result = match &args.command {
        Command::GetId { id } => client.get_profile_by_id(&ctx, id).await,
        Command::GetContact { contact } => client.get_profile_by_contact(&ctx, contact).await,
        Command::Create { contact, name } => {
            client
                .create_profile_by_contact_and_name(&ctx, contact, name)
                .await
        }
    };
    client.close();

    print_profile(&result?)?;
    Ok(())
}

/// Resolve configuration: explicit file, then the user config file, then
/// defaults; command-line flags win over all of them.
fn load_config(args: &Args) -> profile_client::Result<ClientConfig> {
    let default_path = dirs::config_dir().map(|dir| dir.join("profile-client").join("config.toml"));

    let mut config = match (&args.config, default_path) {
        (Some(path), _) => ClientConfig::load(path)?,
        (None, Some(path)) if path.exists() => ClientConfig::load(&path)?,
        _ => ClientConfig::default(),
    };

    if let Some(endpoint) = &args.endpoint {
        config = config.endpoint(endpoint.clone());
    }
    if let Some(token) = &args.token {
        config = config.bearer_token(token.clone());
    }
    Ok(config.client_info("cli", profile_client::PKG_VERSION))
}

fn print_profile(profile: &ProfileObject) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(profile)?);
    Ok(())
}
