//! signage-ctl
//!
//! Thin CLI over the signage client library: detect a display's API
//! variant, log in, list media, and start playback.
//!
//! Connection settings come from flags or the `SIGNAGE_*` environment
//! variables.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

use signage_client::{ClientConfig, Detector, DisplayType, MediaType, SignageClient, TransportConfig};

#[derive(Parser, Debug)]
#[command(name = "signage-ctl")]
#[command(about = "Control LG webOS signage displays", long_about = None)]
struct Args {
    /// Display host (IP address or hostname)
    #[arg(long, env = "SIGNAGE_HOST")]
    host: String,

    /// Display password
    #[arg(long, env = "SIGNAGE_PASSWORD", default_value = "", hide_env_values = true)]
    password: String,

    /// Pinned port (auto-detected when port or type is omitted)
    #[arg(long, env = "SIGNAGE_PORT")]
    port: Option<u16>,

    /// Pinned display type: modern or legacy (auto-detected when omitted)
    #[arg(long, env = "SIGNAGE_TYPE", value_parser = parse_display_type)]
    display_type: Option<DisplayType>,

    /// Verify the display's TLS certificate (displays ship self-signed ones,
    /// so verification is off by default)
    #[arg(long, env = "SIGNAGE_VERIFY_TLS")]
    verify_tls: bool,

    /// Prompt for captcha digits when automated solving fails (legacy only)
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    interactive: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe the display and report its API variant and port
    Detect,
    /// Log in and report the resolved identity
    Login,
    /// List media on the display
    ListMedia {
        /// Restrict the listing to playlists
        #[arg(long)]
        playlists_only: bool,
    },
    /// Resolve a playlist by name and play it
    Play { reference: String },
    /// Fetch the system information payload
    SystemInfo,
}

fn parse_display_type(value: &str) -> Result<DisplayType, String> {
    match value.to_lowercase().as_str() {
        "modern" => Ok(DisplayType::Modern),
        "legacy" => Ok(DisplayType::Legacy),
        other => Err(format!("unknown display type {other:?}, expected modern or legacy")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let args = Args::parse();

    let mut config = ClientConfig::new(&args.host, &args.password);
    config.port = args.port;
    config.display_type = args.display_type;
    config.interactive_captcha = args.interactive;
    config.transport = TransportConfig {
        accept_invalid_certs: !args.verify_tls,
        ..TransportConfig::default()
    };

    if matches!(args.command, Command::Detect) {
        let identity = Detector::new(&config.transport).detect(&config.host).await;
        println!("{:?} display on port {}", identity.display_type, identity.port);
        return Ok(());
    }

    let mut client = SignageClient::new(config);
    client.login().await?;
    let identity = client
        .identity()
        .ok_or_else(|| anyhow::anyhow!("identity unresolved after login"))?;

    match args.command {
        Command::Detect => {}
        Command::Login => {
            println!(
                "logged in to {:?} display on port {}",
                identity.display_type, identity.port
            );
        }
        Command::ListMedia { playlists_only } => {
            let filters: &[MediaType] = if playlists_only {
                &[MediaType::PlayList]
            } else {
                &[]
            };
            for entry in client.list_media(filters).await? {
                println!(
                    "{}\t{:?}\t{}",
                    entry.file_name, entry.media_type, entry.full_path
                );
            }
        }
        Command::Play { reference } => {
            client.play(&reference).await?;
            println!("play command dispatched: {reference}");
        }
        Command::SystemInfo => {
            let info = client.system_info().await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }

    Ok(())
}
