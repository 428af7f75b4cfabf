//! Desktop driver for the bridge channels
//!
//! Runs the sharing and gallery channels against a directory-backed host so the
//! bridge can be exercised without a device.
//!
//! ```bash
//! cargo run --features cli --bin cheez-bridge-cli -- --root /tmp/sdcard save --input r1.png
//! cargo run --features cli --bin cheez-bridge-cli -- --root /tmp/sdcard share --phone 923001234567 --image r1.png
//! cargo run --features cli --bin cheez-bridge-cli -- --root /tmp/sdcard call --channel gallery --json '{"method":"scanFile","arguments":{"path":"r1.png"}}'
//! ```

use anyhow::{Context, Result};
use cheez_bridge::channel::codec;
use cheez_bridge::{Bridge, BridgeConfig, DirectoryHost, MediaCapability, MethodCall, MethodResponse};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "cheez-bridge-cli", about = "Drive the receipt bridge against a local directory")]
struct Cli {
    /// Directory standing in for external storage
    #[arg(long)]
    root: PathBuf,

    /// Use direct file writes + scanner broadcasts instead of the media index
    #[arg(long)]
    legacy: bool,

    /// Package identifier the host reports for the app
    #[arg(long, default_value = "com.example.cheez_admin_app")]
    app_package: String,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `cheez_bridge=debug`
    #[arg(long)]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Share an image with a messaging contact
    Share {
        #[arg(long)]
        phone: String,
        #[arg(long)]
        image: String,
    },
    /// Register an existing file with the gallery
    Scan {
        #[arg(long)]
        path: String,
    },
    /// Save the bytes of a file as a new gallery entry
    Save {
        #[arg(long)]
        input: PathBuf,
        /// Destination name; defaults to a timestamped name
        #[arg(long)]
        name: Option<String>,
    },
    /// Send a raw JSON method call to a channel (`sharing`, `gallery`, or a full name)
    Call {
        #[arg(long)]
        channel: String,
        #[arg(long)]
        json: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cheez_bridge::logging::init_logging(cli.log.as_deref());

    let config = match &cli.config {
        Some(path) => BridgeConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => BridgeConfig::default(),
    };

    let capability = if cli.legacy {
        MediaCapability::Legacy
    } else {
        MediaCapability::Modern
    };
    let host = Arc::new(
        DirectoryHost::new(&cli.root)
            .with_capability(capability)
            .with_app_package(&cli.app_package),
    );
    let bridge = Bridge::new(host.clone(), config);

    let (channel, call) = match cli.command {
        Command::Share { phone, image } => (
            bridge.config().sharing_channel.clone(),
            MethodCall::new("shareToWhatsApp")
                .with_argument("phone", phone)
                .with_argument("imagePath", image),
        ),
        Command::Scan { path } => (
            bridge.config().gallery_channel.clone(),
            MethodCall::new("scanFile").with_argument("path", path),
        ),
        Command::Save { input, name } => {
            let bytes = std::fs::read(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let mut call = MethodCall::new("saveImageToGallery").with_argument("imageBytes", bytes);
            if let Some(name) = name {
                call = call.with_argument("fileName", name);
            }
            (bridge.config().gallery_channel.clone(), call)
        }
        Command::Call { channel, json } => {
            let call = codec::decode_call(&json).context("decoding method call")?;
            let channel = match channel.as_str() {
                "sharing" => bridge.config().sharing_channel.clone(),
                "gallery" => bridge.config().gallery_channel.clone(),
                _ => channel,
            };
            (channel, call)
        }
    };

    let response = bridge.handle(&channel, &call);
    println!("{}", codec::encode_response(&response));

    for intent in host.dispatched_intents() {
        println!("activity: {}", serde_json::to_string(&intent)?);
    }
    for intent in host.broadcasts() {
        println!("broadcast: {}", serde_json::to_string(&intent)?);
    }

    if let MethodResponse::Error { code, message, .. } = response {
        anyhow::bail!("{code}: {message}");
    }
    Ok(())
}
