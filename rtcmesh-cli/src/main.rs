use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use rtcmesh::client::{Callback, ChannelState, Mesh, MeshConfig, MeshError, MeshHandle};
use rtcmesh::relay::{RelayConfig, serve};
use std::io::IsTerminal;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rtcmesh")]
#[command(bin_name = "rtcmesh")]
#[command(about = "Peer-to-peer data channel mesh over a signaling relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay.
    Relay {
        #[arg(long, default_value = "0.0.0.0:3000")]
        bind: SocketAddr,

        #[arg(long)]
        debug: bool,
    },
    /// Join a room and chat with its members.
    Chat(ChatArgs),
}

#[derive(clap::Args)]
struct ChatArgs {
    /// Signaling relay URL.
    #[arg(long)]
    server: Option<String>,

    #[arg(short, long)]
    room: Option<String>,

    /// Data channel label.
    #[arg(long)]
    channel: Option<String>,

    #[arg(long)]
    debug: bool,

    /// JSON file with mesh options.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    match Cli::parse().command {
        Commands::Relay { bind, debug } => {
            init_tracing(debug);
            println!("{}", format!("📡 Relay listening on ws://{bind}/").green().bold());
            serve(RelayConfig { bind }).await
        }
        Commands::Chat(args) => {
            let mut config = build_config(&args)?;
            init_tracing(config.debug_mode);

            if args.room.is_none() && args.config.is_none() && std::io::stdin().is_terminal() {
                config.room_name = Input::<String>::new()
                    .with_prompt("Room")
                    .default(config.room_name.clone())
                    .interact_text()
                    .context("Failed to read room name")?;
            }
            chat(config).await
        }
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Config file first, then flags on top.
fn build_config(args: &ChatArgs) -> Result<MeshConfig> {
    let mut config = match &args.config {
        Some(path) => MeshConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => MeshConfig::default(),
    };

    if let Some(server) = &args.server {
        config.signalling_server = server.clone();
    }
    if let Some(room) = &args.room {
        config.room_name = room.clone();
    }
    if let Some(channel) = &args.channel {
        config.channel_name = channel.clone();
    }
    config.debug_mode |= args.debug;
    Ok(config)
}

async fn chat(config: MeshConfig) -> Result<()> {
    println!(
        "{}",
        format!(
            "🚀 Joining '{}' via {}...",
            config.room_name, config.signalling_server
        )
        .cyan()
    );

    let mut mesh = Mesh::connect(config)
        .await
        .context("Failed to reach the signaling relay")?;
    mesh.on(Callback::ready(|| {
        println!("{}", "✨ Joined the room. Type to chat, /peers, /quit.".green().bold());
    }))
    .on(Callback::channel_ready(|peer| {
        println!("{}", format!("🔗 Channel to {peer} is open").cyan());
    }))
    .on(Callback::channel_not_ready(|peer| {
        println!("{}", format!("⚠️  Channel to {peer} is not ready").yellow());
    }))
    .on(Callback::message(|msg| {
        println!("{} {}", format!("[{}]", msg.sender).blue().bold(), msg.text);
    }));
    let handle = mesh.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => continue,
            "/quit" => break,
            "/peers" => print_peers(&handle).await?,
            text => match handle.send_message(text).await {
                Ok(sent) => info!("Sent to {} channel(s)", sent),
                Err(MeshError::Closed) => break,
                Err(e) => eprintln!("{}", format!("❌ {e}").red()),
            },
        }
    }

    match handle.close().await {
        Ok(()) | Err(MeshError::Closed) => {}
        Err(e) => return Err(e).context("Failed to close the mesh"),
    }
    println!("{}", "👋 Left the room.".green());
    Ok(())
}

async fn print_peers(handle: &MeshHandle) -> Result<()> {
    let snapshot = handle.snapshot().await?;
    let local = snapshot
        .local_peer_id
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "?".to_owned());
    println!("{}", format!("📂 Room '{}' as {}", snapshot.room, local).bold());

    for peer in &snapshot.peers {
        let open = snapshot
            .channels
            .iter()
            .filter(|c| c.owner == peer.peer_id)
            .any(|c| c.ready_state == ChannelState::Open);
        let status = if open { "open".green() } else { "pending".yellow() };
        println!(
            "   {} {:?} {:?} [{}]",
            peer.peer_id, peer.role, peer.state, status
        );
    }
    Ok(())
}
