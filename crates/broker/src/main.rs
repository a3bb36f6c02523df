mod relay;

use std::collections::HashSet;
use std::net::SocketAddr;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

use relay::{Inbound, Relayed, process_line, should_deliver};

const RELAY_CAPACITY: usize = 1024;

#[derive(Parser)]
#[command(name = "tandem-broker")]
#[command(about = "Pub/sub bus for tandem peers")]
struct Args {
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    #[arg(short, long, default_value_t = tandem::DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let listener = TcpListener::bind((args.bind.as_str(), args.port)).await?;
    log::info!("broker listening on {}", listener.local_addr()?);

    let (relay_tx, _) = broadcast::channel::<Relayed>(RELAY_CAPACITY);

    loop {
        let (stream, addr) = listener.accept().await?;
        log::info!("{addr}: connected");
        let relay_tx = relay_tx.clone();
        tokio::spawn(async move {
            handle_connection(stream, addr, relay_tx).await;
            log::info!("{addr}: disconnected");
        });
    }
}

async fn handle_connection(stream: TcpStream, addr: SocketAddr, relay_tx: broadcast::Sender<Relayed>) {
    if let Err(err) = stream.set_nodelay(true) {
        log::warn!("{addr}: set_nodelay failed: {err}");
    }
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();
    let mut relay_rx = relay_tx.subscribe();
    let mut topics: HashSet<String> = HashSet::new();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(err) => {
                        log::warn!("{addr}: read error: {err}");
                        break;
                    }
                };
                match process_line(&mut topics, &line) {
                    Inbound::Subscribed(count) => {
                        log::debug!("{addr}: subscribed to {count} topics");
                    }
                    Inbound::Relay(relayed) => {
                        // no subscribers is fine; frames are fire-and-forget
                        let _ = relay_tx.send(relayed);
                    }
                    Inbound::Dropped => {}
                }
            }
            relayed = relay_rx.recv() => {
                match relayed {
                    Ok(relayed) if should_deliver(&topics, &relayed) => {
                        if let Err(err) = write_half.write_all(relayed.line.as_bytes()).await {
                            log::warn!("{addr}: write error: {err}");
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("{addr}: slow consumer, {skipped} frames dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}
