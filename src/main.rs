pub mod config;
pub mod macros;
pub mod remote;
pub mod report;
pub mod sequencer;
pub mod transport;

use crate::config::PadConfig;
use crate::remote::{RemoteFrame, RemoteHandle};
use crate::sequencer::PadEngineHandle;
use color_eyre::Result;
use tokio::io::AsyncReadExt;
use tokio::sync::{mpsc, watch};
use tracing::{info, trace, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    // Konfiguration laden (Defaults, falls die Datei fehlt)
    if let Err(e) = PadConfig::ensure_default_config() {
        warn!("Could not write default config: {}", e);
    }
    let config = PadConfig::load_or_default();
    info!("Starting openpad with config: {:?}", config);

    // Kanäle für Remote-Bytes und den Frame-Slot erstellen
    let (byte_tx, byte_rx) = mpsc::channel(64);
    let (frame_tx, frame_rx) = watch::channel(RemoteFrame::default());
    let _remote_handle = RemoteHandle::spawn(byte_rx, frame_tx);

    // Sequencer-Engine starten
    let mut engine_handle = PadEngineHandle::new("pad".to_string());
    let (mut report_rx, _host_tx) = engine_handle.start(
        config.sequencer_settings(),
        frame_rx,
        config.poll_interval(),
    )?;

    // stdin is the remote-control byte feed here; a deployment wires the
    // serial driver to the same channel.
    let _stdin_handle = tokio::spawn(async move {
        let mut stdin = tokio::io::stdin();
        let mut buf = [0u8; 64];
        loop {
            match stdin.read(&mut buf).await {
                Ok(0) => {
                    info!("stdin closed, remote feed finished");
                    break;
                }
                Ok(n) => {
                    if byte_tx.send(buf[..n].to_vec()).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("stdin read failed: {}", e);
                    break;
                }
            }
        }
    });

    // Stand-in for the transport collaborator: consume one report per poll
    // cycle and hand the encoded frame onwards.
    info!("Entering transport loop");
    while let Some(report) = report_rx.recv().await {
        trace!(frame = ?transport::encode_report(&report), "Report ready for transport");
    }

    engine_handle.shutdown().await?;
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
