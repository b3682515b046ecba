//! Sequencer engine with statum state machine for the poll loop.
//!
//! Wraps the [`ReportSequencer`] in a 5-state lifecycle and runs it in its
//! own tokio task, one report per poll interval.
//!
//! # State Machine
//!
//! ```text
//! Initializing ──► Configured ──► Active ──► Deactivating ──► Deactivated
//!                      │             │            ▲
//!                      └─────────────┘            │
//!                      (activate)             (shutdown)
//! ```
//!
//! # Architecture
//!
//! ```text
//! RemoteFrame (watch) ──► [ReportSequencer] ──► PadReport (mpsc)
//!                               ▲
//!                        HostFrame (mpsc, drained and discarded)
//! ```

use statum::{machine, state};
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::macros;
use crate::remote::RemoteFrame;
use crate::report::PadReport;
use crate::sequencer::report_sequencer::{ReportSequencer, SequencerSettings};
use crate::sequencer::SequencerError;
use crate::transport::HostFrame;

/// States for the engine lifecycle using statum
#[state]
#[derive(Debug, Clone)]
pub enum PadEngineState {
    Initializing, // Setting up engine structure
    Configured,   // Tables validated
    Active,       // Producing reports in the poll loop
    Deactivating, // Shutting down gracefully
    Deactivated,  // Fully stopped
}

/// Poll-loop engine with compile-time state safety via statum.
#[machine]
pub struct PadEngine<S: PadEngineState> {
    sequencer: ReportSequencer,
    report_tx: mpsc::Sender<PadReport>,
    host_rx: mpsc::Receiver<HostFrame>,
    poll_interval: Duration,
    name: String,
}

impl<S: PadEngineState> PadEngine<S> {
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

impl PadEngine<Initializing> {
    pub fn create(
        settings: SequencerSettings,
        remote_rx: watch::Receiver<RemoteFrame>,
        report_tx: mpsc::Sender<PadReport>,
        host_rx: mpsc::Receiver<HostFrame>,
        poll_interval: Duration,
        name: String,
    ) -> Self {
        info!("Initializing pad engine: {}", name);
        let sequencer = ReportSequencer::new(settings, remote_rx);

        Self::new(sequencer, report_tx, host_rx, poll_interval, name)
    }

    /// Validates the compiled-in macro tables and transitions to Configured.
    ///
    /// An empty table is a build fault and must never reach the poll loop.
    pub fn configure(self) -> Result<PadEngine<Configured>, SequencerError> {
        info!("Configuring pad engine: {}", self.name);
        macros::validate_programs()?;
        debug!("Macro tables validated");
        Ok(self.transition())
    }
}

impl PadEngine<Configured> {
    pub fn activate(self) -> PadEngine<Active> {
        info!("Activating pad engine: {}", self.name);
        self.transition()
    }
}

impl PadEngine<Active> {
    /// One poll cycle: drain host frames, apply the remote relay policy,
    /// produce the next report.
    pub fn tick(&mut self) -> PadReport {
        while let Ok(frame) = self.host_rx.try_recv() {
            self.sequencer.handle_host_frame(frame);
        }
        self.sequencer.poll_remote();
        self.sequencer.produce_next_report()
    }

    /// Main poll loop with graceful shutdown support.
    ///
    /// Emits one report per poll interval until the shutdown signal or the
    /// transport channel closing ends the loop.
    pub async fn run_until_shutdown(
        mut self,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) -> Result<PadEngine<Deactivating>, SequencerError> {
        info!("Starting poll loop for: {}", self.name);
        let mut ticker = tokio::time::interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    info!("Shutdown signal received for: {}", self.name);
                    break;
                }

                _ = ticker.tick() => {
                    let report = self.tick();
                    match self.report_tx.try_send(report) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            // Transport is not draining; this cycle's report
                            // is lost, the next one replaces it anyway.
                            warn!("Transport channel full, dropping report");
                        }
                        Err(TrySendError::Closed(_)) => {
                            info!("Transport channel closed, stopping poll loop");
                            break;
                        }
                    }
                }
            }
        }

        info!("Transitioning to Deactivating state: {}", self.name);
        Ok(self.transition())
    }

    pub fn deactivate(self) -> PadEngine<Deactivating> {
        info!("Deactivating pad engine: {}", self.name);
        self.transition()
    }
}

impl PadEngine<Deactivating> {
    /// Drives the sequencer through its end-of-run phases and transitions
    /// to Deactivated.
    pub async fn shutdown(mut self) -> PadEngine<Deactivated> {
        info!("Shutting down pad engine: {}", self.name);

        self.sequencer.request_cleanup();
        // Cleanup -> Done, so the sequencer ends in its terminal phase.
        let _ = self.sequencer.produce_next_report();

        info!("Engine shut down successfully: {}", self.name);
        self.transition()
    }
}

impl PadEngine<Deactivated> {}

/// Handle for managing the pad engine in a tokio task.
///
/// Owns the task handle and the shutdown signal; the engine itself lives in
/// the background task.
#[derive(Debug)]
pub struct PadEngineHandle {
    pub name: String,

    task_handle: Option<JoinHandle<Result<(), SequencerError>>>,

    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl PadEngineHandle {
    pub fn new(name: String) -> Self {
        Self {
            name,
            task_handle: None,
            shutdown_tx: None,
        }
    }

    /// Starts the engine in a tokio task and returns its channels.
    ///
    /// # Returns
    ///
    /// * Receiver for outbound reports (one per poll cycle)
    /// * Sender for inbound host frames
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::ConfigurationError`] when a compiled-in
    /// macro table fails validation.
    pub fn start(
        &mut self,
        settings: SequencerSettings,
        remote_rx: watch::Receiver<RemoteFrame>,
        poll_interval: Duration,
    ) -> Result<(mpsc::Receiver<PadReport>, mpsc::Sender<HostFrame>), SequencerError> {
        let (report_tx, report_rx) = mpsc::channel(100);
        let (host_tx, host_rx) = mpsc::channel(100);
        let engine_name = self.name.clone();

        let engine = PadEngine::create(
            settings,
            remote_rx,
            report_tx,
            host_rx,
            poll_interval,
            engine_name.clone(),
        )
        .configure()?;

        let active_engine = engine.activate();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);
        let task_handle = tokio::spawn(async move {
            info!("Spawning running engine: {}", engine_name);
            match active_engine.run_until_shutdown(shutdown_rx).await {
                Ok(deactivating_engine) => {
                    info!("Engine entering deactivating state: {}", engine_name);
                    let _ = deactivating_engine.shutdown().await;
                    Ok(())
                }
                Err(e) => {
                    error!("Error running engine: {} - {}", engine_name, e);
                    Err(e)
                }
            }
        });

        self.task_handle = Some(task_handle);

        info!("Pad engine started: {}", self.name);
        Ok((report_rx, host_tx))
    }

    /// Gracefully shuts down the engine and waits for task completion.
    pub async fn shutdown(&mut self) -> Result<(), SequencerError> {
        debug!("Sending shutdown signal to engine: {}", self.name);

        if let Some(tx) = self.shutdown_tx.take() {
            if tx.send(()).is_err() {
                warn!("Engine task already terminated: {}", self.name);
            }
        }

        if let Some(handle) = self.task_handle.take() {
            match handle.await {
                Ok(result) => {
                    debug!("Engine task completed: {}", self.name);
                    result
                }
                Err(e) => {
                    error!("Engine task panicked: {} - {}", self.name, e);
                    Err(SequencerError::ThreadError(format!(
                        "Engine task panicked: {}",
                        e
                    )))
                }
            }
        } else {
            debug!("Engine already shut down: {}", self.name);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::buttons;
    use crate::sequencer::report_sequencer::PadMode;
    use std::time::Duration;
    use tokio::time::timeout;

    fn test_settings(startup_mode: PadMode) -> SequencerSettings {
        SequencerSettings {
            use_sync: false,
            startup_mode,
            ..Default::default()
        }
    }

    async fn next_report(rx: &mut mpsc::Receiver<PadReport>) -> PadReport {
        timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("no report within timeout")
            .expect("report channel closed")
    }

    #[tokio::test]
    async fn engine_emits_reports_and_shuts_down() {
        let (_frame_tx, frame_rx) = watch::channel(RemoteFrame::default());
        let mut handle = PadEngineHandle::new("test".to_string());
        let (mut report_rx, _host_tx) = handle
            .start(
                test_settings(PadMode::Idle),
                frame_rx,
                Duration::from_millis(1),
            )
            .unwrap();

        for _ in 0..5 {
            assert_eq!(next_report(&mut report_rx).await, PadReport::neutral());
        }

        handle.shutdown().await.unwrap();
        // Idempotent second shutdown.
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn mash_mode_reports_press_a() {
        let (_frame_tx, frame_rx) = watch::channel(RemoteFrame::default());
        let mut handle = PadEngineHandle::new("mash".to_string());
        let (mut report_rx, _host_tx) = handle
            .start(
                test_settings(PadMode::MashA),
                frame_rx,
                Duration::from_millis(1),
            )
            .unwrap();

        // First report is the Init cycle; A shows up right after.
        let mut saw_a = false;
        for _ in 0..10 {
            if next_report(&mut report_rx).await.buttons == buttons::A {
                saw_a = true;
                break;
            }
        }
        assert!(saw_a);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn remote_frame_is_relayed_to_the_transport() {
        let (frame_tx, frame_rx) = watch::channel(RemoteFrame::default());
        let mut handle = PadEngineHandle::new("relay".to_string());
        let (mut report_rx, host_tx) = handle
            .start(
                test_settings(PadMode::Idle),
                frame_rx,
                Duration::from_millis(1),
            )
            .unwrap();

        // Host frames must be drained without disturbing anything.
        host_tx
            .send(HostFrame { data: vec![0; 7] })
            .await
            .unwrap();

        let frame = RemoteFrame {
            report: PadReport {
                buttons: buttons::X | buttons::PLUS,
                ..PadReport::neutral()
            },
            ..Default::default()
        };
        frame_tx.send(frame.clone()).unwrap();

        let mut relayed = false;
        for _ in 0..300 {
            if next_report(&mut report_rx).await == frame.report {
                relayed = true;
                break;
            }
        }
        assert!(relayed);

        handle.shutdown().await.unwrap();
    }
}
