//! Background task turning the raw remote byte feed into published frames.

use chrono::Local;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::remote::frame_parser::parse_line;
use crate::remote::line_assembler::LineAssembler;
use crate::remote::RemoteFrame;

/// Handle for the remote input task.
///
/// The task runs until the byte channel closes; whoever owns the byte
/// sender controls its lifetime. Parsing and publishing happen entirely
/// inside the task, so the sequencer side only ever observes complete
/// frames through the watch slot.
#[derive(Debug)]
pub struct RemoteHandle {
    task_handle: JoinHandle<()>,
}

impl RemoteHandle {
    /// Spawns the line assembly / parse / publish loop.
    pub fn spawn(byte_rx: mpsc::Receiver<Vec<u8>>, frame_tx: watch::Sender<RemoteFrame>) -> Self {
        info!("Spawning remote input task");
        let task_handle = tokio::spawn(run(byte_rx, frame_tx));
        Self { task_handle }
    }

    /// Waits for the task to finish (it does when the byte feed closes).
    pub async fn join(self) {
        if let Err(e) = self.task_handle.await {
            warn!("Remote input task panicked: {}", e);
        }
    }
}

async fn run(mut byte_rx: mpsc::Receiver<Vec<u8>>, frame_tx: watch::Sender<RemoteFrame>) {
    let mut assembler = LineAssembler::new();

    while let Some(chunk) = byte_rx.recv().await {
        for byte in chunk {
            if let Some(line) = assembler.push(byte) {
                match parse_line(&line) {
                    Ok(report) => {
                        let frame = RemoteFrame {
                            report,
                            received_at: Local::now(),
                        };
                        if frame_tx.send(frame).is_err() {
                            // Sequencer side is gone; no point assembling more.
                            warn!("Remote frame slot closed, stopping input task");
                            return;
                        }
                        debug!("Published remote frame");
                    }
                    Err(e) => {
                        debug!("Dropping malformed remote line: {}", e);
                    }
                }
            }
        }
    }

    info!("Remote byte feed closed, input task finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{buttons, Hat};
    use std::time::Duration;
    use tokio::time::timeout;

    async fn wait_for_frame(frame_rx: &mut watch::Receiver<RemoteFrame>) -> RemoteFrame {
        timeout(Duration::from_secs(1), frame_rx.changed())
            .await
            .expect("no frame published")
            .expect("frame channel closed");
        frame_rx.borrow_and_update().clone()
    }

    #[tokio::test]
    async fn publishes_parsed_lines() {
        let (byte_tx, byte_rx) = mpsc::channel(8);
        let (frame_tx, mut frame_rx) = watch::channel(RemoteFrame::default());
        let handle = RemoteHandle::spawn(byte_rx, frame_tx);

        byte_tx
            .send(b"10000000000000 10 200 128 128 3\r".to_vec())
            .await
            .unwrap();

        let frame = wait_for_frame(&mut frame_rx).await;
        assert_eq!(frame.report.buttons, buttons::A);
        assert_eq!(frame.report.lx, 10);
        assert_eq!(frame.report.hat, Hat::DownRight);

        drop(byte_tx);
        handle.join().await;
    }

    #[tokio::test]
    async fn reassembles_lines_split_across_chunks() {
        let (byte_tx, byte_rx) = mpsc::channel(8);
        let (frame_tx, mut frame_rx) = watch::channel(RemoteFrame::default());
        let _handle = RemoteHandle::spawn(byte_rx, frame_tx);

        byte_tx.send(b"01000000".to_vec()).await.unwrap();
        byte_tx.send(b"000000 128 12".to_vec()).await.unwrap();
        byte_tx.send(b"8 128 128 8\r".to_vec()).await.unwrap();

        let frame = wait_for_frame(&mut frame_rx).await;
        assert_eq!(frame.report.buttons, buttons::B);
        assert_eq!(frame.report.hat, Hat::Neutral);
    }

    #[tokio::test]
    async fn malformed_lines_do_not_touch_the_slot() {
        let (byte_tx, byte_rx) = mpsc::channel(8);
        let (frame_tx, mut frame_rx) = watch::channel(RemoteFrame::default());
        let _handle = RemoteHandle::spawn(byte_rx, frame_tx);

        byte_tx.send(b"garbage\r".to_vec()).await.unwrap();
        byte_tx
            .send(b"00000000000001 1 2 3 4 0\r".to_vec())
            .await
            .unwrap();

        // The first change observed is the valid line; the garbage one was
        // dropped without publishing.
        let frame = wait_for_frame(&mut frame_rx).await;
        assert_eq!(frame.report.buttons, buttons::CAPTURE);
        assert_eq!((frame.report.lx, frame.report.ly), (1, 2));
    }
}
