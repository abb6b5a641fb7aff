//! Wallpaper sampler thread
//!
//! Wakes every update interval, or early when the coordinator asks for a
//! forced sample (sync toggled on, widget dragged).

use std::sync::mpsc::{self as std_mpsc, RecvTimeoutError, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use super::sampler::{Sampler, ScreenCapture};
use crate::coordinator::messages::{WorkerMessage, WorkerSnapshot};

/// Shortest accepted sampling period
const MIN_INTERVAL: Duration = Duration::from_millis(250);

/// Handle for requesting an immediate sample
#[derive(Debug, Clone)]
pub struct SampleRequests {
    tx: SyncSender<()>,
}

impl SampleRequests {
    /// Ask for a sample now. At most one request is queued; extra requests
    /// while one is pending are dropped.
    pub fn request(&self) {
        match self.tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Disconnected(())) => debug!("Wallpaper sampler is gone, request dropped"),
        }
    }
}

/// Start the sampler thread. It lives for the rest of the process; when sync is
/// off each wake-up is a no-op.
pub fn spawn<C: ScreenCapture + Send + 'static>(
    capture: C,
    interval: Duration,
    snapshot: watch::Receiver<WorkerSnapshot>,
    results: mpsc::Sender<WorkerMessage>,
) -> std::io::Result<(SampleRequests, JoinHandle<()>)> {
    let (tx, rx) = std_mpsc::sync_channel::<()>(1);
    let interval = interval.max(MIN_INTERVAL);
    let sampler = Sampler::new(capture);

    let handle = thread::Builder::new()
        .name("wallpaper-sampler".into())
        .spawn(move || {
            info!("Wallpaper sampler started ({:?} interval)", interval);
            loop {
                match rx.recv_timeout(interval) {
                    Ok(()) | Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => {
                        info!("Wallpaper sampler shutting down");
                        return;
                    }
                }

                let current = snapshot.borrow().clone();
                if let Some(sample) = sampler.update(&current) {
                    if results.blocking_send(WorkerMessage::WallpaperSample(sample)).is_err() {
                        info!("Wallpaper sampler shutting down");
                        return;
                    }
                }
            }
        })?;

    Ok((SampleRequests { tx }, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaptureError;
    use crate::shared::{Rgb, WidgetGeometry};
    use crate::wallpaper::sampler::{enhance, PixelGrid, Region};

    struct SolidCapture(Rgb);

    impl ScreenCapture for SolidCapture {
        fn capture(&self, region: Region) -> Result<PixelGrid, CaptureError> {
            let pixels = vec![self.0; (region.width * region.height) as usize];
            Ok(PixelGrid { width: region.width, height: region.height, pixels })
        }
    }

    #[test]
    fn test_forced_request_posts_sample() {
        let color = Rgb::new(40, 90, 160);
        let (snapshot_tx, snapshot_rx) = watch::channel(WorkerSnapshot {
            geometry: WidgetGeometry::new(300, 300, 100, 100),
            wallpaper_sync_enabled: true,
            ..WorkerSnapshot::default()
        });
        let (results_tx, mut results_rx) = mpsc::channel(4);

        let (requests, _handle) =
            spawn(SolidCapture(color), Duration::from_secs(3600), snapshot_rx, results_tx).unwrap();
        requests.request();

        match results_rx.blocking_recv() {
            Some(WorkerMessage::WallpaperSample(sample)) => {
                assert_eq!(sample.position, (300, 300));
                assert_eq!(sample.color, enhance(color));
            }
            other => panic!("unexpected message: {:?}", other),
        }
        drop(snapshot_tx);
    }
}
