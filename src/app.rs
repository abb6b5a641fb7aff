//! Widget application
//!
//! Wires the X11 backend, the background workers and the coordinator together
//! and runs the single-threaded UI loop.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};
use x11rb::protocol::Event;

use crate::animation::decoder;
use crate::config::WidgetConfig;
use crate::coordinator::{Coordinator, Jobs, WorkerMessage, WorkerSnapshot};
use crate::platform::x11::{picker, Display, InputTranslator, X11ActiveWindow, X11ScreenCapture, X11Surface};
use crate::presence::PresenceMonitor;
use crate::shared::WidgetGeometry;
use crate::wallpaper::{self, SampleRequests};
use crate::x11_async::{is_connection_lost, X11EventStream};

/// Worker results waiting for the UI loop
const RESULT_QUEUE: usize = 64;

/// Runs decode and picker jobs on tokio's blocking pool and forwards sample
/// requests to the sampler thread
pub struct WidgetJobs {
    results: mpsc::Sender<WorkerMessage>,
    samples: Option<SampleRequests>,
    picking: Arc<AtomicBool>,
}

impl WidgetJobs {
    pub fn new(results: mpsc::Sender<WorkerMessage>, samples: Option<SampleRequests>) -> Self {
        Self {
            results,
            samples,
            picking: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Jobs for WidgetJobs {
    fn decode_source(&mut self, generation: u64, path: PathBuf, width: u32, height: u32) {
        let results = self.results.clone();
        tokio::task::spawn_blocking(move || {
            let result = decoder::decode(&path, width, height);
            let message = WorkerMessage::FramesDecoded {
                generation,
                path,
                size: (width, height),
                result,
            };
            if results.blocking_send(message).is_err() {
                debug!("UI loop gone, dropping decoded frames");
            }
        });
    }

    fn pick_source(&mut self) {
        if self.picking.swap(true, Ordering::SeqCst) {
            debug!("File picker already open");
            return;
        }

        let results = self.results.clone();
        let picking = self.picking.clone();
        tokio::task::spawn_blocking(move || {
            let picked = picker::pick_gif();
            picking.store(false, Ordering::SeqCst);
            if results.blocking_send(WorkerMessage::SourcePicked(picked)).is_err() {
                debug!("UI loop gone, dropping picker result");
            }
        });
    }

    fn request_sample(&mut self) {
        match &self.samples {
            Some(samples) => samples.request(),
            None => debug!("Wallpaper sampler unavailable"),
        }
    }
}

/// Command line options
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Options {
    pub config_path: Option<PathBuf>,
    pub gif_path: Option<PathBuf>,
}

pub struct WidgetApp {
    stream: X11EventStream,
    input: InputTranslator,
    coordinator: Coordinator<X11Surface, WidgetJobs>,
    results: mpsc::Receiver<WorkerMessage>,
}

impl WidgetApp {
    /// Connect to X, create the window and start the workers. Only failing to
    /// reach the display (or to create the window) is fatal.
    pub fn new(options: Options) -> Result<Self> {
        let display = Display::connect()?;

        let config_path = match options.config_path {
            Some(path) => path,
            None => WidgetConfig::default_path()?,
        };
        let mut config = WidgetConfig::load(&config_path);
        if let Some(gif) = options.gif_path {
            config.gif_path = Some(gif.to_string_lossy().into_owned());
        }

        let geometry = WidgetGeometry::anchored(display.screen, config.width, config.height);
        let surface = X11Surface::new(&display, geometry).context("Failed to create widget window")?;
        let input = InputTranslator::new(surface.window(), surface.menu_window());

        let (results_tx, results_rx) = mpsc::channel(RESULT_QUEUE);
        let (snapshot_tx, snapshot_rx) = watch::channel(WorkerSnapshot::default());

        match X11ActiveWindow::connect() {
            Ok(source) => {
                PresenceMonitor::new(source)
                    .spawn(snapshot_rx.clone(), results_tx.clone())
                    .context("Failed to start presence monitor")?;
            }
            Err(e) => warn!("Presence monitor disabled, widget stays visible: {:#}", e),
        }

        let samples = match X11ScreenCapture::connect() {
            Ok(capture) => {
                let (requests, _handle) = wallpaper::worker::spawn(capture, config.update_interval(), snapshot_rx, results_tx.clone())
                    .context("Failed to start wallpaper sampler")?;
                Some(requests)
            }
            Err(e) => {
                warn!("Wallpaper sampler disabled: {:#}", e);
                None
            }
        };

        let jobs = WidgetJobs::new(results_tx, samples);
        let stream = X11EventStream::new(display.conn.clone())?;
        let coordinator = Coordinator::new(surface, jobs, display.screen, config, Some(config_path), snapshot_tx);

        Ok(Self {
            stream,
            input,
            coordinator,
            results: results_rx,
        })
    }

    /// UI loop: X events, worker results and timer deadlines, until exit is
    /// requested, the display goes away or a shutdown signal arrives
    pub async fn run(mut self, mut shutdown: mpsc::Receiver<()>) -> Result<()> {
        self.coordinator.start(Instant::now());
        info!("Starting main event loop");

        loop {
            match self.stream.drain() {
                Ok(events) => {
                    for event in events {
                        self.handle_event(event);
                    }
                }
                Err(e) if is_connection_lost(&e) => {
                    error!("X11 connection lost, exiting");
                    break;
                }
                Err(e) => warn!("Error polling for X11 events: {:#}", e),
            }

            if self.coordinator.exit_requested() {
                break;
            }

            let deadline = self.coordinator.next_deadline();
            tokio::select! {
                () = self.stream.wait_readable() => {}
                message = self.results.recv() => {
                    if let Some(message) = message {
                        self.coordinator.post(message);
                        while let Ok(message) = self.results.try_recv() {
                            self.coordinator.post(message);
                        }
                    }
                }
                () = sleep_until(deadline) => {}
                _ = shutdown.recv() => {
                    info!("Shutdown signal received, cleaning up...");
                    break;
                }
            }

            self.coordinator.tick(Instant::now());
            if self.coordinator.exit_requested() {
                break;
            }
        }

        self.coordinator.shutdown();
        info!("GIF widget stopped");
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Expose(expose) = &event {
            if expose.window == self.coordinator.surface().menu_window() {
                if let Err(e) = self.coordinator.surface().redraw_menu() {
                    debug!("Menu redraw failed: {:#}", e);
                }
                return;
            }
        }

        let now = Instant::now();
        if let Some(input) = self.input.translate(&event, now, self.coordinator.surface()) {
            self.coordinator.handle_input(input, now);
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending::<()>().await,
    }
}
