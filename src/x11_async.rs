//! X11 readiness for the tokio loop
//!
//! A blocking task polls the connection's socket with mio and wakes the UI
//! loop through a `Notify`. Events are then drained without blocking.

use std::os::unix::io::AsRawFd;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{oneshot, Notify};
use x11rb::connection::Connection;
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

const X11_TOKEN: mio::Token = mio::Token(0);
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

pub struct X11EventStream {
    conn: Arc<RustConnection>,
    notify: Arc<Notify>,
    _task_guard: oneshot::Receiver<()>,
}

impl X11EventStream {
    pub fn new(conn: Arc<RustConnection>) -> Result<Self> {
        let fd = conn.stream().as_raw_fd();
        let notify = Arc::new(Notify::new());
        let task_notify = notify.clone();

        // Dropping the stream drops the receiver and ends the polling task
        let (guard, task_guard) = oneshot::channel::<()>();
        let mut poll = mio::Poll::new().context("Failed to create mio Poll")?;
        let mut events = mio::Events::with_capacity(1);

        poll.registry()
            .register(&mut mio::unix::SourceFd(&fd), X11_TOKEN, mio::Interest::READABLE)
            .context("Failed to register X11 FD with mio")?;

        tokio::task::spawn_blocking(move || loop {
            if guard.is_closed() {
                tracing::debug!("X11 socket polling task shutting down");
                return;
            }

            if let Err(err) = poll.poll(&mut events, Some(POLL_TIMEOUT)) {
                tracing::warn!("X11 socket poll failed: {:?}", err);
                continue;
            }

            if events.iter().any(|event| event.token() == X11_TOKEN) {
                task_notify.notify_one();
            }
        });

        Ok(Self {
            conn,
            notify,
            _task_guard: task_guard,
        })
    }

    /// Everything already queued on the connection
    pub fn drain(&self) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        while let Some(event) = self.conn.poll_for_event()? {
            events.push(event);
        }
        Ok(events)
    }

    pub async fn wait_readable(&self) {
        self.notify.notified().await;
    }
}

/// True for errors that mean the X server is gone
pub fn is_connection_lost(error: &anyhow::Error) -> bool {
    let message = error.to_string();
    message.contains("Broken pipe") || message.contains("Connection reset") || message.contains("connection closed")
}
