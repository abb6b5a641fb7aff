//! GIF Widget
//!
//! An always-on-top animated GIF widget for X11 desktops: drag it around,
//! resize it, frame it with a border (optionally tinted from the wallpaper
//! under it) and let it hide itself whenever an application has focus.

mod animation;
mod app;
mod border;
mod config;
mod coordinator;
mod error;
mod platform;
mod presence;
mod shared;
mod timers;
mod wallpaper;
mod x11_async;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{Options, WidgetApp};

const USAGE: &str = "Usage: gif-widget [--config <path>] [--gif <path>]";

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Option<Options>> {
    let mut options = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args.next().context("--config needs a path")?;
                options.config_path = Some(PathBuf::from(path));
            }
            "--gif" | "-g" => {
                let path = args.next().context("--gif needs a path")?;
                options.gif_path = Some(PathBuf::from(path));
            }
            "--help" | "-h" => return Ok(None),
            other => bail!("Unknown argument {:?}\n{}", other, USAGE),
        }
    }
    Ok(Some(options))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "gif_widget=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let Some(options) = parse_args(std::env::args().skip(1))? else {
        println!("{}", USAGE);
        return Ok(());
    };

    info!("Starting GIF widget");

    // Setup signal handlers for graceful shutdown
    let (shutdown_tx, shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let tx = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                }
            }
            let _ = tx.send(()).await;
        });
    }

    let app = WidgetApp::new(options).context("Failed to start GIF widget")?;
    if let Err(e) = app.run(shutdown_rx).await {
        error!("Application error: {:#}", e);
        return Err(e);
    }

    drop(shutdown_tx);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let options = parse_args(args(&["--config", "/tmp/w.json", "-g", "cat.gif"])).unwrap().unwrap();
        assert_eq!(options.config_path, Some(PathBuf::from("/tmp/w.json")));
        assert_eq!(options.gif_path, Some(PathBuf::from("cat.gif")));

        assert_eq!(parse_args(args(&[])).unwrap(), Some(Options::default()));
        assert_eq!(parse_args(args(&["--help"])).unwrap(), None);
        assert!(parse_args(args(&["--config"])).is_err());
        assert!(parse_args(args(&["--bogus"])).is_err());
    }
}
