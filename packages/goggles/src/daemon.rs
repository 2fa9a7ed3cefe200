//! Screenshot watcher daemon.
//!
//! Watches the configured directory for newly created image files and calls
//! the gateway for each one, renaming the file in place to the suggested
//! name. Every file is an independent, best-effort operation; failures are
//! logged and skipped.

use crate::api::{is_image_file, GatewayClient};
use crate::config::GogglesConfig;
use crate::pid;
use anyhow::{bail, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::signal;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

async fn watch_loop(config: GogglesConfig, mut shutdown: watch::Receiver<bool>) -> Result<()> {
    let watch_dir = config.effective_watch_dir();
    if !watch_dir.is_dir() {
        bail!("Watch directory {} does not exist", watch_dir.display());
    }
    info!(dir = %watch_dir.display(), "Goggles is watching");

    // Notify delivers on its own thread; bridge events into an async
    // channel so the loop never blocks a runtime worker.
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut watcher: RecommendedWatcher = Watcher::new(
        move |res| {
            let _ = tx.send(res);
        },
        notify::Config::default(),
    )?;
    watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

    let client = GatewayClient::new(config.effective_gateway_url());
    let address = if config.address.is_empty() {
        None
    } else {
        Some(config.address.clone())
    };

    info!("Setup complete, Goggles is ready");
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            event = rx.recv() => match event {
                Some(Ok(Event {
                    kind: EventKind::Create(_),
                    paths,
                    ..
                })) => {
                    for path in paths {
                        if !is_image_file(&path) {
                            continue;
                        }
                        info!(file = %path.display(), "Detected new image");
                        if let Err(e) = process_image(&client, address.as_deref(), &path).await {
                            error!(file = %path.display(), error = %e, "Failed to process image");
                        }
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => error!(error = %e, "Watch error"),
                None => {
                    error!("Watch channel closed");
                    break;
                }
            },
        }
    }

    info!("Shutting down watcher");
    watcher.unwatch(&watch_dir).ok();
    Ok(())
}

/// One independent generation: upload, then rename in place.
async fn process_image(
    client: &GatewayClient,
    address: Option<&str>,
    path: &Path,
) -> Result<()> {
    let reply = client.generate_filename(path, address).await?;
    if !reply.success {
        bail!("Gateway reported failure for {}", path.display());
    }

    let target = reserve_target(path, &reply.generated_filename)?;
    tokio::fs::rename(path, &target).await?;

    info!(
        from = %reply.original_filename,
        to = %target.display(),
        bytes = reply.image_size,
        mime = %reply.mime_type,
        "Renamed"
    );
    Ok(())
}

/// Claim a sibling path carrying the generated name and the original
/// extension. The claimed name is created empty with `create_new`, so a
/// concurrent claim cannot pick the same name; the caller renames over it.
/// Existing files get a numeric suffix instead of being clobbered.
fn reserve_target(path: &Path, generated: &str) -> std::io::Result<PathBuf> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    for n in 0.. {
        let candidate = if n == 0 {
            parent.join(format!("{generated}{ext}"))
        } else {
            parent.join(format!("{generated}-{n}{ext}"))
        };
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(_) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    unreachable!()
}

/// Run the daemon until Ctrl-C.
pub async fn run(config: GogglesConfig) -> Result<()> {
    let new_pid = std::process::id();
    info!(pid = new_pid, "Starting Goggles daemon");
    pid::save_pid(new_pid);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut watcher_handle = tokio::spawn(async move {
        if let Err(e) = watch_loop(config, shutdown_rx).await {
            error!(error = %e, "Watcher exited");
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received shutdown signal");
            shutdown_tx.send(true).ok();
            let _ = (&mut watcher_handle).await;
        }
        _ = &mut watcher_handle => {
            warn!("Watcher exited unexpectedly");
        }
    }

    pid::clear_pid();
    info!("Goggles: shut down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_keeps_extension_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("Screenshot 2026-08-31.png");
        std::fs::write(&source, b"png").unwrap();

        let target = reserve_target(&source, "golden-retriever-park-sunset").unwrap();
        assert_eq!(
            target,
            dir.path().join("golden-retriever-park-sunset.png")
        );
        assert!(target.exists());
    }

    #[test]
    fn reserve_avoids_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("shot.png");
        std::fs::write(&source, b"png").unwrap();
        std::fs::write(dir.path().join("sunset-over-bay.png"), b"old").unwrap();

        let target = reserve_target(&source, "sunset-over-bay").unwrap();
        assert_eq!(target, dir.path().join("sunset-over-bay-1.png"));
    }

    #[test]
    fn reserve_handles_missing_extension() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("shot");
        let target = reserve_target(&source, "sunset-over-bay").unwrap();
        assert_eq!(target, dir.path().join("sunset-over-bay"));
    }

    #[test]
    fn reserving_twice_never_reuses_a_name() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("shot.png");

        let first = reserve_target(&source, "sunset-over-bay").unwrap();
        let second = reserve_target(&source, "sunset-over-bay").unwrap();

        assert_eq!(first, dir.path().join("sunset-over-bay.png"));
        assert_eq!(second, dir.path().join("sunset-over-bay-1.png"));
    }

    #[tokio::test]
    async fn watch_loop_stops_promptly_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let config = GogglesConfig {
            updated_at: 0,
            address: String::new(),
            watch_dir: Some(dir.path().to_path_buf()),
            gateway_url: None,
        };

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(watch_loop(config, rx));

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(std::time::Duration::from_secs(2), handle)
            .await
            .expect("watcher did not stop")
            .unwrap()
            .unwrap();
    }
}
