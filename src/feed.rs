/*
 *  feed.rs
 *
 *  GlanceFace - the next meeting at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Calendar feed poller: reads the collaborator's sync payload and queues
 *  event batches to the render engine, last write wins
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use crate::engine::FeedUpdate;
use crate::sync::{self, SyncPayload};
use crate::timeline::Event;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("payload read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("payload envelope malformed: {0}")]
    Envelope(#[from] serde_json::Error),
    #[error(transparent)]
    Sync(#[from] sync::SyncError),
}

/// Background poller for the collaborator's payload file.
///
/// The engine subscribes and unsubscribes it through a watch channel in
/// step with visibility, and can poke an immediate poll through the refresh
/// channel. Decode failures queue [`FeedUpdate::Failed`] so the engine can
/// caption the error without touching its timeline. Teardown is explicit:
/// [`stop`](Self::stop) ends the task before the handle is dropped.
pub struct FeedPoller {
    handle: Option<JoinHandle<()>>,
    stop_tx: mpsc::Sender<()>,
}

impl FeedPoller {
    /// Spawn the poller. Returns the poller plus the engine-side controls:
    /// the activity subscription and the refresh sender.
    pub fn start(
        path: PathBuf,
        interval: Duration,
        updates: mpsc::Sender<FeedUpdate>,
    ) -> (Self, watch::Sender<bool>, mpsc::Sender<()>) {
        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
        let (active_tx, mut active_rx) = watch::channel(true);
        let (refresh_tx, mut refresh_rx) = mpsc::channel::<()>(1);

        let handle = tokio::spawn(async move {
            info!("feed poller watching {}", path.display());
            let mut active = *active_rx.borrow();
            if active && !poll_once(&path, &updates).await {
                return;
            }
            loop {
                tokio::select! {
                    _ = stop_rx.recv() => break,
                    changed = active_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let now_active = *active_rx.borrow();
                        // Poll immediately on re-activation.
                        if now_active && !active && !poll_once(&path, &updates).await {
                            break;
                        }
                        active = now_active;
                    }
                    _ = refresh_rx.recv(), if active => {
                        if !poll_once(&path, &updates).await {
                            break;
                        }
                    }
                    _ = tokio::time::sleep(interval), if active => {
                        if !poll_once(&path, &updates).await {
                            break;
                        }
                    }
                }
            }
            debug!("feed poller stopped");
        });

        (Self { handle: Some(handle), stop_tx }, active_tx, refresh_tx)
    }

    /// Deterministic teardown; resolves once the task has exited.
    pub async fn stop(mut self) {
        let _ = self.stop_tx.send(()).await;
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for FeedPoller {
    fn drop(&mut self) {
        // stop() is the orderly path; the task must not outlive its owner.
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

/// One poll pass. Returns false once the engine side is gone.
async fn poll_once(path: &Path, updates: &mpsc::Sender<FeedUpdate>) -> bool {
    let update = match load_payload(path) {
        Ok(events) => {
            debug!("feed poll: {} event(s)", events.len());
            FeedUpdate::Events(events)
        }
        Err(e) => {
            warn!("feed poll failed: {}", e);
            FeedUpdate::Failed
        }
    };
    updates.send(update).await.is_ok()
}

/// Read and decode the payload file.
pub fn load_payload(path: &Path) -> Result<Vec<Event>, FeedError> {
    let raw = std::fs::read_to_string(path)?;
    let payload: SyncPayload = serde_json::from_str(&raw)?;
    Ok(sync::decode_events(&payload)?)
}
