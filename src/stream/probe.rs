//! Background stream liveness probing
//!
//! Recovery never touches the visible player: a worker thread issues an
//! HTTP HEAD (with a GET retry for servers that refuse HEAD) and the
//! coordinator reads the verdicts back on the UI thread.

use std::collections::HashSet;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::wall::TileId;

/// Verdict of a liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Alive,
    Dead,
}

/// Background liveness checks for stream URLs.
///
/// A tile has at most one probe in flight; a second request while one is
/// pending is dropped.
pub trait StreamProbe {
    fn begin(&mut self, tile: TileId, url: &str);

    /// Completed probes since the last poll. Non-blocking.
    fn poll(&mut self) -> Vec<(TileId, ProbeOutcome)>;
}

/// Commands sent to the probe worker thread.
#[derive(Debug)]
enum ProbeCommand {
    Check { tile: TileId, url: String },
    Stop,
}

/// HTTP prober backed by a single worker thread.
pub struct HttpProbe {
    command_tx: Sender<ProbeCommand>,
    result_rx: Receiver<(TileId, ProbeOutcome)>,
    worker_handle: Option<JoinHandle<()>>,
    in_flight: HashSet<TileId>,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Self {
        let (command_tx, command_rx) = bounded::<ProbeCommand>(64);
        let (result_tx, result_rx) = bounded::<(TileId, ProbeOutcome)>(64);

        let worker_handle = thread::spawn(move || {
            probe_worker(command_rx, result_tx, timeout);
        });

        Self {
            command_tx,
            result_rx,
            worker_handle: Some(worker_handle),
            in_flight: HashSet::new(),
        }
    }
}

impl StreamProbe for HttpProbe {
    fn begin(&mut self, tile: TileId, url: &str) {
        if !self.in_flight.insert(tile) {
            log::debug!("Probe already pending for {}", tile);
            return;
        }
        let command = ProbeCommand::Check {
            tile,
            url: url.to_string(),
        };
        if self.command_tx.try_send(command).is_err() {
            log::error!("Probe worker unavailable, dropping check for {}", url);
            self.in_flight.remove(&tile);
        }
    }

    fn poll(&mut self) -> Vec<(TileId, ProbeOutcome)> {
        let mut results = Vec::new();
        while let Ok((tile, outcome)) = self.result_rx.try_recv() {
            self.in_flight.remove(&tile);
            results.push((tile, outcome));
        }
        results
    }
}

impl Drop for HttpProbe {
    fn drop(&mut self) {
        let _ = self.command_tx.send(ProbeCommand::Stop);
        if let Some(handle) = self.worker_handle.take() {
            let _ = handle.join();
        }
    }
}

/// Worker thread main loop.
fn probe_worker(
    command_rx: Receiver<ProbeCommand>,
    result_tx: Sender<(TileId, ProbeOutcome)>,
    timeout: Duration,
) {
    let client = match reqwest::blocking::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to build probe HTTP client: {}", e);
            return;
        }
    };

    while let Ok(command) = command_rx.recv() {
        match command {
            ProbeCommand::Check { tile, url } => {
                let outcome = check_url(&client, &url);
                log::debug!("Probe for {} -> {:?}", url, outcome);
                if result_tx.send((tile, outcome)).is_err() {
                    break;
                }
            }
            ProbeCommand::Stop => break,
        }
    }
}

/// HEAD first; some stream servers reject HEAD outright, so retry those
/// with a GET before declaring the stream dead.
fn check_url(client: &reqwest::blocking::Client, url: &str) -> ProbeOutcome {
    match client.head(url).send() {
        Ok(response) if response.status().is_success() || response.status().is_redirection() => {
            ProbeOutcome::Alive
        }
        Ok(response) if response.status() == reqwest::StatusCode::METHOD_NOT_ALLOWED => {
            match client.get(url).send() {
                Ok(response) if response.status().is_success() => ProbeOutcome::Alive,
                _ => ProbeOutcome::Dead,
            }
        }
        Ok(response) => {
            log::debug!("Probe for {} got status {}", url, response.status());
            ProbeOutcome::Dead
        }
        Err(e) => {
            log::debug!("Probe for {} errored: {}", url, e);
            ProbeOutcome::Dead
        }
    }
}
