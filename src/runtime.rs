/*
 *  runtime.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Event sources and the single loop that feeds the watchface
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

use chrono::{Local, Timelike};
use log::{debug, info, warn};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use crate::app::Watchface;
use crate::host::parse_inbox_line;
use crate::message::Dictionary;

/// Everything the host can tell the watchface
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// Wall clock crossed a minute boundary
    Tick,
    /// Batch from the companion
    Inbox(Dictionary),
    /// Leave the event loop
    Shutdown,
}

/// Time left until the next whole minute of local time
pub fn until_next_minute() -> Duration {
    let now = Local::now();
    let into_minute = Duration::new(now.second() as u64, now.nanosecond() % 1_000_000_000);
    Duration::from_secs(60).saturating_sub(into_minute)
}

/// Tick on every minute boundary
pub fn spawn_minute_ticker(tx: Sender<HostEvent>) -> JoinHandle<()> {
    spawn_ticker(tx, until_next_minute(), Duration::from_secs(60))
}

/// Tick after `first`, then every `period`. A late tick is skipped, not
/// bunched up, so the face never redraws the same minute twice in a row.
pub fn spawn_ticker(tx: Sender<HostEvent>, first: Duration, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + first, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if tx.send(HostEvent::Tick).await.is_err() {
                debug!("ticker stopping, event loop gone");
                break;
            }
        }
    })
}

/// One line off the companion link
#[derive(Debug, PartialEq)]
enum CompanionLine {
    Text(Vec<u8>),
    Oversized,
    Closed,
}

/// Read one line, holding at most `limit` bytes plus its line ending.
/// Anything longer is consumed and discarded without being buffered.
async fn read_companion_line<R>(reader: &mut R, limit: usize) -> std::io::Result<CompanionLine>
where
    R: AsyncBufRead + Unpin,
{
    // room for a trailing "\r\n"
    let cap = limit as u64 + 2;
    let mut buf = Vec::new();
    let n = (&mut *reader).take(cap).read_until(b'\n', &mut buf).await?;
    if n == 0 {
        return Ok(CompanionLine::Closed);
    }
    if buf.last() == Some(&b'\n') || (n as u64) < cap {
        return Ok(CompanionLine::Text(buf));
    }

    loop {
        buf.clear();
        let n = (&mut *reader).take(cap).read_until(b'\n', &mut buf).await?;
        if n == 0 || buf.last() == Some(&b'\n') {
            return Ok(CompanionLine::Oversized);
        }
    }
}

/// Read companion batches, one JSON array per line.
///
/// Malformed or oversized lines are dropped. End of input only ends the
/// reader; the face keeps running on its own clock.
pub fn spawn_companion_reader<R>(mut reader: R, inbox_size: usize, tx: Sender<HostEvent>) -> JoinHandle<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let bytes = match read_companion_line(&mut reader, inbox_size).await {
                Ok(CompanionLine::Text(bytes)) => bytes,
                Ok(CompanionLine::Oversized) => {
                    warn!("Dropped companion message: longer than {} bytes", inbox_size);
                    continue;
                }
                Ok(CompanionLine::Closed) => {
                    info!("Companion input closed");
                    break;
                }
                Err(e) => {
                    warn!("Companion read failed: {}", e);
                    break;
                }
            };
            let line = match String::from_utf8(bytes) {
                Ok(line) => line,
                Err(e) => {
                    warn!("Dropped companion message: {}", e);
                    continue;
                }
            };
            let line = line.trim_end_matches(['\n', '\r']);
            if line.trim().is_empty() {
                continue;
            }
            match parse_inbox_line(line, inbox_size) {
                Ok(dict) => {
                    if tx.send(HostEvent::Inbox(dict)).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!("Dropped companion message: {}", e),
            }
        }
    })
}

/// Waits for a SIGINT, SIGTERM, or SIGHUP signal.
#[cfg(unix)]
async fn signal_handler() -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

#[cfg(not(unix))]
async fn signal_handler() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received. Initiating graceful shutdown.");
    Ok(())
}

/// Turn a termination signal into `HostEvent::Shutdown`
pub fn spawn_signal_watcher(tx: Sender<HostEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = signal_handler().await {
            warn!("Signal handling unavailable: {}", e);
            return;
        }
        let _ = tx.send(HostEvent::Shutdown).await;
    })
}

/// Hand events to the face one at a time until shutdown or every sender
/// is gone. Returns the number of events handled.
pub async fn run(face: &mut Watchface, events: &mut Receiver<HostEvent>) -> u64 {
    let mut handled = 0;
    while let Some(event) = events.recv().await {
        match event {
            HostEvent::Tick => face.tick(),
            HostEvent::Inbox(dict) => face.on_inbox(&dict),
            HostEvent::Shutdown => {
                info!("Shutdown requested");
                break;
            }
        }
        handled += 1;
    }
    handled
}
