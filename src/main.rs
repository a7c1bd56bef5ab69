/*
 *  main.rs
 *
 *  sparkface - spark watchface
 *  (c) 2020-26 Stuart Hunter
 *
 *  Desktop host: stdin/stdout companion link, PBM display snapshots
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

use anyhow::Context;
use env_logger::Env;
use log::info;
use tokio::io::BufReader;
use tokio::sync::mpsc;

use sparkface::config;
use sparkface::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use sparkface::display::PbmDriver;
use sparkface::host::{BundledResources, FileStorage, Host, StdioChannel, SystemClock};
use sparkface::runtime::{run, spawn_companion_reader, spawn_minute_ticker, spawn_signal_watcher};
use sparkface::Watchface;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load()?;

    // stdout carries the companion channel, logs stay on stderr
    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_level()))
        .format_timestamp_secs()
        .init();

    info!("This is {}", env!("CARGO_PKG_NAME"));
    info!("v.{} built {} ({})", env!("CARGO_PKG_VERSION"), BUILD_DATE, BUILD_PROFILE);

    let storage_path = cfg.storage_path();
    let storage = FileStorage::open(&storage_path)
        .with_context(|| format!("opening preferences at {}", storage_path.display()))?;

    let host = Host {
        channel: Box::new(StdioChannel::stdout(cfg.inbox_size(), cfg.outbox_size())),
        storage: Box::new(storage),
        resources: Box::new(BundledResources::new(cfg.background_path())),
        clock: Box::new(SystemClock::new(cfg.clock_style())),
        display: Box::new(PbmDriver::new(DISPLAY_WIDTH, DISPLAY_HEIGHT, cfg.snapshot_path())),
    };

    let mut face = Watchface::new(cfg.watchface_settings(), host);
    face.start().context("starting watchface")?;

    let (tx, mut rx) = mpsc::channel(32);
    let ticker = spawn_minute_ticker(tx.clone());
    let reader = spawn_companion_reader(BufReader::new(tokio::io::stdin()), cfg.inbox_size(), tx.clone());
    let signals = spawn_signal_watcher(tx);

    let handled = run(&mut face, &mut rx).await;
    face.stop();

    ticker.abort();
    signals.abort();
    reader.abort();
    info!("{} events handled, bye", handled);

    // stdin may still be parked in a blocking read the runtime would wait on
    std::process::exit(0)
}
