mod surface;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tour::{MoveOutcome, TourError, TourSession};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::surface::LogSurface;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless player for a waypoint map tour")]
struct Args {
    /// Directory holding config.json and waypoints.json
    #[arg(long, env = "TOUR_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Visit every stop up to the last visited one, in order
    #[arg(long)]
    play: bool,

    /// Move the marker to this stop (repeatable, runs in order)
    #[arg(long = "goto")]
    goto: Vec<usize>,

    /// Tap a stop marker: open its gallery or report it as unavailable
    #[arg(long = "tap")]
    tap: Vec<usize>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let surface = Arc::new(LogSurface);
    let session = match TourSession::load_dir(&args.data_dir, surface.clone(), surface) {
        Ok(session) => session,
        Err(err) => {
            error!("failed to load tour from {}: {err}", args.data_dir.display());
            return ExitCode::FAILURE;
        }
    };

    let store = session.store();
    let bounds = store.bounds();
    info!(
        stops = store.len(),
        route_km = store.route_length_m() / 1000.0,
        center = %bounds.center(),
        start = session.controller().current_index(),
        "tour loaded"
    );
    for (index, stop) in store.iter().enumerate() {
        let badge = session.gate().badge(index);
        info!(index, name = stop.name(), ?badge, photos = stop.photos().len(), "stop");
    }
    if let Some(url) = session.live_stream_url() {
        info!(%url, "live stream");
    }

    session.on_index_changed(|index| info!(index, "now at stop"));

    for index in &args.tap {
        match session.tap(*index) {
            Ok(gallery) => info!(
                stop = gallery.title(),
                first = gallery.current().unwrap_or("-"),
                caption = %gallery.caption(),
                "gallery opened"
            ),
            Err(err @ TourError::NotYetAvailable { .. }) => info!("{err}: coming soon"),
            Err(err) => warn!("{err}"),
        }
    }

    if args.play {
        if let Err(err) = session.play_through().await {
            warn!("{err}");
        }
    }

    for index in args.goto {
        session.controller().wait_until_idle().await;
        match session.request_move(index) {
            Ok(MoveOutcome::Started) => session.controller().wait_until_idle().await,
            Ok(outcome) => info!(index, ?outcome, "move not started"),
            Err(err) => warn!("{err}"),
        }
    }

    // Let the last popup expire before exiting.
    session.controller().wait_until_idle().await;
    tokio::time::sleep(tour::ARRIVAL_POPUP_TTL).await;
    ExitCode::SUCCESS
}
