//! Headless demo: load a catalog, run a session against the static surface,
//! and print the ranked results for a query given on the command line.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use casamap::location::NoLocation;
use casamap::resolver::nominatim::NominatimGeocoder;
use casamap::session::{MapSession, Msg};
use casamap::{MapConfig, StaticSurface};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let catalog_path = args.next().context("usage: casamap <catalog.json> [query]")?;
    let query = args.next();

    let config = MapConfig::load();
    let catalog =
        casamap::catalog::load(Path::new(&catalog_path)).context("loading catalog file")?;
    log::info!("loaded {} catalog points", catalog.len());

    let surface = StaticSurface::new(config.default_center, config.default_zoom);
    let geocoder = Arc::new(NominatimGeocoder::new()?);
    let (mut session, mut rx) = MapSession::new(
        config,
        catalog,
        Box::new(surface),
        geocoder,
        Arc::new(NoLocation),
    );

    if let Some(query) = query {
        session.update(Msg::QueryChanged(query));
        session.update(Msg::SubmitSearch);
        // Wait for the SearchResolved completion
        while session.is_searching() {
            match rx.recv().await {
                Some(msg) => session.update(msg),
                None => break,
            }
        }
        for notice in session.take_notices() {
            log::warn!("search notice: {notice:?}");
        }
    }

    let viewport = session.viewport();
    println!(
        "{} results near {:.4},{:.4} ({})",
        session.results().len(),
        viewport.center.lat,
        viewport.center.lon,
        session.area().label(),
    );
    for result in session.results() {
        println!(
            "  {:>6.2} km  {}  ({})",
            result.distance_km, result.point.title, result.point.address
        );
    }

    Ok(())
}
