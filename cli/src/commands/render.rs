use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow};
use precinctmap::{
    MapView, PrecinctId,
    feed::{ElectionFeed, FetchWorker},
    geometry::LoadEvent,
    layer::PointerEvent,
    state::{FilterState, PendingFetch},
};
use serde_json::json;

use crate::commands::{load_archive, load_config, open_feed};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::RenderArgs) -> Result<()> {
    let config = load_config(cli)?;

    let archive = args.archive.clone()
        .or_else(|| config.boundary_archive.clone())
        .ok_or_else(|| anyhow!("[render] No boundary archive given or configured"))?;
    let reference = args.reference.clone().or_else(|| config.voting_archive.clone());

    let mut view = MapView::new(config.clone());
    let ticket = view.begin_geometry_load();
    view.on_geometry(ticket, LoadEvent::Loaded(load_archive(&archive)?));
    if let Some(reference) = &reference {
        let ticket = view.begin_reference_load();
        match load_archive(reference) {
            Ok(collection) => {
                view.on_reference(ticket, LoadEvent::Loaded(collection));
            }
            Err(err) => tracing::warn!("[render] reference archive skipped: {err:#}"),
        }
    }

    if !args.districts {
        let feed = open_feed(&args.feed, &config)?;
        apply_filter(&mut view, feed.as_ref(), args)?;
        let worker = FetchWorker::new(feed);
        // Only the latest pending fetch is still current; run it to completion.
        if let Some(pending) = pending_fetch(&mut view, args)? {
            let completion = worker.run(pending);
            view.apply_completion(completion);
        }
    }

    if let Some(number) = &args.select {
        let id = PrecinctId::new(number);
        if !view.layer().contains(&id) {
            return Err(anyhow!("[render] Precinct {id} is not on the map"));
        }
        view.dispatch(PointerEvent::Click, &id);
    }

    for notice in view.take_notices() {
        eprintln!("[render] {}", serde_json::to_string(&notice)?);
    }

    view.layer().to_svg_with_size(&args.output, args.width, 10)?;
    println!("[render] wrote {}", args.output.display());
    println!("{}", view.legend());
    if let Some(popup) = view.popup() {
        println!("\n{popup}");
    }

    if let Some(path) = &args.json {
        write_json(path, &view)?;
    }
    Ok(())
}

/// Load the catalog, PCO directory and precinct list; any of them may be absent.
fn apply_filter(view: &mut MapView, feed: &dyn ElectionFeed, args: &crate::cli::RenderArgs) -> Result<()> {
    match feed.fetch_catalog() {
        // The catalog's own auto-selection is superseded by the explicit filter below.
        Ok(catalog) => { view.set_catalog(catalog); }
        Err(err) => tracing::info!("[render] no election catalog: {err}"),
    }
    match feed.fetch_pco_directory() {
        Ok(directory) => view.set_pco_directory(directory),
        Err(err) => tracing::info!("[render] no PCO directory: {err}"),
    }
    match feed.fetch_precinct_list() {
        Ok(listing) => view.set_precinct_list(listing),
        Err(err) => tracing::info!("[render] no precinct list: {err}"),
    }
    if args.election.is_none() && matches!(view.filter(), FilterState::Idle) {
        return Err(anyhow!("[render] No --election given and no election catalog to pick the latest from"));
    }
    Ok(())
}

/// The fetch for the requested filter; `None` while no election is selected.
fn pending_fetch(view: &mut MapView, args: &crate::cli::RenderArgs) -> Result<Option<PendingFetch>> {
    let mut pending = match &args.election {
        Some(date) => view.select_election(date).context("[render] Invalid --election")?,
        None => match view.clear_race() {
            Some(pending) => pending,
            None => return Ok(None),
        },
    };
    if let Some(race) = &args.race {
        pending = view.select_race(race).context("[render] Invalid --race")?;
    }
    Ok(Some(pending))
}

fn write_json(path: &Path, view: &MapView) -> Result<()> {
    let document = json!({
        "filter": view.filter(),
        "legend": view.legend(),
        "popup": view.popup(),
        "viewport": view.viewport(),
    });
    fs::write(path, serde_json::to_string_pretty(&document)?)
        .with_context(|| format!("[render] Failed to write {}", path.display()))?;
    println!("[render] wrote {}", path.display());
    Ok(())
}
