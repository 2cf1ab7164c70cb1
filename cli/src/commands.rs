pub mod contact;
pub mod inspect;
pub mod render;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result, bail};
use precinctmap::{
    MapConfig,
    feed::{DirFeed, ElectionFeed},
    geometry::{FeatureCollection, GeometryLoader, GeometrySource, LoadEvent},
};

use crate::cli::{Cli, FeedArgs};

pub(crate) fn load_config(cli: &Cli) -> Result<MapConfig> {
    match &cli.config {
        Some(path) => MapConfig::from_path(path),
        None => Ok(MapConfig::default()),
    }
}

/// Data directory from the flags, else the endpoint from the flags, else the configuration.
pub(crate) fn open_feed(args: &FeedArgs, config: &MapConfig) -> Result<Arc<dyn ElectionFeed>> {
    if let Some(dir) = &args.data_dir {
        return Ok(Arc::new(DirFeed::new(dir)));
    }
    let endpoint = args.endpoint.clone().or_else(|| config.feed.endpoint.clone());
    if let Some(endpoint) = endpoint {
        let nonce = args.nonce.clone().unwrap_or_else(|| config.feed.nonce.clone());
        return ajax_feed(endpoint, nonce, config);
    }
    if let Some(dir) = &config.feed.data_dir {
        return Ok(Arc::new(DirFeed::new(PathBuf::from(dir))));
    }
    bail!("[cli] No statistics source: pass --data-dir or --endpoint, or set feed.data_dir in the configuration")
}

#[cfg(feature = "download")]
fn ajax_feed(endpoint: String, nonce: String, config: &MapConfig) -> Result<Arc<dyn ElectionFeed>> {
    let mut feed = precinctmap::feed::AjaxFeed::new(endpoint, nonce)
        .context("[cli] Failed to create HTTP client")?;
    if let Some(url) = &config.feed.catalog_url {
        feed = feed.with_catalog_url(url);
    }
    if let Some(url) = &config.feed.pco_url {
        feed = feed.with_pco_url(url);
    }
    Ok(Arc::new(feed))
}

#[cfg(not(feature = "download"))]
fn ajax_feed(_endpoint: String, _nonce: String, _config: &MapConfig) -> Result<Arc<dyn ElectionFeed>> {
    bail!("[cli] --endpoint requires the `download` feature")
}

/// Decode an archive on the loader thread and wait for it.
pub(crate) fn load_archive(location: &str) -> Result<FeatureCollection> {
    match GeometryLoader::spawn(GeometrySource::parse(location)).wait() {
        LoadEvent::Loaded(collection) => Ok(collection),
        LoadEvent::Error(err) => Err(err).with_context(|| format!("[cli] Failed to load {location}")),
    }
}
