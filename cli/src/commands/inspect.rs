use std::{collections::BTreeMap, fs};

use anyhow::{Context, Result};
use precinctmap::{
    layer::{FeatureLayer, FeatureStyle},
    render::thousands,
    scale::DISTRICT_GRAY,
};

use crate::commands::load_archive;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::InspectArgs) -> Result<()> {
    let collection = load_archive(&args.archive)?;
    let layer = FeatureLayer::build(&collection, |_| FeatureStyle::district(DISTRICT_GRAY), None);

    println!("[inspect] {} features, {} precincts", collection.len(), layer.len());
    if collection.len() > layer.len() {
        println!("[inspect] {} features skipped (no precinct number, precinct 0, or duplicate)", collection.len() - layer.len());
    }
    if let Some(projection) = &collection.projection {
        println!("[inspect] projection: {}", projection.lines().next().unwrap_or_default());
    }
    if let Some(extent) = layer.extent() {
        println!(
            "[inspect] extent: ({:.5}, {:.5}) - ({:.5}, {:.5})",
            extent.min().x, extent.min().y, extent.max().x, extent.max().y,
        );
    }

    let mut districts: BTreeMap<String, (usize, u64)> = BTreeMap::new();
    for feature in layer.iter() {
        let key = feature.district.clone().unwrap_or_else(|| "-".into());
        let entry = districts.entry(key).or_default();
        entry.0 += 1;
        entry.1 += feature.population.unwrap_or(0);
    }
    for (district, (precincts, population)) in &districts {
        println!("[inspect] district {district}: {precincts} precincts, population {}", thousands(*population));
    }

    if let Some(path) = &args.geojson {
        let text = serde_json::to_string(&collection.to_geojson())?;
        fs::write(path, text)
            .with_context(|| format!("[inspect] Failed to write {}", path.display()))?;
        println!("[inspect] wrote {}", path.display());
    }

    Ok(())
}
