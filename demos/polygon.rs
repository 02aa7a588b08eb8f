//! Convert a GeoJSON polygon dataset to a GeoArrow Feather file.
//!
//! Expects `Utah.geojson` in the current directory and writes `utah.feather`.

use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};

use geofeather::io::geojson::read_geojson;
use geofeather::io::ipc::write_ipc;

fn main() -> Result<()> {
    let input = Path::new("Utah.geojson");
    if !input.exists() {
        bail!("{} not found; place the dataset in the current directory", input.display());
    }

    let table = read_geojson(File::open(input)?).context("reading GeoJSON")?;

    let output = File::create("utah.feather")?;
    write_ipc(&table, output).context("writing Feather file")?;
    Ok(())
}
