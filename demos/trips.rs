//! Convert the deck.gl trips dataset to a GeoArrow Feather file where each trip is a
//! linestring plus a per-vertex timestamp list sharing the geometry offsets.
//!
//! Expects `trips-v7.json` in the current directory and writes `trips.feather`.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow_array::{Float32Array, GenericListArray, UInt8Array};
use arrow_schema::{DataType, Field};
use serde::Deserialize;

use geofeather::array::LineStringArray;
use geofeather::io::ipc::write_ipc;
use geofeather::table::GeoTable;

const URL: &str =
    "https://raw.githubusercontent.com/visgl/deck.gl-data/master/examples/trips/trips-v7.json";

#[derive(Debug, Deserialize)]
struct Trip {
    vendor: u8,
    path: Vec<[f64; 2]>,
    timestamps: Vec<f32>,
}

fn main() -> Result<()> {
    let input = Path::new("trips-v7.json");
    if !input.exists() {
        bail!("{} not found; download it from {URL}", input.display());
    }

    let trips: Vec<Trip> = serde_json::from_reader(File::open(input)?).context("parsing JSON")?;

    let mut flat_timestamps = Vec::new();
    let mut vendors = Vec::with_capacity(trips.len());
    let mut lines = Vec::with_capacity(trips.len());
    for trip in &trips {
        if trip.path.len() != trip.timestamps.len() {
            bail!(
                "trip has {} coordinates but {} timestamps",
                trip.path.len(),
                trip.timestamps.len()
            );
        }
        flat_timestamps.extend_from_slice(&trip.timestamps);
        vendors.push(trip.vendor);
        lines.push(geo::LineString::from(trip.path.clone()));
    }

    let geometry: LineStringArray = lines.into();

    // Timestamps align one-to-one with trip vertices, so the list column reuses the
    // geometry's offsets.
    let timestamps = GenericListArray::<i32>::new(
        Arc::new(Field::new("item", DataType::Float32, true)),
        geometry.geom_offsets().clone(),
        Arc::new(Float32Array::from(flat_timestamps)),
        None,
    );

    let mut table = GeoTable::from_geometry(Arc::new(geometry))?;
    table.append_column(
        Arc::new(Field::new(
            "timestamps",
            arrow_array::Array::data_type(&timestamps).clone(),
            true,
        )),
        vec![Arc::new(timestamps)],
    )?;
    table.append_column(
        Arc::new(Field::new("vendor", DataType::UInt8, false)),
        vec![Arc::new(UInt8Array::from(vendors))],
    )?;

    let output = File::create("trips.feather")?;
    write_ipc(&table, output).context("writing Feather file")?;
    Ok(())
}
