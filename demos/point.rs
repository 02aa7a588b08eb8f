//! Convert the Ookla mobile network performance tiles to a GeoArrow Feather file of
//! tile centroids, with an RGB color column derived from download speed.
//!
//! Expects `2019-01-01_performance_mobile_tiles.parquet` in the current directory and
//! writes `2019-01-01_performance_mobile_tiles.feather`. Build with the `parquet`
//! feature.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::compute::concat_batches;
use arrow_array::cast::AsArray;
use arrow_array::types::UInt32Type;
use arrow_cast::cast;
use arrow_schema::{DataType, Field, FieldRef};
use geo::Centroid;

use geofeather::algorithm::colormap::{apply_continuous_cmap, BRBG_10};
use geofeather::array::from_geometries;
use geofeather::io::ipc::write_ipc;
use geofeather::io::parquet::read_parquet;
use geofeather::io::wkt::parse_wkt_column;
use geofeather::table::GeoTable;

const URL: &str = "https://ookla-open-data.s3.us-west-2.amazonaws.com/parquet/performance/type=mobile/year=2019/quarter=1/2019-01-01_performance_mobile_tiles.parquet";

const KEPT_COLUMNS: [&str; 3] = ["avg_d_kbps", "avg_u_kbps", "avg_lat_ms"];

const MIN_BOUND: f64 = 5_000.0;
const MAX_BOUND: f64 = 50_000.0;

fn main() -> Result<()> {
    let input = Path::new("2019-01-01_performance_mobile_tiles.parquet");
    if !input.exists() {
        bail!("{} not found; download it from {URL}", input.display());
    }

    let (schema, batches) = read_parquet(File::open(input)?, 65_536)?;
    let batch = concat_batches(&schema, &batches)?;

    // Each tile arrives as a WKT polygon; the layer renders its centroid.
    let tile_index = schema.index_of("tile")?;
    let tiles = parse_wkt_column(batch.column(tile_index).as_ref())?;
    let centroids: Vec<Option<geo::Geometry>> = tiles
        .iter()
        .map(|tile| {
            tile.as_ref()
                .and_then(|geometry| geometry.centroid())
                .map(geo::Geometry::Point)
        })
        .collect();
    let geometry = from_geometries(&centroids, Default::default())?;

    // Save space by using a smaller data type.
    let mut fields: Vec<FieldRef> = Vec::new();
    let mut columns = Vec::new();
    for name in KEPT_COLUMNS {
        let index = schema.index_of(name)?;
        let field = schema.field(index);
        fields.push(Arc::new(Field::new(
            field.name(),
            DataType::UInt32,
            field.is_nullable(),
        )));
        columns.push(cast(batch.column(index), &DataType::UInt32)?);
    }

    let download_speed: Vec<f64> = columns[0]
        .as_primitive::<UInt32Type>()
        .iter()
        .map(|value| {
            (value.unwrap_or(0) as f64 - MIN_BOUND) / (MAX_BOUND - MIN_BOUND)
        })
        .collect();

    let mut table = GeoTable::from_arrow_and_geometry(fields, columns, geometry)?;

    let colors = apply_continuous_cmap(&download_speed, &BRBG_10);
    let colors_field = Field::new("colors", arrow_array::Array::data_type(&colors).clone(), true);
    table.append_column(Arc::new(colors_field), vec![Arc::new(colors)])?;

    let output = File::create("2019-01-01_performance_mobile_tiles.feather")?;
    write_ipc(&table, output).context("writing Feather file")?;
    Ok(())
}
