//! Convert the Natural Earth admin-0 countries dataset to a GeoArrow Feather file,
//! with an RGBA color column derived from population.
//!
//! Expects `ne_10m_admin_0_countries.geojson` in the current directory and writes
//! `ne_10m_admin_0_countries.feather`.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::compute::{max, min};
use arrow_array::cast::AsArray;
use arrow_array::types::{Float64Type, Int64Type};
use arrow_array::{Array, ArrayRef, RecordBatch};
use arrow_cast::cast;
use arrow_schema::{DataType, Field};

use geofeather::algorithm::colormap::{apply_continuous_cmap_alpha, normalize, PRGN_11};
use geofeather::io::geojson::read_geojson;
use geofeather::io::ipc::write_ipc;
use geofeather::table::GeoTable;

const URL: &str = "https://naciscdn.org/naturalearth/10m/cultural/ne_10m_admin_0_countries.zip";

/// The smallest integer type the column's value range fits in.
fn downcast_type(batch: &RecordBatch, index: usize) -> Option<DataType> {
    let column = batch.column(index).as_primitive_opt::<Int64Type>()?;
    let low = min(column)?;
    let high = max(column)?;
    for candidate in [DataType::Int8, DataType::Int16, DataType::Int32] {
        let (fits_low, fits_high) = match candidate {
            DataType::Int8 => (i8::MIN as i64, i8::MAX as i64),
            DataType::Int16 => (i16::MIN as i64, i16::MAX as i64),
            _ => (i32::MIN as i64, i32::MAX as i64),
        };
        if low >= fits_low && high <= fits_high {
            return Some(candidate);
        }
    }
    None
}

/// Downcast wide integer columns so downstream JSON serializers can handle them.
fn downcast_integer_columns(table: GeoTable) -> Result<GeoTable> {
    let geometry = table.geometry(0)?;
    let schema = table.schema().clone();
    let batch = &table.batches()[0];
    let geometry_index = table.geometry_column_index();

    let mut fields = Vec::new();
    let mut columns = Vec::new();
    for (index, field) in schema.fields().iter().enumerate() {
        if index == geometry_index {
            continue;
        }
        match downcast_type(batch, index) {
            Some(target) => {
                fields.push(Arc::new(
                    Field::new(field.name(), target.clone(), field.is_nullable()),
                ));
                columns.push(cast(batch.column(index), &target)?);
            }
            None => {
                fields.push(field.clone());
                columns.push(batch.column(index).clone());
            }
        }
    }
    Ok(GeoTable::from_arrow_and_geometry(fields, columns, geometry)?)
}

fn main() -> Result<()> {
    let input = Path::new("ne_10m_admin_0_countries.geojson");
    if !input.exists() {
        bail!(
            "{} not found; download {URL} and convert it to GeoJSON",
            input.display()
        );
    }

    let table = read_geojson(File::open(input)?).context("reading GeoJSON")?;
    let mut table = downcast_integer_columns(table)?;

    let population_index = table.schema().index_of("POP_EST")?;
    let population = cast(
        table.batches()[0].column(population_index),
        &DataType::Float64,
    )?;
    let log_population: Vec<f64> = population
        .as_primitive::<Float64Type>()
        .iter()
        .map(|value| {
            let value = value.unwrap_or(0.0);
            if value == 0.0 {
                0.0
            } else {
                value.log10()
            }
        })
        .collect();

    let colors = apply_continuous_cmap_alpha(&normalize(&log_population), &PRGN_11, 0.5);
    let colors_field = Field::new("pop_colors", colors.data_type().clone(), true);
    let colors: ArrayRef = Arc::new(colors);
    table.append_column(Arc::new(colors_field), vec![colors])?;

    let output = File::create("ne_10m_admin_0_countries.feather")?;
    write_ipc(&table, output).context("writing Feather file")?;
    Ok(())
}
