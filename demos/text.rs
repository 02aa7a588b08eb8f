//! Convert the cities-1000 CSV into a point dataset for text rendering.
//!
//! Expects `cities-1000.csv` in the current directory and writes `text.arrow`.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use geofeather::io::csv::read_csv;
use geofeather::io::ipc::write_ipc;
use geofeather::table::GeoTable;

const URL: &str =
    "https://raw.githubusercontent.com/visgl/deck.gl-data/master/examples/text-layer/cities-1000.csv";

fn main() -> Result<()> {
    let input = Path::new("cities-1000.csv");
    if !input.exists() {
        bail!("{} not found; download it from {URL}", input.display());
    }

    let table = read_csv(File::open(input)?, &Default::default()).context("reading CSV")?;

    // Keep only the columns the text layer needs.
    let schema = table.schema().clone();
    let batch = &table.batches()[0];
    let mut fields = Vec::new();
    let mut columns = Vec::new();
    for name in ["name", "population"] {
        let index = schema.index_of(name)?;
        fields.push(Arc::new(schema.field(index).clone()));
        columns.push(batch.column(index).clone());
    }
    let geometry = table.geometry(0)?;
    let table = GeoTable::from_arrow_and_geometry(fields, columns, geometry)?;

    let output = File::create("text.arrow")?;
    write_ipc(&table, output).context("writing Feather file")?;
    Ok(())
}
