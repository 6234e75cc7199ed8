use super::{Grid, GridCell, WindCase, WindScenario};
use crate::error::WfResult;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Reads `id,x,y[,roughness][,elevation]` rows. Empty optional fields are `None`.
pub fn read_grid<R: Read>(reader: R) -> WfResult<Grid> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut cells = Vec::new();
    for row in rdr.deserialize::<GridCell>() {
        cells.push(row?);
    }
    debug!("Loaded {} grid cells", cells.len());
    Grid::new(cells)
}

pub fn load_grid<P: AsRef<Path>>(path: P) -> WfResult<Grid> {
    read_grid(File::open(path)?)
}

/// Reads `direction,speed,probability` rows of an already-normalized scenario.
pub fn read_wind<R: Read>(reader: R) -> WfResult<WindScenario> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut cases = Vec::new();
    for row in rdr.deserialize::<WindCase>() {
        cases.push(row?);
    }
    debug!("Loaded {} wind directions", cases.len());
    WindScenario::new(cases)
}

pub fn load_wind<P: AsRef<Path>>(path: P) -> WfResult<WindScenario> {
    read_wind(File::open(path)?)
}
