use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellYield {
    /// Index of the cell in the grid.
    pub cell: usize,
    /// Hub-height speed without wakes.
    pub free_speed: f64,
    /// Hub-height speed after wake deficits.
    pub net_speed: f64,
    pub power: f64,
    pub potential_power: f64,
    /// Number of upwind rotors shading this one.
    pub shaded_by: usize,
}

/// Result of one layout under one wind direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionalYield {
    pub direction: f64,
    pub probability: f64,
    pub cells: Vec<CellYield>,
    pub power: f64,
    pub potential_power: f64,
    pub efficiency: f64,
}
