pub mod loader;

use crate::consts::PROBABILITY_TOLERANCE;
use crate::error::{WfResult, WindForgeError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One candidate turbine position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub id: u32,
    pub x: f64, // metres, east
    pub y: f64, // metres, north

    #[serde(default)]
    pub roughness: Option<f64>,
    #[serde(default)]
    pub elevation: Option<f64>,
}

impl GridCell {
    pub fn new(id: u32, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            roughness: None,
            elevation: None,
        }
    }
}

/// The fixed, ordered set of candidate positions for one run.
#[derive(Debug, Clone, Serialize)]
pub struct Grid {
    cells: Vec<GridCell>,
    #[serde(skip)]
    index: HashMap<u32, usize>,
}

impl Grid {
    pub fn new(cells: Vec<GridCell>) -> WfResult<Self> {
        if cells.is_empty() {
            return Err(WindForgeError::Validation("Grid has 0 cells".to_string()));
        }

        let mut index = HashMap::with_capacity(cells.len());
        for (i, c) in cells.iter().enumerate() {
            if !(c.x.is_finite() && c.y.is_finite()) {
                return Err(WindForgeError::Validation(format!(
                    "Cell {} has non-finite coordinates",
                    c.id
                )));
            }
            if let Some(z0) = c.roughness {
                if !(z0 > 0.0 && z0.is_finite()) {
                    return Err(WindForgeError::Validation(format!(
                        "Cell {} has invalid roughness {}",
                        c.id, z0
                    )));
                }
            }
            if index.insert(c.id, i).is_some() {
                return Err(WindForgeError::Validation(format!(
                    "Duplicate cell id {}",
                    c.id
                )));
            }
        }

        Ok(Self { cells, index })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    #[inline]
    pub fn cell(&self, i: usize) -> &GridCell {
        &self.cells[i]
    }

    pub fn index_of(&self, id: u32) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Lowest elevation among cells that carry one; 0 when none do.
    pub fn base_elevation(&self) -> f64 {
        self.cells
            .iter()
            .filter_map(|c| c.elevation)
            .reduce(f64::min)
            .unwrap_or(0.0)
    }

    pub fn ids_of(&self, indices: &[usize]) -> Vec<u32> {
        indices.iter().map(|&i| self.cells[i].id).collect()
    }
}

/// A single wind condition: direction (degrees the wind blows FROM, clockwise
/// from north), mean speed at the reference height, probability in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindCase {
    pub direction: f64,
    pub speed: f64,
    pub probability: f64,
}

impl WindCase {
    pub fn new(direction: f64, speed: f64, probability: f64) -> Self {
        Self {
            direction,
            speed,
            probability,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindScenario {
    cases: Vec<WindCase>,
}

impl WindScenario {
    pub fn new(cases: Vec<WindCase>) -> WfResult<Self> {
        if cases.is_empty() {
            return Err(WindForgeError::Config(
                "Wind scenario has no directions".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut total = 0.0;
        for case in &cases {
            if !(0.0..360.0).contains(&case.direction) {
                return Err(WindForgeError::Config(format!(
                    "Wind direction {} is outside [0, 360)",
                    case.direction
                )));
            }
            if !(case.speed >= 0.0 && case.speed.is_finite()) {
                return Err(WindForgeError::Config(format!(
                    "Wind speed {} at {} deg is invalid",
                    case.speed, case.direction
                )));
            }
            if !(case.probability >= 0.0 && case.probability.is_finite()) {
                return Err(WindForgeError::Config(format!(
                    "Probability {} at {} deg is invalid",
                    case.probability, case.direction
                )));
            }
            if !seen.insert(case.direction.to_bits()) {
                return Err(WindForgeError::Config(format!(
                    "Wind direction {} appears more than once",
                    case.direction
                )));
            }
            total += case.probability;
        }

        if (total - 100.0).abs() > PROBABILITY_TOLERANCE {
            return Err(WindForgeError::Config(format!(
                "Wind probabilities sum to {}, expected 100",
                total
            )));
        }

        Ok(Self { cases })
    }

    /// A single direction carrying all of the probability mass.
    pub fn single(direction: f64, speed: f64) -> WfResult<Self> {
        Self::new(vec![WindCase::new(direction, speed, 100.0)])
    }

    pub fn cases(&self) -> &[WindCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Optional site context supplied by external terrain / wind-resource tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerrainContext {
    /// Use each cell's own roughness (when present) in the height profile.
    pub use_roughness: bool,
    /// Raise each hub by the cell's elevation above the lowest cell.
    pub use_elevation: bool,
    /// Per-cell mean speed replacing the scenario speed (Weibull-derived).
    pub weibull_speeds: Option<Vec<f64>>,
}

impl TerrainContext {
    pub fn validate(&self, grid: &Grid) -> WfResult<()> {
        if let Some(speeds) = &self.weibull_speeds {
            if speeds.len() != grid.len() {
                return Err(WindForgeError::Validation(format!(
                    "Weibull speed field has {} entries for {} cells",
                    speeds.len(),
                    grid.len()
                )));
            }
            if let Some(bad) = speeds.iter().find(|s| !(**s >= 0.0 && s.is_finite())) {
                return Err(WindForgeError::Validation(format!(
                    "Weibull speed field contains invalid speed {}",
                    bad
                )));
            }
        }
        Ok(())
    }
}
