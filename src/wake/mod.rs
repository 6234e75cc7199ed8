pub mod physics;
pub mod power;
pub mod types;

use self::physics::{combine_deficits, jensen_deficit, to_wind_frame, wake_hit, FramePoint};
use self::power::{log_profile, PowerCurve};
pub use self::types::{CellYield, DirectionalYield};
use crate::config::TurbineParams;
use crate::consts::FULL_EFFICIENCY;
use crate::error::{WfResult, WindForgeError};
use crate::site::{Grid, TerrainContext, WindCase};

/// Jensen (top-hat) wake model with a piecewise power curve.
///
/// Holds only immutable turbine parameters, so one instance is shared by
/// every worker of the fitness evaluator.
#[derive(Debug, Clone)]
pub struct WakeModel {
    pub rotor_radius: f64,
    pub hub_height: f64,
    pub reference_height: f64,
    pub surface_roughness: f64,
    pub log_profile: bool,
    pub expansion: f64,
    /// `1 - sqrt(1 - Ct)`: the deficit right behind the rotor.
    pub induction: f64,
    pub curve: PowerCurve,
}

impl WakeModel {
    pub fn new(params: &TurbineParams) -> WfResult<Self> {
        if !(params.rotor_radius > 0.0) {
            return Err(WindForgeError::Config(format!(
                "rotor_radius must be positive, got {}",
                params.rotor_radius
            )));
        }
        if !(params.thrust_coefficient > 0.0 && params.thrust_coefficient <= 1.0) {
            return Err(WindForgeError::Config(format!(
                "thrust_coefficient {} is outside (0, 1]",
                params.thrust_coefficient
            )));
        }

        Ok(Self {
            rotor_radius: params.rotor_radius,
            hub_height: params.hub_height,
            reference_height: params.reference_height,
            surface_roughness: params.surface_roughness,
            log_profile: params.log_profile,
            expansion: params.wake_expansion,
            induction: 1.0 - (1.0 - params.thrust_coefficient).sqrt(),
            curve: PowerCurve::from_params(params),
        })
    }

    /// Per-cell roughness must stay below both profile heights, like the global one.
    pub fn check_terrain(&self, grid: &Grid, terrain: &TerrainContext) -> WfResult<()> {
        if !(self.log_profile && terrain.use_roughness) {
            return Ok(());
        }
        let limit = self.hub_height.min(self.reference_height);
        for c in grid.cells() {
            if let Some(z0) = c.roughness {
                if z0 >= limit {
                    return Err(WindForgeError::Validation(format!(
                        "Cell {} roughness {} must be below hub and reference heights ({} m)",
                        c.id, z0, limit
                    )));
                }
            }
        }
        Ok(())
    }

    /// Hub-height free-stream speed of one cell for one wind case.
    pub fn free_speed(
        &self,
        grid: &Grid,
        cell: usize,
        case: &WindCase,
        terrain: &TerrainContext,
        base_elevation: f64,
    ) -> f64 {
        let speed = match &terrain.weibull_speeds {
            Some(field) => field[cell],
            None => case.speed,
        };

        if !self.log_profile {
            return speed;
        }

        let c = grid.cell(cell);
        let roughness = if terrain.use_roughness {
            c.roughness.unwrap_or(self.surface_roughness)
        } else {
            self.surface_roughness
        };
        let height = if terrain.use_elevation {
            self.hub_height + c.elevation.map_or(0.0, |e| (e - base_elevation).max(0.0))
        } else {
            self.hub_height
        };

        log_profile(speed, self.reference_height, height, roughness)
    }

    /// Evaluates one layout (given by occupied cell indices) under one wind case.
    pub fn evaluate(
        &self,
        grid: &Grid,
        occupied: &[usize],
        case: &WindCase,
        terrain: &TerrainContext,
    ) -> DirectionalYield {
        let base_elevation = if terrain.use_elevation {
            grid.base_elevation()
        } else {
            0.0
        };

        let frame: Vec<FramePoint> = occupied
            .iter()
            .map(|&i| {
                let c = grid.cell(i);
                to_wind_frame(c.x, c.y, case.direction)
            })
            .collect();

        let mut cells = Vec::with_capacity(occupied.len());
        let mut deficits = Vec::new();
        let mut power = 0.0;
        let mut potential_power = 0.0;

        for (j, &cell) in occupied.iter().enumerate() {
            deficits.clear();
            for (i, up) in frame.iter().enumerate() {
                if i == j {
                    continue;
                }
                if let Some(hit) = wake_hit(*up, frame[j], self.rotor_radius, self.expansion) {
                    deficits.push(jensen_deficit(&hit, self.rotor_radius, self.induction));
                }
            }

            let free_speed = self.free_speed(grid, cell, case, terrain, base_elevation);
            let deficit = combine_deficits(&deficits);
            let net_speed = (free_speed * (1.0 - deficit)).max(0.0);

            let p = self.curve.power(net_speed);
            let p0 = self.curve.power(free_speed);
            power += p;
            potential_power += p0;

            cells.push(CellYield {
                cell,
                free_speed,
                net_speed,
                power: p,
                potential_power: p0,
                shaded_by: deficits.len(),
            });
        }

        DirectionalYield {
            direction: case.direction,
            probability: case.probability,
            cells,
            power,
            potential_power,
            efficiency: efficiency(power, potential_power),
        }
    }
}

/// Realized share of the wake-free potential, in percent.
#[inline]
pub fn efficiency(realized: f64, potential: f64) -> f64 {
    if potential > 0.0 {
        realized / potential * FULL_EFFICIENCY
    } else {
        FULL_EFFICIENCY
    }
}
