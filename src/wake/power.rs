use crate::config::TurbineParams;
use serde::{Deserialize, Serialize};

/// Piecewise turbine power curve (speeds in m/s, power in kW).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerCurve {
    pub cut_in: f64,
    pub rated_speed: f64,
    pub cut_out: f64,
    pub rated_power: f64,
}

impl PowerCurve {
    pub fn from_params(p: &TurbineParams) -> Self {
        Self {
            cut_in: p.cut_in_speed,
            rated_speed: p.rated_speed,
            cut_out: p.cut_out_speed,
            rated_power: p.rated_power,
        }
    }

    #[inline]
    pub fn power(&self, speed: f64) -> f64 {
        if speed < self.cut_in || speed > self.cut_out {
            return 0.0;
        }
        if speed >= self.rated_speed {
            return self.rated_power;
        }
        let lo = self.cut_in.powi(3);
        let hi = self.rated_speed.powi(3);
        self.rated_power * (speed.powi(3) - lo) / (hi - lo)
    }
}

/// Logarithmic wind profile: scales `speed` measured at `from_height` to `to_height`.
#[inline]
pub fn log_profile(speed: f64, from_height: f64, to_height: f64, roughness: f64) -> f64 {
    if roughness <= 0.0 || from_height <= roughness || to_height <= roughness {
        return speed;
    }
    speed * (to_height / roughness).ln() / (from_height / roughness).ln()
}
