/// Thrust coefficient of the reference turbine (Jensen wake model).
pub const DEFAULT_THRUST_COEFFICIENT: f64 = 0.88;

/// Linear wake expansion coefficient `k` (wake radius grows by `k` per metre downwind).
pub const DEFAULT_WAKE_EXPANSION: f64 = 0.094;

/// Hours used to turn expected power (kW) into expected annual energy (kWh).
pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Offsets at or below this distance (metres) are treated as zero.
pub const GEOMETRY_EPSILON: f64 = 1e-9;

/// Efficiency of a wake-free layout, in percent.
pub const FULL_EFFICIENCY: f64 = 100.0;

/// Slack allowed when comparing an efficiency against `FULL_EFFICIENCY`.
pub const EFFICIENCY_TOLERANCE: f64 = 1e-9;

/// Allowed deviation of the scenario's probability sum from 100.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Floor added to repair roulette weights, relative to the best cell score.
pub const REPAIR_WEIGHT_FLOOR: f64 = 0.01;
