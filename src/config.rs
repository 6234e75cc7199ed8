use crate::consts::{DEFAULT_THRUST_COEFFICIENT, DEFAULT_WAKE_EXPANSION};
use crate::error::{WfResult, WindForgeError};
use clap::{parser::ValueSource, ArgAction, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub search: SearchParams,
    #[command(flatten)]
    pub operators: OperatorParams,
    #[command(flatten)]
    pub turbine: TurbineParams,
    #[command(flatten)]
    pub fuzzy: FuzzyParams,
}

/// How survivors are counted each generation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter, Display,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum SelectionMethod {
    /// Alternates between keeping everything and keeping half.
    Fix,
    /// Uses the fraction tuned by the adaptive controller.
    Var,
}

/// How crossover split points are placed along the genome.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter, Display,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum CrossoverMethod {
    Equ,
    Ran,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter, Display,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    Energy,
    Efficiency,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Number of turbines every layout must hold.
    #[arg(short = 'n', long, default_value_t = 10)]
    pub turbines: usize,
    #[arg(long, default_value_t = 100)]
    pub max_iterations: usize,
    #[arg(long, default_value_t = 50)]
    pub initial_population: usize,
    #[arg(long, default_value_t = 200)]
    pub max_population: usize,
    #[arg(long, default_value = "energy")]
    pub objective: Objective,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub stop_on_full_efficiency: bool,
    /// Fitness worker threads (0 = rayon default pool).
    #[arg(long, default_value_t = 0)]
    pub workers: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            turbines: 10,
            max_iterations: 100,
            initial_population: 50,
            max_population: 200,
            objective: Objective::Energy,
            stop_on_full_efficiency: true,
            workers: 0,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorParams {
    #[arg(long, default_value = "VAR")]
    pub selection_method: SelectionMethod,
    #[arg(long, default_value = "EQU")]
    pub crossover_method: CrossoverMethod,
    #[arg(long, default_value_t = 0.01)]
    pub mutation_rate: f64,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub trim_force: bool,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub elitism: bool,
    #[arg(long, default_value_t = 2)]
    pub elite_count: usize,
}

impl Default for OperatorParams {
    fn default() -> Self {
        Self {
            selection_method: SelectionMethod::Var,
            crossover_method: CrossoverMethod::Equ,
            mutation_rate: 0.01,
            trim_force: true,
            elitism: true,
            elite_count: 2,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TurbineParams {
    // === ROTOR & HEIGHTS (metres) ===
    #[arg(long, default_value_t = 20.0)]
    pub rotor_radius: f64,
    #[arg(long, default_value_t = 60.0)]
    pub hub_height: f64,
    /// Height at which the scenario speeds were measured.
    #[arg(long, default_value_t = 10.0)]
    pub reference_height: f64,

    // === WIND PROFILE ===
    #[arg(long, default_value_t = 0.3)]
    pub surface_roughness: f64,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub log_profile: bool,

    // === WAKE ===
    #[arg(long, default_value_t = DEFAULT_THRUST_COEFFICIENT)]
    pub thrust_coefficient: f64,
    #[arg(long, default_value_t = DEFAULT_WAKE_EXPANSION)]
    pub wake_expansion: f64,

    // === POWER CURVE (m/s, kW) ===
    #[arg(long, default_value_t = 3.5)]
    pub cut_in_speed: f64,
    #[arg(long, default_value_t = 14.0)]
    pub rated_speed: f64,
    #[arg(long, default_value_t = 25.0)]
    pub cut_out_speed: f64,
    #[arg(long, default_value_t = 1500.0)]
    pub rated_power: f64,
}

impl Default for TurbineParams {
    fn default() -> Self {
        Self {
            rotor_radius: 20.0,
            hub_height: 60.0,
            reference_height: 10.0,
            surface_roughness: 0.3,
            log_profile: true,
            thrust_coefficient: DEFAULT_THRUST_COEFFICIENT,
            wake_expansion: DEFAULT_WAKE_EXPANSION,
            cut_in_speed: 3.5,
            rated_speed: 14.0,
            cut_out_speed: 25.0,
            rated_power: 1500.0,
        }
    }
}

/// Constants of the adaptive selection/crossover controller.
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyParams {
    // === SELECTION DIVISOR (fraction kept = 1 - 1/divisor) ===
    #[arg(long, default_value_t = 8.0)]
    pub divisor_initial: f64,
    #[arg(long, default_value_t = 4.0)]
    pub divisor_floor: f64,
    #[arg(long, default_value_t = 20.0)]
    pub divisor_ceiling: f64,
    #[arg(long, default_value_t = 1.0)]
    pub divisor_step: f64,

    // === CROSSOVER POINTS ===
    #[arg(long, default_value_t = 2)]
    pub cross_points_initial: usize,
    #[arg(long, default_value_t = 1)]
    pub cross_points_min: usize,
    #[arg(long, default_value_t = 10)]
    pub cross_points_max: usize,
    #[arg(long, default_value_t = 4)]
    pub cross_points_boost: usize,

    // === TREND WEIGHTS ===
    #[arg(long, default_value_t = 0.8)]
    pub weight_max: f64,
    #[arg(long, default_value_t = 0.2)]
    pub weight_mean: f64,
    #[arg(long, default_value_t = 0.0)]
    pub weight_min: f64,

    // === RECOVERY ===
    #[arg(long, default_value_t = 20)]
    pub diversity_threshold: usize,
    #[arg(long, default_value_t = 20)]
    pub stagnation_start: usize,
    #[arg(long, default_value_t = 6)]
    pub stagnation_window: usize,
}

impl Default for FuzzyParams {
    fn default() -> Self {
        Self {
            divisor_initial: 8.0,
            divisor_floor: 4.0,
            divisor_ceiling: 20.0,
            divisor_step: 1.0,
            cross_points_initial: 2,
            cross_points_min: 1,
            cross_points_max: 10,
            cross_points_boost: 4,
            weight_max: 0.8,
            weight_mean: 0.2,
            weight_min: 0.0,
            diversity_threshold: 20,
            stagnation_start: 20,
            stagnation_window: 6,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> WfResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parses a (possibly partial) JSON config; missing fields take defaults.
    pub fn from_json_str(content: &str) -> WfResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| WindForgeError::Config(format!("Invalid config JSON: {}", e)))
    }

    /// Overlays the values the user typed on the command line onto a file-loaded config.
    ///
    /// `matches` must be the matches of the subcommand that flattened `cli`.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($section:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$section.$field = cli.$section.$field.clone();
                }
            };
        }

        update_if_present!(search.turbines);
        update_if_present!(search.max_iterations);
        update_if_present!(search.initial_population);
        update_if_present!(search.max_population);
        update_if_present!(search.objective);
        update_if_present!(search.stop_on_full_efficiency);
        update_if_present!(search.workers);

        update_if_present!(operators.selection_method);
        update_if_present!(operators.crossover_method);
        update_if_present!(operators.mutation_rate);
        update_if_present!(operators.trim_force);
        update_if_present!(operators.elitism);
        update_if_present!(operators.elite_count);

        update_if_present!(turbine.rotor_radius);
        update_if_present!(turbine.hub_height);
        update_if_present!(turbine.reference_height);
        update_if_present!(turbine.surface_roughness);
        update_if_present!(turbine.log_profile);
        update_if_present!(turbine.thrust_coefficient);
        update_if_present!(turbine.wake_expansion);
        update_if_present!(turbine.cut_in_speed);
        update_if_present!(turbine.rated_speed);
        update_if_present!(turbine.cut_out_speed);
        update_if_present!(turbine.rated_power);

        update_if_present!(fuzzy.divisor_initial);
        update_if_present!(fuzzy.divisor_floor);
        update_if_present!(fuzzy.divisor_ceiling);
        update_if_present!(fuzzy.divisor_step);
        update_if_present!(fuzzy.cross_points_initial);
        update_if_present!(fuzzy.cross_points_min);
        update_if_present!(fuzzy.cross_points_max);
        update_if_present!(fuzzy.cross_points_boost);
        update_if_present!(fuzzy.weight_max);
        update_if_present!(fuzzy.weight_mean);
        update_if_present!(fuzzy.weight_min);
        update_if_present!(fuzzy.diversity_threshold);
        update_if_present!(fuzzy.stagnation_start);
        update_if_present!(fuzzy.stagnation_window);
    }

    /// Checks every parameter against the grid it will run on.
    pub fn validate(&self, cell_count: usize) -> WfResult<()> {
        self.search.validate(cell_count)?;
        self.operators.validate()?;
        self.turbine.validate()?;
        self.fuzzy.validate()
    }
}

fn config_err<T>(msg: String) -> WfResult<T> {
    Err(WindForgeError::Config(msg))
}

impl SearchParams {
    fn validate(&self, cell_count: usize) -> WfResult<()> {
        if self.turbines == 0 {
            return config_err("turbine count must be greater than 0".to_string());
        }
        if self.turbines > cell_count {
            return config_err(format!(
                "turbine count {} exceeds the {} available grid cells",
                self.turbines, cell_count
            ));
        }
        if self.max_iterations == 0 {
            return config_err("max_iterations must be greater than 0".to_string());
        }
        if self.max_population == 0 {
            return config_err("max_population must be greater than 0".to_string());
        }
        if self.initial_population == 0 {
            return config_err("initial_population must be greater than 0".to_string());
        }
        if self.initial_population > self.max_population {
            return config_err(format!(
                "initial_population {} exceeds max_population {}",
                self.initial_population, self.max_population
            ));
        }
        Ok(())
    }
}

impl OperatorParams {
    fn validate(&self) -> WfResult<()> {
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return config_err(format!(
                "mutation_rate {} is outside [0, 1]",
                self.mutation_rate
            ));
        }
        Ok(())
    }
}

impl TurbineParams {
    fn validate(&self) -> WfResult<()> {
        if !(self.rotor_radius > 0.0 && self.rotor_radius.is_finite()) {
            return config_err(format!(
                "rotor_radius must be positive, got {}",
                self.rotor_radius
            ));
        }
        if !(self.hub_height > 0.0 && self.reference_height > 0.0) {
            return config_err("hub_height and reference_height must be positive".to_string());
        }
        if self.log_profile {
            let z0 = self.surface_roughness;
            if !(z0 > 0.0 && z0 < self.hub_height && z0 < self.reference_height) {
                return config_err(format!(
                    "surface_roughness {} must be positive and below both heights",
                    z0
                ));
            }
        }
        if !(self.thrust_coefficient > 0.0 && self.thrust_coefficient <= 1.0) {
            return config_err(format!(
                "thrust_coefficient {} is outside (0, 1]",
                self.thrust_coefficient
            ));
        }
        if !(self.wake_expansion >= 0.0) {
            return config_err("wake_expansion must be non-negative".to_string());
        }
        if !(self.cut_in_speed >= 0.0
            && self.cut_in_speed < self.rated_speed
            && self.rated_speed <= self.cut_out_speed)
        {
            return config_err(format!(
                "power curve speeds must satisfy 0 <= cut_in < rated <= cut_out ({} / {} / {})",
                self.cut_in_speed, self.rated_speed, self.cut_out_speed
            ));
        }
        if !(self.rated_power > 0.0) {
            return config_err("rated_power must be positive".to_string());
        }
        Ok(())
    }
}

impl FuzzyParams {
    fn validate(&self) -> WfResult<()> {
        if !(self.divisor_floor >= 1.0 && self.divisor_floor <= self.divisor_ceiling) {
            return config_err(format!(
                "divisor floor {} must be >= 1 and <= ceiling {}",
                self.divisor_floor, self.divisor_ceiling
            ));
        }
        if !(self.divisor_step > 0.0) {
            return config_err("divisor_step must be positive".to_string());
        }
        if self.cross_points_min == 0 || self.cross_points_min > self.cross_points_max {
            return config_err(format!(
                "crossover point bounds invalid: min {} max {}",
                self.cross_points_min, self.cross_points_max
            ));
        }
        if self.stagnation_window == 0 {
            return config_err("stagnation_window must be greater than 0".to_string());
        }
        Ok(())
    }
}
