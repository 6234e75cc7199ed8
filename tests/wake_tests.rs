mod common;

use common::*;
use rstest::rstest;
use windforge::config::TurbineParams;
use windforge::consts::{DEFAULT_THRUST_COEFFICIENT, DEFAULT_WAKE_EXPANSION};
use windforge::site::{Grid, GridCell, TerrainContext, WindCase};
use windforge::wake::power::PowerCurve;
use windforge::wake::{efficiency, WakeModel};

fn curve() -> PowerCurve {
    PowerCurve::from_params(&TurbineParams::default())
}

// --- POWER CURVE ---
#[rstest]
#[case(0.0, 0.0)]
#[case(3.0, 0.0)] // below cut-in
#[case(3.5, 0.0)] // ramp starts at zero
#[case(14.0, 1500.0)] // rated
#[case(20.0, 1500.0)] // plateau
#[case(25.0, 1500.0)] // still producing at cut-out
#[case(25.1, 0.0)] // storm shutdown
fn test_power_curve_segments(#[case] speed: f64, #[case] expected: f64) {
    let p = curve().power(speed);
    assert!((p - expected).abs() < 1e-9, "P({}) = {}", speed, p);
}

#[test]
fn test_power_curve_cubic_ramp() {
    let c = curve();
    let expected = 1500.0 * (1000.0 - 3.5f64.powi(3)) / (14f64.powi(3) - 3.5f64.powi(3));
    assert!((c.power(10.0) - expected).abs() < 1e-9);
    assert!(c.power(8.0) < c.power(9.0));
}

// --- SINGLE TURBINE ---
#[rstest]
#[case(0.0)]
#[case(45.0)]
#[case(90.0)]
#[case(180.0)]
#[case(270.0)]
#[case(359.9)]
fn test_single_turbine_is_fully_efficient(#[case] direction: f64) {
    let grid = lattice(3, 3, 100.0);
    let model = flat_model();
    let y = model.evaluate(&grid, &[4], &WindCase::new(direction, 10.0, 100.0), &TerrainContext::default());
    assert_eq!(y.efficiency, 100.0);
    assert_eq!(y.cells[0].shaded_by, 0);
}

// --- WAKE GEOMETRY ---
#[test]
fn test_downstream_turbine_is_slowed() {
    // Cell 0 at y=0, cell 1 at y=100: a north wind hits cell 1 first.
    let grid = column(2, 100.0);
    let model = flat_model();
    let y = model.evaluate(&grid, &[0, 1], &WindCase::new(0.0, 10.0, 100.0), &TerrainContext::default());

    let upwind = &y.cells[1];
    let downwind = &y.cells[0];
    assert_eq!(upwind.net_speed, 10.0);
    assert_eq!(downwind.shaded_by, 1);

    let induction = 1.0 - (1.0 - DEFAULT_THRUST_COEFFICIENT).sqrt();
    let ratio = 20.0 / (20.0 + DEFAULT_WAKE_EXPANSION * 100.0);
    let expected = 10.0 * (1.0 - induction * ratio * ratio);
    assert!((downwind.net_speed - expected).abs() < 1e-9, "{} vs {}", downwind.net_speed, expected);
    assert!(y.efficiency < 100.0);
}

#[test]
fn test_crosswind_neighbours_do_not_interact() {
    let grid = column(2, 100.0);
    let y = flat_model().evaluate(&grid, &[0, 1], &WindCase::new(90.0, 10.0, 100.0), &TerrainContext::default());
    assert_eq!(y.efficiency, 100.0);
    assert!(y.cells.iter().all(|c| c.shaded_by == 0));
}

#[test]
fn test_reversed_wind_shades_the_other_turbine() {
    let grid = column(2, 100.0);
    let y = flat_model().evaluate(&grid, &[0, 1], &WindCase::new(180.0, 10.0, 100.0), &TerrainContext::default());
    assert_eq!(y.cells[0].shaded_by, 0);
    assert_eq!(y.cells[1].shaded_by, 1);
}

#[test]
fn test_coincident_cells_saturate_without_nan() {
    let grid = Grid::new(vec![GridCell::new(1, 50.0, 50.0), GridCell::new(2, 50.0, 50.0)]).unwrap();
    let y = flat_model().evaluate(&grid, &[0, 1], &WindCase::new(0.0, 10.0, 100.0), &TerrainContext::default());

    let induction = 1.0 - (1.0 - DEFAULT_THRUST_COEFFICIENT).sqrt();
    for c in &y.cells {
        assert!(c.net_speed.is_finite());
        assert!((c.net_speed - 10.0 * (1.0 - induction)).abs() < 1e-9);
    }
    assert!(y.efficiency.is_finite());
}

#[test]
fn test_efficiency_non_increasing_as_turbines_pack_closer() {
    let model = flat_model();
    let case = WindCase::new(0.0, 10.0, 100.0);
    let mut last = f64::INFINITY;
    for spacing in [1000.0, 600.0, 300.0, 150.0, 80.0, 40.0, 10.0] {
        let grid = column(3, spacing);
        let eff = model
            .evaluate(&grid, &[0, 1, 2], &case, &TerrainContext::default())
            .efficiency;
        assert!(eff <= last + 1e-12, "spacing {}: {} > {}", spacing, eff, last);
        last = eff;
    }
    assert!(last < 100.0);
}

#[test]
fn test_efficiency_of_zero_potential_is_full() {
    assert_eq!(efficiency(0.0, 0.0), 100.0);
    assert_eq!(efficiency(50.0, 100.0), 50.0);

    // Below cut-in nothing is produced and nothing is lost.
    let grid = column(2, 100.0);
    let y = flat_model().evaluate(&grid, &[0, 1], &WindCase::new(0.0, 2.0, 100.0), &TerrainContext::default());
    assert_eq!(y.potential_power, 0.0);
    assert_eq!(y.efficiency, 100.0);
}

// --- HEIGHT PROFILE AND TERRAIN ---
#[test]
fn test_log_profile_scales_to_hub_height() {
    let model = WakeModel::new(&TurbineParams::default()).unwrap();
    let grid = column(1, 100.0);
    let v = model.free_speed(&grid, 0, &WindCase::new(0.0, 10.0, 100.0), &TerrainContext::default(), 0.0);
    let expected = 10.0 * (60.0f64 / 0.3).ln() / (10.0f64 / 0.3).ln();
    assert!((v - expected).abs() < 1e-9);
    assert!(v > 10.0);
}

#[test]
fn test_cell_roughness_used_when_enabled() {
    let model = WakeModel::new(&TurbineParams::default()).unwrap();
    let mut cell = GridCell::new(0, 0.0, 0.0);
    cell.roughness = Some(0.01);
    let grid = Grid::new(vec![cell]).unwrap();
    let case = WindCase::new(0.0, 10.0, 100.0);

    let global = model.free_speed(&grid, 0, &case, &TerrainContext::default(), 0.0);
    let terrain = TerrainContext {
        use_roughness: true,
        ..Default::default()
    };
    let local = model.free_speed(&grid, 0, &case, &terrain, 0.0);
    let expected = 10.0 * (60.0f64 / 0.01).ln() / (10.0f64 / 0.01).ln();
    assert!((local - expected).abs() < 1e-9);
    assert!(local < global);
}

#[test]
fn test_elevated_cell_sees_faster_wind() {
    let model = WakeModel::new(&TurbineParams::default()).unwrap();
    let mut low = GridCell::new(0, 0.0, 0.0);
    low.elevation = Some(100.0);
    let mut high = GridCell::new(1, 500.0, 0.0);
    high.elevation = Some(140.0);
    let grid = Grid::new(vec![low, high]).unwrap();

    let terrain = TerrainContext {
        use_elevation: true,
        ..Default::default()
    };
    let y = model.evaluate(&grid, &[0, 1], &WindCase::new(0.0, 10.0, 100.0), &terrain);
    let expected_low = 10.0 * (60.0f64 / 0.3).ln() / (10.0f64 / 0.3).ln();
    let expected_high = 10.0 * (100.0f64 / 0.3).ln() / (10.0f64 / 0.3).ln();
    assert!((y.cells[0].free_speed - expected_low).abs() < 1e-9);
    assert!((y.cells[1].free_speed - expected_high).abs() < 1e-9);
}

#[test]
fn test_cell_without_elevation_keeps_base_hub_height() {
    let model = WakeModel::new(&TurbineParams::default()).unwrap();
    let mut low = GridCell::new(0, 0.0, 0.0);
    low.elevation = Some(300.0);
    let mut high = GridCell::new(1, 500.0, 0.0);
    high.elevation = Some(340.0);
    let unknown = GridCell::new(2, 1000.0, 0.0);
    let grid = Grid::new(vec![low, high, unknown]).unwrap();
    assert_eq!(grid.base_elevation(), 300.0);

    let terrain = TerrainContext {
        use_elevation: true,
        ..Default::default()
    };
    let y = model.evaluate(&grid, &[0, 1, 2], &WindCase::new(0.0, 10.0, 100.0), &terrain);
    let at_hub = 10.0 * (60.0f64 / 0.3).ln() / (10.0f64 / 0.3).ln();
    let raised = 10.0 * (100.0f64 / 0.3).ln() / (10.0f64 / 0.3).ln();
    assert!((y.cells[0].free_speed - at_hub).abs() < 1e-9);
    assert!((y.cells[1].free_speed - raised).abs() < 1e-9);
    assert!((y.cells[2].free_speed - at_hub).abs() < 1e-9);
}

#[test]
fn test_weibull_speeds_replace_scenario_speed() {
    let grid = column(2, 100.0);
    let terrain = TerrainContext {
        weibull_speeds: Some(vec![7.0, 9.0]),
        ..Default::default()
    };
    let y = flat_model().evaluate(&grid, &[0, 1], &WindCase::new(90.0, 12.0, 100.0), &terrain);
    assert_eq!(y.cells[0].free_speed, 7.0);
    assert_eq!(y.cells[1].free_speed, 9.0);
}

#[test]
fn test_invalid_thrust_coefficient_rejected() {
    let params = TurbineParams {
        thrust_coefficient: 1.5,
        ..flat_turbine()
    };
    assert!(WakeModel::new(&params).is_err());
}
