use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use windforge::fitness::LayoutEvaluation;
use windforge::optimizer::{BestLayout, RunHistory};
use windforge::site::Grid;

fn right_align(table: &mut Table, from: usize, to: usize) {
    for i in from..=to {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

pub fn print_history(history: &RunHistory) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Gen").add_attribute(Attribute::Bold),
        Cell::new("Energy max\n(MWh)").fg(Color::Cyan),
        Cell::new("Energy mean\n(MWh)"),
        Cell::new("Eff max\n(%)").fg(Color::Green),
        Cell::new("Eff mean\n(%)"),
        Cell::new("Runs"),
        Cell::new("Keep"),
        Cell::new("Pts"),
        Cell::new("Div"),
        Cell::new("Flags"),
    ]);
    right_align(&mut table, 0, 8);

    for r in history.records() {
        let c = &r.controller;
        let mut flags = Vec::new();
        if c.diversity_boost {
            flags.push("boost");
        }
        if c.floor_hit {
            flags.push("floor");
        }
        if c.stagnant {
            flags.push("reinject");
        }

        table.add_row(vec![
            Cell::new(r.generation).add_attribute(Attribute::Bold),
            Cell::new(format!("{:.1}", r.energy.max / 1000.0)).fg(Color::Cyan),
            Cell::new(format!("{:.1}", r.energy.mean / 1000.0)),
            Cell::new(format!("{:.2}", r.efficiency.max)).fg(Color::Green),
            Cell::new(format!("{:.2}", r.efficiency.mean)),
            Cell::new(r.sizes.unique_runs),
            Cell::new(format!("{:.2}", r.operators.selection_fraction)),
            Cell::new(r.operators.crossover_points),
            Cell::new(format!("{:.0}", c.selection_divisor)),
            Cell::new(flags.join(",")),
        ]);
    }
    println!("\n{}", table);

    if let Some(reason) = history.stop_reason() {
        println!("Stopped: {}", reason);
    }
}

pub fn print_best_layout(title: &str, best: &BestLayout) {
    println!("\n=== 🏆 {} ===", title);
    println!("Energy:     {:.1} MWh/yr", best.energy / 1000.0);
    println!("Efficiency: {:.2}%", best.efficiency);
    let ids: Vec<String> = best.cell_ids.iter().map(|id| id.to_string()).collect();
    println!("Cells:      {}", ids.join(","));
}

pub fn print_evaluation(eval: &LayoutEvaluation, grid: &Grid) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Dir").add_attribute(Attribute::Bold),
        Cell::new("Prob (%)"),
        Cell::new("Mean free\n(m/s)"),
        Cell::new("Mean net\n(m/s)"),
        Cell::new("Shaded"),
        Cell::new("Power (kW)").fg(Color::Cyan),
        Cell::new("Potential (kW)"),
        Cell::new("Eff (%)").fg(Color::Green),
    ]);
    right_align(&mut table, 0, 7);

    for d in &eval.directions {
        let count = d.cells.len().max(1) as f64;
        let free = d.cells.iter().map(|c| c.free_speed).sum::<f64>() / count;
        let net = d.cells.iter().map(|c| c.net_speed).sum::<f64>() / count;
        let shaded = d.cells.iter().filter(|c| c.shaded_by > 0).count();

        table.add_row(vec![
            Cell::new(format!("{:.0}", d.direction)).add_attribute(Attribute::Bold),
            Cell::new(format!("{:.1}", d.probability)),
            Cell::new(format!("{:.2}", free)),
            Cell::new(format!("{:.2}", net)),
            Cell::new(shaded),
            Cell::new(format!("{:.0}", d.power)).fg(Color::Cyan),
            Cell::new(format!("{:.0}", d.potential_power)),
            Cell::new(format!("{:.2}", d.efficiency)).fg(Color::Green),
        ]);
    }
    println!("\n{}", table);

    let mut cells = Table::new();
    cells.load_preset(ASCII_FULL);
    cells.add_row(vec![
        Cell::new("Cell").add_attribute(Attribute::Bold),
        Cell::new("x"),
        Cell::new("y"),
        Cell::new("Energy (MWh)").fg(Color::Cyan),
        Cell::new("Potential (MWh)"),
    ]);
    right_align(&mut cells, 0, 4);
    for c in &eval.cells {
        let gc = grid.cell(c.cell);
        cells.add_row(vec![
            Cell::new(gc.id),
            Cell::new(format!("{:.0}", gc.x)),
            Cell::new(format!("{:.0}", gc.y)),
            Cell::new(format!("{:.1}", c.energy / 1000.0)).fg(Color::Cyan),
            Cell::new(format!("{:.1}", c.potential / 1000.0)),
        ]);
    }
    println!("{}", cells);

    println!(
        "Total: {:.1} MWh/yr of {:.1} potential, efficiency {:.2}%",
        eval.energy / 1000.0,
        eval.potential_energy / 1000.0,
        eval.efficiency
    );
}
