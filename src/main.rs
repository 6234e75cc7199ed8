use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::process;
use tracing::{error, info};
use windforge::config::Config;
use windforge::site::loader::{load_grid, load_wind};
use windforge::site::{Grid, TerrainContext, WindScenario};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Candidate cells: `id,x,y[,roughness][,elevation]`.
    #[arg(global = true, short, long, default_value = "data/grid.csv")]
    grid: String,

    /// Wind scenario: `direction,speed,probability`.
    #[arg(global = true, short, long, default_value = "data/wind.csv")]
    wind: String,

    /// JSON config; parameters typed on the command line override it.
    #[arg(global = true, long)]
    config: Option<String>,

    /// Use per-cell roughness from the grid in the height profile.
    #[arg(global = true, long, default_value_t = false)]
    use_roughness: bool,

    /// Raise hubs by each cell's elevation above the lowest cell.
    #[arg(global = true, long, default_value_t = false)]
    use_elevation: bool,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Search(cmd::search::SearchArgs),
    Evaluate(cmd::evaluate::EvaluateArgs),
}

fn load_inputs(cli: &Cli) -> (Grid, WindScenario) {
    info!("📂 Loading grid: {}", cli.grid);
    let grid = load_grid(&cli.grid).unwrap_or_else(|e| {
        error!("{}", e);
        process::exit(1);
    });

    info!("🌬️  Loading wind scenario: {}", cli.wind);
    let scenario = load_wind(&cli.wind).unwrap_or_else(|e| {
        error!("{}", e);
        process::exit(1);
    });

    (grid, scenario)
}

fn resolve_config(cli: &Cli, from_args: &Config, sub_matches: &ArgMatches) -> Config {
    match &cli.config {
        Some(path) => {
            info!("⚙️  Loading config from: {}", path);
            let mut config = Config::load_from_file(path).unwrap_or_else(|e| {
                error!("{}", e);
                process::exit(1);
            });
            config.merge_from_cli(from_args, sub_matches);
            config
        }
        None => from_args.clone(),
    }
}

fn subcommand_matches<'a>(matches: &'a ArgMatches, name: &str) -> &'a ArgMatches {
    matches.subcommand_matches(name).unwrap_or(matches)
}

fn main() {
    tracing_subscriber::fmt::init();

    // Raw matches tell explicit flags apart from defaults.
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    info!("🚀 Initializing WindForge...");

    let (grid, scenario) = load_inputs(&cli);
    info!(
        "{} candidate cells, {} wind directions",
        grid.len(),
        scenario.len()
    );

    let terrain = TerrainContext {
        use_roughness: cli.use_roughness,
        use_elevation: cli.use_elevation,
        weibull_speeds: None,
    };

    let outcome = match &cli.command {
        Commands::Search(args) => {
            let config = resolve_config(&cli, &args.config, subcommand_matches(&matches, "search"));
            cmd::search::run(args, config, grid, scenario, terrain, cli.debug)
        }
        Commands::Evaluate(args) => {
            let config = resolve_config(&cli, &args.config, subcommand_matches(&matches, "evaluate"));
            cmd::evaluate::run(args, config, grid, scenario, terrain)
        }
    };

    if let Err(e) = outcome {
        error!("❌ {}", e);
        process::exit(1);
    }
}
