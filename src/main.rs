use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use wurm_utils::{
    bridges::{calc_bridge_cost, BridgeType},
    config::Config,
    domain::{ItemCode, MaterialAmounts, Point, Server},
    geometry::{calc_segments, calc_span_length},
    highways::{calc_highway_cost, validate_points},
    storage::JsonFileStore,
    treasures::{TreasureMap, TreasureRegister},
    tunnels::{calc_tunnel_cost, AVG_ACTIONS_PER_ORE_VEIN, ORE_PROBABILITY},
    web::{self, AppState, SharedStore, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Calculators and a treasure hunt tracker for Wurm Online")]
struct Cli {
    /// Path to a YAML config file (defaults to ./wurm-utils.yaml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the treasure store file
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Paving, sand and catseye totals for a highway route
    Highway {
        /// Route point as "x,y"; repeat for every corner
        #[arg(long = "point", required = true)]
        points: Vec<Point>,

        #[arg(long)]
        width: Option<u32>,

        /// Paving item code, e.g. STONE_BRICK
        #[arg(long)]
        paving: Option<ItemCode>,

        #[arg(long)]
        sand_lining: bool,
    },
    /// Section layout and materials for a bridge
    Bridge {
        #[arg(long = "type", default_value = "FLAT_WOOD")]
        bridge_type: BridgeType,

        #[command(flatten)]
        span: SpanArgs,

        #[arg(long, default_value_t = 1)]
        width: u32,
    },
    /// Expected mining effort for a tunnel
    Tunnel {
        #[command(flatten)]
        span: SpanArgs,

        #[arg(long, default_value_t = 1)]
        width: u32,
    },
    /// Manage the treasure map list
    Treasure {
        #[command(subcommand)]
        action: TreasureCommand,
    },
    /// Serve the browser UI and JSON API
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Debug, Args)]
struct SpanArgs {
    /// Length in tiles
    #[arg(long, required_unless_present = "from", conflicts_with = "from")]
    length: Option<u32>,

    /// Start point "x,y" to measure the length from
    #[arg(long, requires = "to")]
    from: Option<Point>,

    /// End point "x,y" to measure the length to
    #[arg(long, requires = "from")]
    to: Option<Point>,
}

impl SpanArgs {
    fn length(&self) -> u32 {
        match (self.length, self.from, self.to) {
            (Some(length), _, _) => length,
            (None, Some(from), Some(to)) => calc_span_length(&[from, to]),
            _ => 0,
        }
    }
}

#[derive(Debug, Subcommand)]
enum TreasureCommand {
    /// Show the maps, closest first
    List,
    Add(MapArgs),
    Edit {
        index: usize,
        #[command(flatten)]
        map: MapArgs,
    },
    Delete {
        index: usize,
    },
    /// Found the treasure: remove the map and move there
    Claim {
        index: usize,
    },
    /// Found another map: move to the old spot and re-enter position and grid
    /// (quality and notes carry over unless given)
    Replace {
        index: usize,
        #[command(flatten)]
        map: MapArgs,
    },
    /// Set the current position "x,y"
    Position {
        point: Point,
    },
    /// Select the game server used for map links
    Server {
        server: Server,
    },
}

#[derive(Debug, Args)]
struct MapArgs {
    /// Map location "x,y"
    #[arg(long)]
    at: Point,

    #[arg(long)]
    grid: Option<String>,

    #[arg(long)]
    quality: Option<f64>,

    #[arg(long)]
    notes: Option<String>,
}

impl From<MapArgs> for TreasureMap {
    fn from(args: MapArgs) -> Self {
        TreasureMap {
            position: args.at,
            distance: None,
            grid: args.grid,
            quality: args.quality,
            notes: args.notes,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    let store_path = cli
        .store
        .clone()
        .unwrap_or_else(|| config.storage.path.clone());

    match cli.command {
        Command::Highway {
            points,
            width,
            paving,
            sand_lining,
        } => {
            if let Err(err) = validate_points(&points) {
                bail!("Invalid points: {err}");
            }
            let cost = calc_highway_cost(
                &calc_segments(&points),
                width.unwrap_or(config.highway.width),
                paving.unwrap_or(config.highway.paving),
                sand_lining,
            );
            println!("Total length (tiles): {}", cost.length);
            print_materials(&cost.total_mats);
            let raw = cost.raw_materials();
            if !raw.is_empty() {
                println!("Raw materials (kg):");
                print_materials(&raw);
            }
        }
        Command::Bridge {
            bridge_type,
            span,
            width,
        } => {
            let cost = calc_bridge_cost(bridge_type, span.length(), width)?;
            if cost.sections.is_empty() {
                println!("No section layout known for a {} bridge of that length.", bridge_type.label());
            } else {
                let sections: Vec<String> = cost.sections.iter().map(ToString::to_string).collect();
                println!("Sections: {}", sections.join(", "));
            }
            print_materials(&cost.total_mats);
        }
        Command::Tunnel { span, width } => {
            let cost = calc_tunnel_cost(span.length(), width);
            println!(
                "Tunnel will have a total of {} wall and {} floor tiles.",
                cost.wall_amount, cost.floor_amount
            );
            println!(
                "A total of {} tiles need to be mined of which {} are expected to be ore veins \
                 ({:.0}% ore chance, ~{} actions per vein).",
                cost.total_tiles,
                cost.total_ore_veins,
                ORE_PROBABILITY * 100.0,
                AVG_ACTIONS_PER_ORE_VEIN
            );
            println!(
                "This will require a total of {} ({} stone and ~{} ore) mining actions.",
                cost.total_actions(),
                cost.stone_actions,
                cost.ore_actions
            );
        }
        Command::Treasure { action } => {
            let store = JsonFileStore::open(&store_path)
                .with_context(|| format!("Failed to open store {}", store_path.display()))?;
            let mut register = TreasureRegister::open(store);
            run_treasure(&mut register, action)?;
            print_treasures(&register);
        }
        Command::Serve { host, port } => {
            let store = JsonFileStore::open(&store_path)
                .with_context(|| format!("Failed to open store {}", store_path.display()))?;
            let store: SharedStore = Box::new(store);
            let state = AppState::new(TreasureRegister::open(store))
                .with_highway_defaults(config.highway.width, config.highway.paving);
            let server = WebServerConfig {
                host: host.unwrap_or(config.web.host),
                port: port.unwrap_or(config.web.port),
            };
            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            runtime.block_on(web::run(server, state))?;
        }
    }
    Ok(())
}

fn run_treasure(
    register: &mut TreasureRegister<JsonFileStore>,
    action: TreasureCommand,
) -> Result<()> {
    match action {
        TreasureCommand::List => {}
        TreasureCommand::Add(map) => register.add(map.into())?,
        TreasureCommand::Edit { index, map } => register.edit(index, map.into())?,
        TreasureCommand::Delete { index } => {
            let removed = register.delete(index)?;
            log::info!("deleted map at {}", removed.position);
        }
        TreasureCommand::Claim { index } => {
            let claimed = register.claim(index)?;
            println!("Claimed treasure at {}.", claimed.position);
        }
        TreasureCommand::Replace { index, map } => register.replace(index, map.into())?,
        TreasureCommand::Position { point } => register.set_current_position(point)?,
        TreasureCommand::Server { server } => register.set_server(server)?,
    }
    Ok(())
}

fn print_materials(amounts: &MaterialAmounts) {
    for (code, amount) in amounts.iter() {
        println!("  {:<18} {}", code.display_name(), amount);
    }
}

fn print_treasures(register: &TreasureRegister<JsonFileStore>) {
    match register.current_position() {
        Some(position) => println!("Server {} | current location {}", register.server().label(), position),
        None => println!("Server {} | current location not set", register.server().label()),
    }
    if register.is_empty() {
        println!("No treasure maps.");
        return;
    }
    for (index, map) in register.maps().iter().enumerate() {
        let distance = map
            .distance
            .map(|d| format!("{d:.0}"))
            .unwrap_or_else(|| "???".to_string());
        println!(
            "{index:>3}  {:<16} {:>4}  dist {:>6}  q {:<5} {}",
            map.position.to_string(),
            map.grid.as_deref().unwrap_or("-"),
            distance,
            map.quality.map(|q| q.to_string()).unwrap_or_default(),
            map.notes.as_deref().unwrap_or("")
        );
        if let Some(link) = register.map_link(index) {
            println!("     {link}");
        }
    }
}
