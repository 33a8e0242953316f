use clap::{Parser, Subcommand};
use ndarray::prelude::*;
use simple_navigator::{
    optimize::tune::{grid_search, GridAxis, ParameterGrid},
    AntColonyOptimizer, AntColonyParams, Graph, Result,
};
use std::{fmt::Display, path::PathBuf, process::ExitCode};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Opt {
    /// Adjacency matrix file: vertex count on the first line, then one row per line
    #[arg(short, long)]
    file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the adjacency matrix
    Show,
    /// Breadth-first visitation order
    Bfs {
        #[arg(default_value = "1")]
        start: usize,
    },
    /// Depth-first visitation order
    Dfs {
        #[arg(default_value = "1")]
        start: usize,
    },
    /// Length of the shortest path between two vertices
    Distance { start: usize, finish: usize },
    /// Vertices on the shortest path between two vertices
    Path { start: usize, finish: usize },
    /// Shortest distances between all pairs of vertices, -1 if unreachable
    AllPairs,
    /// Adjacency matrix of the minimum spanning tree
    Mst,
    /// Approximate the traveling salesman problem
    Tsp {
        /// JSON file with ant colony parameters, runs the default solver when absent
        #[arg(long)]
        params: Option<PathBuf>,
        /// Overrides the seed of the parameters file
        #[arg(long)]
        seed: Option<u64>,
        /// Fixed start vertex for every ant
        #[arg(long)]
        start: Option<usize>,
        /// Print the tour as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the graph in DOT format
    Dot {
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Grid search over ant colony parameters
    Tune {
        /// Stop at the first combination with a shorter tour
        #[arg(long)]
        target: Option<f64>,
        /// Colony steps per run, 0 for automatic
        #[arg(long, default_value = "0")]
        steps: usize,
        #[arg(long, default_value = "21")]
        seed: u64,
        /// Amount of pheromone axis as `start:end:step`
        #[arg(long, value_parser = parse_axis, default_value = "1:20:1")]
        amount: GridAxis,
        /// Initial amount of pheromone axis as `start:end:step`
        #[arg(long, value_parser = parse_axis, default_value = "1:20:1")]
        init_amount: GridAxis,
        /// Influence of pheromone axis as `start:end:step`
        #[arg(long, value_parser = parse_axis, default_value = "0:5:0.5")]
        pheromone_rate: GridAxis,
        /// Influence of distance axis as `start:end:step`
        #[arg(long, value_parser = parse_axis, default_value = "1:5:0.5")]
        distance_rate: GridAxis,
        /// Evaporation coefficient axis as `start:end:step`
        #[arg(long, value_parser = parse_axis, default_value = "0:1:0.05")]
        evaporation: GridAxis,
    },
}

fn parse_axis(s: &str) -> std::result::Result<GridAxis, String> {
    let values = s
        .split(':')
        .map(|part| part.trim().parse::<f64>().map_err(|err| err.to_string()))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    match values[..] {
        [value] => Ok(GridAxis::fixed(value)),
        [start, end, step] => Ok(GridAxis::new(start, end, step)),
        _ => Err(format!("expected `value` or `start:end:step`, got `{}`", s)),
    }
}

fn format_sequence<I>(values: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    values
        .into_iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_matrix<T: Display>(matrix: ArrayView2<T>) -> String {
    matrix
        .outer_iter()
        .map(|row| format_sequence(row.iter()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Number of vertices a traversal from `start` never reached.
fn unreached_count(order: &[usize], graph: &Graph) -> usize {
    graph.vertex_count().saturating_sub(order.len())
}

fn print_traversal(order: &[usize], graph: &Graph, start: usize) {
    match unreached_count(order, graph) {
        0 => {}
        unreached => warn!(
            "{} of {} vertices are not reachable from vertex {}",
            unreached,
            graph.vertex_count(),
            start
        ),
    }
    println!("{}", format_sequence(order));
}

fn run(opt: Opt) -> Result<()> {
    let graph = Graph::from_file(&opt.file)?;

    match opt.command {
        Command::Show => println!("{}", graph),
        Command::Bfs { start } => {
            print_traversal(&graph.breadth_first_search(start)?, &graph, start)
        }
        Command::Dfs { start } => {
            print_traversal(&graph.depth_first_search(start)?, &graph, start)
        }
        Command::Distance { start, finish } => {
            println!("{}", graph.shortest_distance(start, finish)?)
        }
        Command::Path { start, finish } => {
            let path = graph.shortest_path(start, finish)?;
            if path.is_empty() {
                println!("Vertex {} is not reachable from {}", finish, start);
            } else {
                println!("{}", format_sequence(&path));
            }
        }
        Command::AllPairs => {
            println!("{}", format_matrix(graph.all_pairs_shortest_paths().view()))
        }
        Command::Mst => println!("{}", format_matrix(graph.minimum_spanning_tree()?.view())),
        Command::Tsp {
            params,
            seed,
            start,
            json,
        } => {
            let result = match (params, seed, start) {
                (None, None, None) => graph.solve_traveling_salesman_problem()?,
                (params, seed, start) => {
                    let mut params = match params {
                        Some(path) => AntColonyParams::from_json_file(path)?,
                        None => AntColonyParams::default(),
                    };
                    if seed.is_some() {
                        params.seed = seed;
                    }
                    AntColonyOptimizer::new(params)?.solve(&graph, start)?
                }
            };
            if json {
                // Serializing plain numbers cannot fail
                println!("{}", serde_json::to_string(&result).unwrap_or_default());
            } else {
                println!("{}", result);
            }
        }
        Command::Dot { out } => graph.export_to_dot(out)?,
        Command::Tune {
            target,
            steps,
            seed,
            amount,
            init_amount,
            pheromone_rate,
            distance_rate,
            evaporation,
        } => {
            let grid = ParameterGrid {
                init_amount_of_pheromone: init_amount,
                amount_of_pheromone: amount,
                influence_pheromone_rate: pheromone_rate,
                influence_distance_rate: distance_rate,
                pheromone_evaporation_coefficient: evaporation,
                steps_count: steps,
                seed,
            };
            match grid_search(&graph, &grid, target) {
                Some(outcome) => {
                    println!("{}", outcome.result);
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&outcome.params).unwrap_or_default()
                    );
                }
                None => info!("No combination produced a matching tour"),
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("simple_navigator=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(Opt::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(kind = ?err.kind(), "{}", err);
            ExitCode::FAILURE
        }
    }
}
