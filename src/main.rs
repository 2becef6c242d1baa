use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{ArgEnum, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use linkcluster::io::{self, EdgeColumns};
use linkcluster::summary::RunSummary;
use linkcluster::{
    connected_components_with, parse_strategy, utils, CcConfig, IdType, Strategy,
};
use shadow_rs::shadow;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

shadow!(build);

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ArgEnum, Debug)]
pub enum IdTypeArg {
    String,
    Int,
}

impl From<IdTypeArg> for IdType {
    fn from(arg: IdTypeArg) -> Self {
        match arg {
            IdTypeArg::String => IdType::String,
            IdTypeArg::Int => IdType::Int,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None, long_version = build::CLAP_LONG_VERSION)]
struct Args {
    #[clap(subcommand)]
    cmd: SubCommand,
    #[clap(short = 't', long)]
    threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum SubCommand {
    /// Label every record with its connected component
    Label {
        /// Path to the edge file (csv with a header, or packed `.bincode.lz4`)
        #[clap(short, long)]
        edges: PathBuf,
        /// Optional csv of records that must appear in the output
        #[clap(short, long)]
        nodes: Option<PathBuf>,
        #[clap(long, default_value = "record_id_l")]
        left_column: String,
        #[clap(long, default_value = "record_id_r")]
        right_column: String,
        #[clap(long, default_value = "record_id")]
        node_column: String,
        #[clap(long, arg_enum, default_value_t = IdTypeArg::String)]
        id_type: IdTypeArg,
        /// JSON file with a `CcConfig`; flags below override it
        #[clap(long)]
        config: Option<PathBuf>,
        /// Stop after this many rounds even without convergence
        #[clap(long)]
        max_iter: Option<usize>,
        /// hop, shortcut or union-find
        #[clap(short, long, parse(try_from_str = parse_strategy))]
        strategy: Option<Strategy>,
        /// Output csv with columns `record_id,component`
        #[clap(short, long)]
        output: PathBuf,
        /// Write a JSON run summary here
        #[clap(long)]
        summary: Option<PathBuf>,
    },

    /// Pack an edge csv into an internal binary format for faster reloads
    Pack {
        /// Path to the edge csv
        #[clap(short, long)]
        edges: PathBuf,
        #[clap(long, default_value = "record_id_l")]
        left_column: String,
        #[clap(long, default_value = "record_id_r")]
        right_column: String,
        #[clap(long, arg_enum, default_value_t = IdTypeArg::String)]
        id_type: IdTypeArg,
        /// Output path for the packed edges, recommended suffix is `.bincode.lz4`
        #[clap(short, long)]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let starting = Instant::now();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();
    let mut num_cpu = num_cpus::get_physical().min(32);
    if let Some(specified_cores) = args.threads {
        if specified_cores > num_cpus::get_physical() {
            warn!("Specified more cores than available, using all available cores");
        } else {
            num_cpu = specified_cores;
        }
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_cpu)
        .build_global()?;
    match args.cmd {
        SubCommand::Label {
            edges,
            nodes,
            left_column,
            right_column,
            node_column,
            id_type,
            config,
            max_iter,
            strategy,
            output,
            summary,
        } => {
            let mut cc_config = match config {
                Some(path) => CcConfig::from_json_file(path)?,
                None => CcConfig::default(),
            };
            if let Some(max_iter) = max_iter {
                cc_config = cc_config.with_max_iter(max_iter);
            }
            if let Some(strategy) = strategy {
                cc_config = cc_config.with_strategy(strategy);
            }
            info!("Labelling with config: {:?}", cc_config);
            let now = Instant::now();
            let columns = EdgeColumns {
                left: left_column,
                right: right_column,
            };
            let edge_table = io::read_edges(&edges, &columns, id_type.into())?;
            info!(rows = edge_table.len(), "Edges loaded in {:?}", now.elapsed());
            let universe = nodes
                .map(|p| io::read_universe(p, &node_column, id_type.into()))
                .transpose()?;
            if let Some(universe) = &universe {
                info!(rows = universe.len(), "Universe loaded");
            }
            let now = Instant::now();
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
            spinner.enable_steady_tick(Duration::from_millis(120));
            let outcome = connected_components_with(
                &edge_table,
                universe.as_ref(),
                &cc_config,
                |stats| {
                    spinner.set_message(format!(
                        "round {}: {} labels updated",
                        stats.round, stats.relabeled
                    ))
                },
            )?;
            spinner.finish_and_clear();
            info!("Components labelled in {:?}", now.elapsed());
            if !outcome.converged() {
                warn!(
                    rounds = outcome.rounds,
                    "Round limit reached before convergence, labels are partial"
                );
            }
            io::write_components_file(&output, &outcome.components)?;
            let run_summary = RunSummary::from_outcome(&outcome);
            if let Some(path) = summary {
                run_summary.write_json(path)?;
            }
            println!("{}", run_summary.to_table());
        }
        SubCommand::Pack {
            edges,
            left_column,
            right_column,
            id_type,
            mut output,
        } => {
            if !output.to_string_lossy().ends_with(".bincode.lz4") {
                output.set_extension("bincode.lz4");
                warn!(
                    "Output file does not end with .bincode.lz4, changing it to {:?}",
                    output
                );
            }
            let columns = EdgeColumns {
                left: left_column,
                right: right_column,
            };
            let edge_table = io::read_edges(&edges, &columns, id_type.into())?;
            edge_table.validate()?;
            utils::write_compressed_bincode(&output, &edge_table)?;
            info!(rows = edge_table.len(), "Edges packed to {:?}", output);
        }
    }
    info!("linkcluster finished in {:?}", starting.elapsed());
    Ok(())
}
