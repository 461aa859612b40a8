//! Command-line front end: load a numeric CSV, estimate the skeleton, print
//! the adjacency lists and separation sets.
#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use esqueleto::{
    CsvLayout, Dataset, Result, Skeleton, SkeletonConfig, SkeletonError, SkeletonOutput, VarId,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "esqueleto",
    version,
    about = "Estimate the causal skeleton of continuous data with the parallel PC algorithm"
)]
struct Cli {
    #[arg(help = "Numeric CSV file, one row per sample (see --variable-rows)")]
    data: PathBuf,

    #[arg(long, default_value_t = 0.05, help = "Significance level of the independence tests")]
    alpha: f64,

    #[arg(long, help = "Worker threads (defaults to the available parallelism)")]
    workers: Option<usize>,

    #[arg(long, help = "Interpret CSV rows as variables instead of samples")]
    variable_rows: bool,

    #[arg(long, help = "Skip the first CSV record as a header")]
    headers: bool,

    #[arg(long, help = "Stop after this conditioning-set size")]
    max_level: Option<usize>,

    #[arg(
        long,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for the estimated skeleton"
    )]
    format: OutputFormat,

    #[arg(
        long,
        value_name = "X,Y",
        help = "Also print the separation set recorded for one pair"
    )]
    separation: Option<String>,

    #[cfg(feature = "stats")]
    #[arg(long, help = "Print per-level worker statistics as JSON")]
    stats: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    if let Err(err) = run(Cli::parse()) {
        eprintln!("esqueleto: {err}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let layout = if cli.variable_rows {
        CsvLayout::VariableRows
    } else {
        CsvLayout::SampleRows
    };
    let data = Dataset::from_csv_path(&cli.data, layout, cli.headers)?;

    let mut config = SkeletonConfig::with_alpha(cli.alpha);
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    config.max_level = cli.max_level;

    let separation = cli.separation.as_deref().map(parse_pair).transpose()?;

    let output = Skeleton::new(&data, config)?.run();

    match cli.format {
        OutputFormat::Text => print_text(&output),
        OutputFormat::Json => print_json(&output, &data, cli.alpha),
    }

    if let Some((x, y)) = separation {
        match output.separation_sets.get(x, y) {
            Some(witness) => {
                let rendered: Vec<String> =
                    witness.iter().map(ToString::to_string).collect();
                println!("separation({x}, {y}) = {{{}}}", rendered.join(", "));
            }
            None => println!("separation({x}, {y}) = none"),
        }
    }

    #[cfg(feature = "stats")]
    if cli.stats {
        println!(
            "{}",
            serde_json::to_string_pretty(&output.stats)
                .expect("run statistics serialize to JSON")
        );
    }

    Ok(())
}

fn parse_pair(raw: &str) -> Result<(VarId, VarId)> {
    let parse = |piece: &str| {
        piece
            .trim()
            .parse::<u32>()
            .map(VarId)
            .map_err(|_| SkeletonError::Invalid("separation pair must be two indices as X,Y"))
    };
    let (x, y) = raw
        .split_once(',')
        .ok_or(SkeletonError::Invalid("separation pair must be two indices as X,Y"))?;
    Ok((parse(x)?, parse(y)?))
}

fn print_text(output: &SkeletonOutput) {
    let p = output.graph.vertex_count();
    println!("vertices: {p}");
    println!("edges: {}", output.graph.edge_count());
    for v in 0..p {
        let v = VarId(v as u32);
        let neighbors: Vec<String> = output
            .graph
            .neighbors(v)
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("{v}: {}", neighbors.join(" "));
    }
}

fn print_json(output: &SkeletonOutput, data: &Dataset, alpha: f64) {
    let edges: Vec<[u32; 2]> = output
        .graph
        .edges()
        .into_iter()
        .map(|(i, j)| [i.0, j.0])
        .collect();
    let separation_sets: Vec<serde_json::Value> = output
        .separation_sets
        .witnesses()
        .into_iter()
        .map(|(i, j, set)| {
            json!({
                "pair": [i.0, j.0],
                "witness": set.into_iter().map(|v| v.0).collect::<Vec<u32>>(),
            })
        })
        .collect();
    let report = json!({
        "variables": data.n_vars(),
        "samples": data.n_samples(),
        "alpha": alpha,
        "edges": edges,
        "separation_sets": separation_sets,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&report).expect("skeleton report serializes to JSON")
    );
}
