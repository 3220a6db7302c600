extern crate getopts;

use std::path::Path;
use std::process;

use anyhow::Context;
use getopts::Options;
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use mutable::bio::proximity::{gene_distances, DistanceEdge};
use mutable::db::distance::DistanceDb;
use mutable::db::dnv::{cohort_missense_by_gene, DnvDb};
use mutable::db::gene::{upper_case_gene_map, GeneDb};
use mutable::web::config::Config;

const PKG_NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_usage(program: &str, opts: Options) {
    let brief = format!("Usage: {} [options]", program);
    print!("{}", opts.usage(&brief));
}

fn build_distances(config: &Config, output: &Path, threshold: f64) -> anyhow::Result<usize> {
    let gene_db = GeneDb::open(&config.gene_database)
        .with_context(|| format!("failed to open {}", config.gene_database.display()))?;
    let dnv_db = DnvDb::open(&config.dnv_database)
        .with_context(|| format!("failed to open {}", config.dnv_database.display()))?;

    let gene_uniprot_map = upper_case_gene_map(gene_db.gene_uniprot_map()?);
    let gene_variants = cohort_missense_by_gene(&dnv_db, &gene_uniprot_map)?;

    tracing::info!("computing distances for {} genes", gene_variants.len());

    let gene_edges: anyhow::Result<Vec<Vec<DistanceEdge>>> = gene_variants
        .par_iter()
        .map(|(gene, variants)| {
            gene_distances(gene, variants, &gene_uniprot_map, &config.structure_dir, threshold)
                .with_context(|| format!("failed to compute distances of {}", gene))
        })
        .collect();

    let edges: Vec<DistanceEdge> = gene_edges?.into_iter().flatten().collect();

    let mut distance_db = DistanceDb::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    distance_db.store_edges(&edges)?;

    Ok(edges.len())
}

fn main() {
    println!("{} v{}", PKG_NAME, VERSION);

    let args: Vec<String> = std::env::args().collect();
    let mut opts = Options::new();

    opts.optflag("h", "help", "print this help message");
    opts.optopt("c", "config-file", "Configuration file name", "CONFIG");
    opts.optopt("o", "output", "SQLite file to write the distance table to", "OUTPUT_DATABASE");
    opts.optopt("t", "threshold", "Maximum distance in Angstrom, defaults to the configured one",
                "THRESHOLD");

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => {
            eprintln!("Invalid options\n{}", f);
            process::exit(1);
        }
    };

    let program = args[0].clone();

    if matches.opt_present("help") {
        print_usage(&program, opts);
        process::exit(0);
    }
    let Some(config_file_name) = matches.opt_str("config-file")
    else {
        println!("no -c|--config-file option");
        print_usage(&program, opts);
        process::exit(1);
    };
    let Some(output) = matches.opt_str("output")
    else {
        println!("no -o|--output option");
        print_usage(&program, opts);
        process::exit(1);
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new("mutable=info"))
                .unwrap(),
        )
        .init();

    let config = match Config::read(&config_file_name) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{:#}", err);
            process::exit(1);
        }
    };

    let threshold =
        match matches.opt_str("threshold").map(|threshold| threshold.parse::<f64>()) {
            Some(Ok(threshold)) => threshold,
            Some(Err(err)) => {
                eprintln!("invalid --threshold: {}", err);
                process::exit(1);
            },
            None => config.distance_threshold,
        };

    match build_distances(&config, Path::new(&output), threshold) {
        Ok(count) => tracing::info!("wrote {} residue pairs to {}", count, output),
        Err(err) => {
            eprintln!("{:#}", err);
            process::exit(1);
        }
    }
}
