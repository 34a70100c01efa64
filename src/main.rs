use std::path::PathBuf;
use std::process;

use clap::{crate_description, crate_name, crate_version, value_parser};
use clap::{Arg, ArgAction, ArgGroup, Command};
use slog::info;

use wikirank::error::Result;
use wikirank::graph_state::{
    self, BlockStore, Corpus, DuplicatePolicy, GraphState, RankData, TitleIndex, MAX_SIZE,
};

fn argv() -> clap::ArgMatches {
    Command::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .arg(
            Arg::new("corpus")
                .long("corpus")
                .num_args(1..)
                .value_parser(value_parser!(PathBuf))
                .help("Dump files, in canonical order; runs both passes and writes blocks"),
        )
        .arg(
            Arg::new("blocks")
                .long("blocks")
                .default_value("blocks")
                .value_parser(value_parser!(PathBuf))
                .help("Block store directory"),
        )
        .arg(
            Arg::new("ranks")
                .long("ranks")
                .value_parser(value_parser!(PathBuf))
                .help("Load the store, rank, and write title/score lines here"),
        )
        .arg(
            Arg::new("block-size")
                .long("block-size")
                .value_parser(value_parser!(u64).range(1..))
                .help("Articles per block (defaults to 100000)"),
        )
        .arg(
            Arg::new("keep-first")
                .long("keep-first")
                .action(ArgAction::SetTrue)
                .help("Resolve duplicate titles to the first id instead of the last"),
        )
        .group(
            ArgGroup::new("work")
                .args(["corpus", "ranks"])
                .required(true)
                .multiple(true),
        )
        .get_matches()
}

fn run() -> Result<()> {
    let args = argv();
    let log = graph_state::new_logger();

    let blocks_dir = args
        .get_one::<PathBuf>("blocks")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("blocks"));
    let store = BlockStore::new(blocks_dir);

    if let Some(files) = args.get_many::<PathBuf>("corpus") {
        let corpus = Corpus::new(files.cloned().collect());
        let policy = if args.get_flag("keep-first") {
            DuplicatePolicy::KeepFirst
        } else {
            DuplicatePolicy::KeepLast
        };
        let capacity = args
            .get_one::<u64>("block-size")
            .map(|&n| n as usize)
            .unwrap_or(MAX_SIZE);

        let index = GraphState::<TitleIndex>::new(corpus, policy, log.clone())?;
        let data = index.extract_links(&store, capacity)?;
        info!(log, "Graph built"; "articles" => data.size(), "blocks" => data.blocks());
    }

    if let Some(out) = args.get_one::<PathBuf>("ranks") {
        let ranked = GraphState::<RankData>::load(&store, log.clone())?;
        ranked.data();
        ranked.write_ranked(out)?;
        info!(log, "Ranks written"; "path" => %out.display());
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("fatal: {}", e);
        process::exit(1);
    }
}
