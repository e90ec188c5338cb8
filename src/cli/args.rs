//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Look up knowledge-base terms in a comparison-counting AVL index
#[derive(Parser, Debug)]
#[command(name = "avl-index")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// TOML settings file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Knowledge-base file (overrides settings)
    #[arg(short = 'f', long, global = true, value_hint = ValueHint::FilePath)]
    pub data_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive query menu (default)
    Menu,

    /// Look up a single term
    Query {
        /// Term to look up
        term: String,
    },

    /// Look up every term listed in a file, one per line
    Batch {
        /// File of terms
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Measure insert and search comparisons over random subsets and write a CSV table
    Bench {
        /// File of query terms (overrides settings)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        queries: Option<PathBuf>,

        /// CSV output file (overrides settings)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Comma-separated subset sizes (overrides settings)
        #[arg(long, value_delimiter = ',')]
        sizes: Vec<usize>,

        /// Sampling seed (overrides settings)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Write a copy of a file with its lines in random order
    Shuffle {
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,

        #[arg(value_hint = ValueHint::FilePath)]
        output: PathBuf,

        /// Shuffle seed (overrides settings)
        #[arg(long)]
        seed: Option<u64>,
    },
}
