use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::cli::args::{Cli, Commands};
use crate::cli::menu::run_menu;
use crate::config::Settings;
use crate::database::TermDatabase;
use crate::experiment::{self, Experiment};
use crate::query::read_terms;
use crate::record::{Record, RecordSource};

pub fn execute_command(cli: &Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref()).context("Cannot load settings")?;
    if let Some(data_file) = &cli.data_file {
        settings.data_file.clone_from(data_file);
    }
    debug!(?settings, "Effective settings");

    match &cli.command {
        None | Some(Commands::Menu) => menu(&settings),
        Some(Commands::Query { term }) => query(&settings, term),
        Some(Commands::Batch { file }) => batch(&settings, file),
        Some(Commands::Bench {
            queries,
            output,
            sizes,
            seed,
        }) => {
            if let Some(queries) = queries {
                settings.query_file.clone_from(queries);
            }
            if let Some(output) = output {
                settings.results_file.clone_from(output);
            }
            if !sizes.is_empty() {
                settings.sizes.clone_from(sizes);
            }
            if let Some(seed) = seed {
                settings.seed = *seed;
            }
            bench(&settings)
        }
        Some(Commands::Shuffle { input, output, seed }) => shuffle(input, output, seed.unwrap_or(settings.seed)),
    }
}

fn load_database(settings: &Settings) -> Result<TermDatabase> {
    let source = RecordSource::open(&settings.data_file).context("Cannot open knowledge base")?;
    Ok(TermDatabase::load(&source)?)
}

#[instrument(skip_all)]
fn menu(settings: &Settings) -> Result<()> {
    let db = load_database(settings)?;
    let stdin = io::stdin();
    run_menu(&db, stdin.lock(), io::stdout().lock())?;
    Ok(())
}

#[instrument(skip(settings))]
fn query(settings: &Settings, term: &str) -> Result<()> {
    let db = load_database(settings)?;
    db.reset_counters();
    let outcome = db.find(term);
    println!("{outcome}");
    debug!(comparisons = db.comparisons().search, "Query done");
    Ok(())
}

#[instrument(skip(settings))]
fn batch(settings: &Settings, file: &Path) -> Result<()> {
    let db = load_database(settings)?;
    let terms = read_terms(file)?;
    let report = db.find_all(&terms);
    for outcome in &report.outcomes {
        println!("{outcome}\n");
    }
    println!("Summary: {report}");
    Ok(())
}

#[instrument(skip_all)]
fn bench(settings: &Settings) -> Result<()> {
    let source = RecordSource::open(&settings.data_file).context("Cannot open knowledge base")?;
    let records = source.records()?.collect::<crate::Result<Vec<Record>>>()?;
    let queries = read_terms(&settings.query_file).context("Cannot read benchmark queries")?;

    let rows = Experiment::new(settings.sizes.clone(), settings.seed).run(&records, &queries);
    experiment::write_csv(&rows, io::stdout().lock())?;
    experiment::write_csv_file(&rows, &settings.results_file)?;
    info!(path = %settings.results_file.display(), "Benchmark complete");
    println!("\nResults have been written to {}", settings.results_file.display());
    Ok(())
}

#[instrument]
fn shuffle(input: &Path, output: &Path, seed: u64) -> Result<()> {
    let lines = experiment::shuffle_lines(input, output, seed)?;
    println!("Shuffled {lines} lines into {}", output.display());
    Ok(())
}
