//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_corpus_adapter::CsvCorpusAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_definition_store::{JsonDefinitionStore, read_definition_file};
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestResult};
use crate::domain::config_validation::{
    validate_backtest_config, validate_store_config, validate_window,
};
use crate::domain::definition::AlgorithmDefinition;
use crate::domain::error::EventTraderError;
use crate::domain::event::DateRange;
use crate::domain::graph::GraphIndex;
use crate::ports::config_port::ConfigPort;
use crate::ports::corpus_port::CorpusPort;
use crate::ports::definition_port::DefinitionPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_OUTPUT: &str = "backtest.json";

#[derive(Parser, Debug)]
#[command(name = "eventtrader", about = "Scenario algorithm backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Definition JSON file
        #[arg(short, long, conflicts_with = "algorithm")]
        definition: Option<PathBuf>,
        /// Stored algorithm id
        #[arg(short, long)]
        algorithm: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate an algorithm definition
    Validate {
        #[arg(short, long)]
        definition: PathBuf,
    },
    /// List stored algorithms
    List {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            definition,
            algorithm,
            start,
            end,
            output,
        } => run_backtest(
            &config,
            definition.as_deref(),
            algorithm.as_deref(),
            start.as_deref(),
            end.as_deref(),
            output.as_deref(),
        ),
        Command::Validate { definition } => run_validate(&definition),
        Command::List { config } => run_list(&config),
    }
}

fn fail(err: EventTraderError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(fail)
}

/// Merge `--start/--end` over `[backtest] start_date/end_date` and validate.
pub fn resolve_window(
    config: &dyn ConfigPort,
    start_override: Option<&str>,
    end_override: Option<&str>,
) -> Result<Option<DateRange>, EventTraderError> {
    let start = start_override
        .map(str::to_string)
        .or_else(|| config.get_string("backtest", "start_date"));
    let end = end_override
        .map(str::to_string)
        .or_else(|| config.get_string("backtest", "end_date"));
    validate_window(start.as_deref(), end.as_deref())
}

/// Load the definition to run, from a file or from the configured store.
/// Returns the display name alongside the definition.
pub fn resolve_definition(
    config: &dyn ConfigPort,
    definition_path: Option<&Path>,
    algorithm_id: Option<&str>,
) -> Result<(String, AlgorithmDefinition), EventTraderError> {
    if let Some(path) = definition_path {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        return Ok((name, read_definition_file(path)?));
    }

    let id = algorithm_id.ok_or_else(|| EventTraderError::ConfigMissing {
        section: "algorithms".into(),
        key: "id (use --definition or --algorithm)".into(),
    })?;
    validate_store_config(config)?;
    let store = JsonDefinitionStore::from_config(config)?;
    let algo = store
        .get(id)?
        .ok_or_else(|| EventTraderError::NotFound { id: id.to_string() })?;
    Ok((algo.name, algo.definition))
}

pub fn resolve_output(config: &dyn ConfigPort, output_override: Option<&Path>) -> PathBuf {
    output_override
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("report", "output_path").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
}

fn run_backtest(
    config_path: &Path,
    definition_path: Option<&Path>,
    algorithm_id: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
    output: Option<&Path>,
) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if let Err(e) = validate_backtest_config(&config) {
        return fail(e);
    }

    // Stage 2: Resolve window and definition
    let window = match resolve_window(&config, start, end) {
        Ok(w) => w,
        Err(e) => return fail(e),
    };
    let (name, definition) = match resolve_definition(&config, definition_path, algorithm_id) {
        Ok(d) => d,
        Err(e) => return fail(e),
    };
    eprintln!("Loading algorithm: {}", name);

    // Stage 3: Build adapters
    let corpus = match CsvCorpusAdapter::from_config(&config) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let report = JsonReportAdapter::new(config.get_bool("report", "pretty", true));
    let output_path = resolve_output(&config, output);

    run_backtest_pipeline(
        &corpus,
        &report,
        &name,
        &definition,
        window.as_ref(),
        &output_path,
    )
}

/// Stages 4-6: fetch corpus, evaluate, summarize and write the report.
pub fn run_backtest_pipeline(
    corpus: &dyn CorpusPort,
    report: &dyn ReportPort,
    name: &str,
    definition: &AlgorithmDefinition,
    window: Option<&DateRange>,
    output_path: &Path,
) -> ExitCode {
    // Stage 4: Validate definition before touching the corpus
    if let Err(e) = definition.validate() {
        return fail(e.into());
    }

    let events = match corpus.load_events() {
        Ok(e) => e,
        Err(e) => return fail(e),
    };

    match window {
        Some(r) => eprintln!(
            "Running backtest: {} events, {} to {}",
            events.len(),
            r.start,
            r.end
        ),
        None => eprintln!("Running backtest: {} events, all dates", events.len()),
    }

    // Stage 5: Evaluate
    let result = match backtest_engine::evaluate(definition, &events, window) {
        Ok(r) => r,
        Err(e) => return fail(e.into()),
    };

    print_summary(&result);

    // Stage 6: Write report
    let output = output_path.display().to_string();
    match report.write(&result, name, &output) {
        Ok(()) => {
            eprintln!("\nReport written to: {}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to write report: {e}");
            (&e).into()
        }
    }
}

fn print_summary(result: &BacktestResult) {
    let m = &result.metrics;
    eprintln!("\n=== Backtest Results ===");
    eprintln!("Trades:            {}", m.trade_count);
    eprintln!("Win Rate:          {:.1}%", m.win_rate);
    eprintln!("Avg Return 1d:     {:.2}%", m.avg_return_1d);
    eprintln!("Avg Return 1w:     {:.2}%", m.avg_return_1w);
    eprintln!("Avg Return 1m:     {:.2}%", m.avg_return_1m);
    eprintln!("Cumulative Return: {:.2}%", m.cumulative_return);

    if let (Some(first), Some(last)) = (result.trades.first(), result.trades.last()) {
        eprintln!("Period:            {} to {}", first.date, last.date);
    }
}

fn run_validate(definition_path: &Path) -> ExitCode {
    eprintln!("Validating definition: {}", definition_path.display());
    let definition = match read_definition_file(definition_path) {
        Ok(d) => d,
        Err(e) => return fail(e),
    };
    if let Err(e) = definition.validate() {
        return fail(e.into());
    }

    let index = GraphIndex::new(&definition);
    eprintln!("  Nodes:  {}", definition.nodes.len());
    eprintln!("  Edges:  {}", definition.edges.len());
    eprintln!("  Output: {}", definition.output_node_id);
    if let Some(output) = index.position(&definition.output_node_id) {
        eprintln!("  Expression: {}", index.render(output));
    }

    eprintln!("\nDefinition is valid.");
    ExitCode::SUCCESS
}

fn run_list(config_path: &Path) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if let Err(e) = validate_store_config(&config) {
        return fail(e);
    }
    let store = match JsonDefinitionStore::from_config(&config) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let algorithms = match store.list() {
        Ok(a) => a,
        Err(e) => return fail(e),
    };

    if algorithms.is_empty() {
        eprintln!("No algorithms found");
    }
    for algo in &algorithms {
        let kind = if algo.is_preset { "preset" } else { "user" };
        println!("{}\t{}\t{}", algo.id, kind, algo.name);
    }
    ExitCode::SUCCESS
}
