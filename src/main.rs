//                 __                _
//   ________ ____/ /___ ___ _______(_)_ _
//  / __/ -_) / _  / _ `/ // (_-< / /  ' \
// /_/  \__/_/\_,_/\_,_/\_, /___/_/_/_/_/_/
//                     /___/

// Copyright 2026 relaysim contributors

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.                                                                          

use relaysim::metrics::logger;
use relaysim::prelude::*;
use relaysim::report::latex;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{Level, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file overriding the built-in model constants
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep the arrival rate for one scenario (or all) and save the tables
    Run {
        #[arg(short, long, default_value = "baseline")]
        scenario: String,
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        #[arg(long)]
        trial_log: bool,
        #[arg(long, default_value = "results")]
        log_dir: PathBuf,
    },

    /// Estimate the sojourn time for a single parameter set
    Estimate {
        #[arg(short = 'a', long, default_value_t = 15.0)]
        arrival_rate: f64,
        #[arg(short = 'n', long, default_value_t = 1)]
        servers: usize,
        #[arg(short = 's', long, default_value_t = 1500.0)]
        dynamic_throughput: f64,
        #[arg(short = 'r', long, default_value_t = 10_000.0)]
        bandwidth: f64,
    },

    /// Dump the raw records of one seeded trial to CSV
    Trace {
        #[arg(short, long, default_value = "baseline")]
        scenario: String,
        #[arg(short = 'a', long, default_value_t = 15.0)]
        arrival_rate: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(short, long, default_value = "records.csv")]
        output: PathBuf,
    },

    /// Compare the saved scenario tables
    Report {
        #[arg(default_value = ".")]
        input: PathBuf,
        /// Also export pgfplots figures and plot data to this directory
        #[arg(long)]
        latex: Option<PathBuf>,
    },

    List,
}

fn main() -> Result<()> {
    let program_start = Instant::now();

    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => ModelConfig::from_file(path)?,
        None => ModelConfig::default(),
    };

    match cli.command {
        Commands::Run {
            scenario,
            output,
            trial_log,
            log_dir,
        } => {
            run_sweeps(&scenario, &config, &output, trial_log.then_some(log_dir.as_path()))?;
        }

        Commands::Estimate {
            arrival_rate,
            servers,
            dynamic_throughput,
            bandwidth,
        } => {
            let params = NetworkParams {
                arrival_rate,
                relay_servers: servers,
                dynamic_throughput,
                bandwidth,
            };
            estimate_single(&params, config)?;
        }

        Commands::Trace {
            scenario,
            arrival_rate,
            seed,
            output,
        } => {
            let scenario: Scenario = scenario.parse()?;
            trace_trial(scenario, arrival_rate, seed, &output, &config)?;
        }

        Commands::Report { input, latex } => {
            show_report(&input, latex.as_deref(), &config)?;
        }

        Commands::List => {
            println!("\nAvailable Scenarios");

            for scenario in Scenario::ALL {
                let p = scenario.params(0.0);
                println!(
                    "  - {:<17} servers={} S={} R={} -> {}",
                    scenario.name(),
                    p.relay_servers,
                    p.dynamic_throughput,
                    p.bandwidth,
                    scenario.file_name()
                );
            }

            println!("\nUsage: relaysim run --scenario <name|all>");
            println!("Example: relaysim run --scenario double-servers\n");
        }
    }

    let total_time = program_start.elapsed();
    info!("Total runtime: {:.2}s", total_time.as_secs_f64());

    Ok(())
}

fn parse_scenarios(name: &str) -> Result<Vec<Scenario>> {
    if name.trim().eq_ignore_ascii_case("all") {
        return Ok(Scenario::ALL.to_vec());
    }
    name.split(',').map(|s| s.parse()).collect()
}

fn run_sweeps(
    scenarios: &str,
    config: &ModelConfig,
    output: &Path,
    log_dir: Option<&Path>,
) -> Result<()> {
    let scenarios = parse_scenarios(scenarios)?;

    info!("relaysim: Sweep");
    info!(
        "Scenarios: {}",
        scenarios.iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")
    );

    for scenario in scenarios {
        let experiment = Experiment::new(scenario, config.clone())?.with_progress(true);
        let table = match log_dir {
            Some(dir) => experiment.run_with_trial_log(output, dir)?.0,
            None => experiment.run_and_save(output)?.0,
        };
        info!("Results for {}: {}", scenario.file_name(), table.to_literal());
    }

    Ok(())
}

fn estimate_single(params: &NetworkParams, config: ModelConfig) -> Result<()> {
    let trials = config.trials;
    let estimator = Estimator::new(config)?;
    let point = estimator.estimate_detailed(params)?;

    println!(
        "\n***** Result over {} simulations with A={} *****",
        trials, params.arrival_rate
    );
    println!("Mean sojourn time: {}", point.estimate.mean);
    println!(
        "Confidence bounds: [{}, {}]",
        point.estimate.lower, point.estimate.upper
    );
    let skipped = point.trials.iter().filter(|t| t.estimate.is_none()).count();
    if skipped > 0 {
        println!("Skipped trials: {}", skipped);
    }
    println!();

    Ok(())
}

fn trace_trial(
    scenario: Scenario,
    arrival_rate: f64,
    seed: u64,
    output: &Path,
    config: &ModelConfig,
) -> Result<()> {
    config.validate()?;
    let network = build_network(&scenario.params(arrival_rate), config)?;
    let records = EventEngine.run_trial(&network, seed, config.horizon())?;
    logger::write_records(output, &records)?;
    info!(
        "{} records for {} at A = {} (seed {}) written to: {}",
        records.len(),
        scenario,
        arrival_rate,
        seed,
        output.display()
    );
    Ok(())
}

fn show_report(input: &Path, latex_dir: Option<&Path>, config: &ModelConfig) -> Result<()> {
    info!("Reading results from: {}", input.display());
    let report = Report::load(input, config)?;
    let charts = report.charts();

    for chart in &charts {
        println!("\n{}\n", chart.render());
    }

    if let Some(dir) = latex_dir {
        for path in latex::export_all(&charts, dir)? {
            info!("Exported: {}", path.display());
        }
        info!("LaTeX exports are ready. Include them with:");
        for chart in &charts {
            info!("   \\input{{{}}}", dir.join(format!("{}.tex", chart.id)).display());
        }
    }

    Ok(())
}
