use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use rex_engine::config::RunConfig;
use rex_engine::{
    determinism, scheduler, HarmonicIntegrator, HarmonicParams, Ladder, RunManifest, RunSummary,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Parser, Debug)]
#[command(name = "rex-sim", about = "Replica-exchange coordinator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute a replica-exchange run from a YAML job description.
    Run(RunArgs),
    /// Resume an interrupted run from a checkpoint file.
    Resume(ResumeArgs),
    /// Summarize an existing run directory from its manifest.
    Report(ReportArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// YAML job file describing the run and the harmonic test system.
    #[arg(long)]
    config: PathBuf,
    /// Output directory for run artefacts.
    #[arg(long)]
    out: PathBuf,
    /// Override the configured master seed.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct ResumeArgs {
    /// Checkpoint file produced by `rex-sim run`.
    #[arg(long)]
    checkpoint: PathBuf,
    /// Harmonic system parameters; must match the original run.
    #[arg(long)]
    system: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Run directory produced by `rex-sim run`.
    #[arg(long)]
    input: PathBuf,
}

#[derive(Debug, Deserialize)]
struct JobFile {
    run: RunConfig,
    #[serde(default)]
    system: HarmonicParams,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run_job(args),
        Command::Resume(args) => resume_job(args),
        Command::Report(args) => report(args),
    }
}

fn run_job(args: RunArgs) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&args.out)?;
    let mut job = load_job(&args.config)?;
    job.run.output.run_directory = Some(args.out.clone());
    if let Some(seed) = args.seed {
        job.run.seed_policy.master_seed = seed;
    }

    let integrator = HarmonicIntegrator::new(job.system);
    let ladder = Ladder::from_config(&job.run.ladder)?;
    let states: Vec<_> = (0..ladder.len())
        .map(|index| {
            integrator.initial_microstate(
                determinism::replica_seed(job.run.seed_policy.master_seed, index),
                ladder.value_at(index),
            )
        })
        .collect();

    let summary = scheduler::run(&job.run, &integrator, states)?;
    write_json(args.out.join("summary.json"), &summary)?;
    print_outcome(&summary);

    // Persist the job file next to the artefacts for reproducibility.
    fs::copy(&args.config, args.out.join("job.yaml")).ok();
    Ok(())
}

fn resume_job(args: ResumeArgs) -> Result<(), Box<dyn Error>> {
    let system = match &args.system {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            serde_yaml::from_str(&contents)?
        }
        None => HarmonicParams::default(),
    };
    let integrator = HarmonicIntegrator::new(system);
    let summary = scheduler::resume(&args.checkpoint, &integrator)?;
    if let Some(run_dir) = summary
        .manifest_path
        .as_ref()
        .and_then(|path| path.parent())
    {
        write_json(run_dir.join("summary.json"), &summary)?;
    }
    print_outcome(&summary);
    Ok(())
}

fn report(args: ReportArgs) -> Result<(), Box<dyn Error>> {
    let manifest = RunManifest::load(&args.input.join("manifest.json"))?;
    let payload = json!({
        "state": manifest.state,
        "rounds_completed": manifest.rounds_completed,
        "master_seed": manifest.master_seed,
        "assignment": manifest.assignment,
        "degraded": manifest.degraded,
        "state_hash": manifest.state_hash,
        "config_hash": manifest.provenance.config_hash,
        "ladder_hash": manifest.provenance.ladder_hash,
        "created_at": manifest.provenance.created_at,
        "checkpoints": manifest.checkpoints,
        "snapshots": manifest.snapshots,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn load_job(path: &Path) -> Result<JobFile, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    let job: JobFile = serde_yaml::from_str(&contents)?;
    Ok(job)
}

fn print_outcome(summary: &RunSummary) {
    let payload = json!({
        "state": summary.state,
        "rounds_completed": summary.rounds_completed,
        "assignment": summary.assignment,
        "exchange_acceptance": summary.exchange_acceptance,
        "neighbor_overlap": summary.neighbor_overlap,
        "degraded": summary.degraded,
        "state_hash": summary.state_hash,
    });
    match serde_json::to_string_pretty(&payload) {
        Ok(text) => println!("{text}"),
        Err(err) => eprintln!("failed to render summary: {err}"),
    }
}

fn write_json<P: AsRef<Path>, T: serde::Serialize>(path: P, value: &T) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
