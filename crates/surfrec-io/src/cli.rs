use crate::{StagedOutput, TrajectoryWriter};
use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};
use surfrec_core::{EventRng, State, Time, Trajectory};
use surfrec_models::{ComposedNetwork, RecombinationCoefficients, RunInput};
use surfrec_sampler::{ClampPolicy, MeanFieldIntegrator, OdeSpec, Sampler, SsaOutcome};

const DEFAULT_OUTPUT: &str = "output.txt";
const PROGRESS_TICKS: u64 = 1000;

#[derive(Parser)]
#[command(name = "surfrec")]
#[command(about = "surfrec - stochastic kinetics of atom recombination on surfaces")]
#[command(long_about = "Composes adsorption, desorption, diffusion and recombination channels \
into one reaction network and evolves the surface populations exactly (SSA) or in the \
mean-field limit (RK4)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the exact stochastic simulation and write the trajectory
    Simulate {
        #[command(flatten)]
        run: RunArgs,

        /// Random seed (drawn from the OS when absent)
        #[arg(long)]
        seed: Option<u64>,

        /// Fail instead of clamping when an event would make a population negative
        #[arg(long)]
        strict: bool,
    },

    /// Integrate the mean-field rate equations of the same network
    Integrate {
        #[command(flatten)]
        run: RunArgs,

        /// Step size (default: t_stop / 10000)
        #[arg(long)]
        dt: Option<f64>,

        /// Save every nth step (the final state is always saved)
        #[arg(long, default_value = "1")]
        save_stride: usize,
    },
}

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Reaction names, then Tw Tg M, rate constants, initial populations and stop time
    #[arg(
        required_unless_present = "config",
        conflicts_with = "config",
        allow_hyphen_values = true
    )]
    pub args: Vec<String>,

    /// Output trajectory file (default: output.txt)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Show a progress bar keyed on simulated time
    #[arg(long)]
    pub progress: bool,

    /// JSON run configuration used instead of positional arguments
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Run configuration file.
///
/// ```json
/// { "reactions": ["Physisorption"],
///   "parameters": [300, 500, 0.016, 1, 1e13, 20000, 1000, 0, 1000, 1e-9],
///   "seed": 7 }
/// ```
///
/// `parameters` is the same flat numeric list the command line takes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub reactions: Vec<String>,
    pub parameters: Vec<f64>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub out: Option<PathBuf>,
}

impl RunConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }
}

/// Positional or file input, resolved.
struct ResolvedRun {
    input: RunInput,
    network: ComposedNetwork,
    output: StagedOutput,
    seed: Option<u64>,
}

fn resolve(run: &RunArgs) -> anyhow::Result<ResolvedRun> {
    let (mut input, config) = match &run.config {
        Some(path) => {
            let config = RunConfig::load(path)?;
            let input = RunInput::from_numbers(config.reactions.as_slice(), &config.parameters)
                .with_context(|| format!("Invalid run configuration in {}", path.display()))?;
            (input, Some(config))
        }
        None => {
            if run.args.is_empty() {
                bail!("no reactions given");
            }
            let input = RunInput::from_tokens(run.args.as_slice()).context("Invalid arguments")?;
            (input, None)
        }
    };
    let network = input.compose().context("Failed to compose reaction network")?;

    let out = run
        .out
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.out.clone()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let seed = config.and_then(|c| c.seed);
    // opened now so an unwritable path fails before the run, not after it
    let output = StagedOutput::create(&out)
        .with_context(|| format!("Failed to open output {}", out.display()))?;

    Ok(ResolvedRun {
        input,
        network,
        output,
        seed,
    })
}

fn progress_bar(enabled: bool) -> anyhow::Result<Option<ProgressBar>> {
    if !enabled {
        return Ok(None);
    }
    let pb = ProgressBar::new(PROGRESS_TICKS);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg}\n{bar:40.cyan/blue} {percent}% ({elapsed})")?
            .progress_chars("##-"),
    );
    Ok(Some(pb))
}

fn progress_observer<'p>(pb: Option<&'p ProgressBar>, t_stop: Time) -> impl FnMut(Time) + 'p {
    move |t| {
        if let Some(pb) = pb {
            let fraction = if t_stop > 0.0 { (t / t_stop).min(1.0) } else { 1.0 };
            pb.set_position((fraction * PROGRESS_TICKS as f64) as u64);
        }
    }
}

fn print_network(resolved: &ResolvedRun) {
    let network = &resolved.network;
    println!("Reactions: {}", resolved.input.selection.names().join(", "));
    println!("Species: {}", network.species.names().join(" "));
    println!("Initial populations: {:?}", resolved.input.initial.as_slice());
    println!("Stop time: {:e}", resolved.input.t_stop);
    println!("Incident flux phi_O: {:e}", network.context.incident_flux());
    println!("Events:");
    for (i, event) in network.events.iter().enumerate() {
        println!("  R{} {:<26} k = {:e}", i + 1, event.channel.equation(), event.k);
    }
}

fn print_final(network: &ComposedNetwork, initial: &State, trajectory: &Trajectory) {
    let Some(final_state) = trajectory.final_state() else {
        return;
    };
    println!("Final populations:");
    for (name, x) in network.species.names().iter().zip(final_state.iter()) {
        println!("  {:<3} {}", name, x);
    }
    match RecombinationCoefficients::estimate(network, initial, final_state) {
        Some(gamma) => {
            println!("Recombination coefficients:");
            println!("  gamma_ER  = {:e}", gamma.eley_rideal);
            println!("  gamma_LHS = {:e}", gamma.lh_heterogeneous);
            println!("  gamma_LHF = {:e}", gamma.lh_homodimer);
            println!("  gamma     = {:e}", gamma.total);
        }
        None => println!("Recombination coefficients: undefined (no incident flux or no sites)"),
    }
}

fn write_output(network: &ComposedNetwork, trajectory: &Trajectory, output: StagedOutput) -> anyhow::Result<()> {
    let out = output.path().to_path_buf();
    output
        .commit(&TrajectoryWriter::new(network.species.names(), network.n_events()), trajectory)
        .with_context(|| format!("Failed to write trajectory to {}", out.display()))?;
    println!("Wrote {} rows to {}", trajectory.len(), out.display());
    Ok(())
}

/// Composes the network, runs the SSA and writes the trajectory.
pub fn run_simulate_command(run: RunArgs, seed: Option<u64>, strict: bool) -> anyhow::Result<SsaOutcome> {
    let resolved = resolve(&run)?;
    let mut rng = match seed.or(resolved.seed) {
        Some(seed) => EventRng::new(seed),
        None => EventRng::from_entropy(),
    };

    println!("surfrec simulate");
    println!("================");
    print_network(&resolved);
    println!("Seed: {}", rng.seed());

    let policy = if strict { ClampPolicy::Strict } else { ClampPolicy::Clamp };
    let sampler = Sampler::new(&resolved.network.events, resolved.network.n_species())?
        .with_clamp_policy(policy);

    let pb = progress_bar(run.progress)?;
    if let Some(pb) = &pb {
        pb.set_message("simulating");
    }
    let outcome = sampler.run_with_observer(
        resolved.input.initial.clone(),
        resolved.input.t_stop,
        &mut rng,
        progress_observer(pb.as_ref(), resolved.input.t_stop),
    );
    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }
    let outcome = outcome.context("Simulation failed")?;
    info!("SSA terminated: {:?}", outcome.termination);

    println!();
    println!("Summary:");
    println!("========");
    println!("Termination: {:?}", outcome.termination);
    println!("Steps: {}", outcome.trajectory.n_steps());
    if let Some(t) = outcome.trajectory.final_time() {
        println!("Last event time: {:e}", t);
    }
    if outcome.clamped_steps > 0 {
        println!("Clamped steps: {}", outcome.clamped_steps);
    }
    print_final(&resolved.network, &resolved.input.initial, &outcome.trajectory);

    write_output(&resolved.network, &outcome.trajectory, resolved.output)?;
    Ok(outcome)
}

/// Composes the network, integrates the rate equations and writes the trajectory.
pub fn run_integrate_command(run: RunArgs, dt: Option<f64>, save_stride: usize) -> anyhow::Result<Trajectory> {
    let resolved = resolve(&run)?;
    let t_stop = resolved.input.t_stop;
    let dt = dt.unwrap_or(if t_stop > 0.0 { t_stop / 10_000.0 } else { 1.0 });
    let spec = OdeSpec::new(dt, t_stop).with_stride(save_stride);

    println!("surfrec integrate");
    println!("=================");
    print_network(&resolved);
    println!("dt: {:e}", spec.dt);
    println!("Save stride: {}", spec.save_stride);

    let integrator = MeanFieldIntegrator::new(&resolved.network.events, resolved.network.n_species())?;
    let pb = progress_bar(run.progress)?;
    if let Some(pb) = &pb {
        pb.set_message("integrating");
    }
    let trajectory = integrator.integrate_with_observer(
        resolved.input.initial.clone(),
        &spec,
        progress_observer(pb.as_ref(), t_stop),
    );
    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }
    let trajectory = trajectory.context("Integration failed")?;

    println!();
    println!("Summary:");
    println!("========");
    println!("Steps: {}", spec.n_steps());
    println!("Snapshots: {}", trajectory.len());
    print_final(&resolved.network, &resolved.input.initial, &trajectory);

    write_output(&resolved.network, &trajectory, resolved.output)?;
    Ok(trajectory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_tokens_keep_multi_word_names() {
        let cli = Cli::try_parse_from([
            "surfrec", "simulate", "--seed", "3", "Surface Diffusion", "300", "500", "0.016",
            "1e13", "15000", "5", "0", "5", "5", "1.0",
        ])
        .unwrap();
        match cli.command {
            Commands::Simulate { run, seed, strict } => {
                assert_eq!(run.args[0], "Surface Diffusion");
                assert_eq!(run.args.len(), 11);
                assert_eq!(seed, Some(3));
                assert!(!strict);
                assert!(run.out.is_none());
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn config_and_positional_args_conflict() {
        let parsed = Cli::try_parse_from([
            "surfrec", "integrate", "--config", "run.json", "Basic", "1", "1", "1", "0", "1",
        ]);
        assert!(parsed.is_err());
        assert!(Cli::try_parse_from(["surfrec", "integrate"]).is_err());
    }

    #[test]
    fn config_file_fields() {
        let config: RunConfig = serde_json::from_str(
            r#"{"reactions": ["Basic"], "parameters": [1, 2, 10, 0, 1.5], "out": "basic.txt"}"#,
        )
        .unwrap();
        assert_eq!(config.reactions, vec!["Basic"]);
        assert_eq!(config.parameters.len(), 5);
        assert_eq!(config.seed, None);
        assert_eq!(config.out, Some(PathBuf::from("basic.txt")));
        assert!(serde_json::from_str::<RunConfig>(r#"{"reactions": [], "parameters": [], "dt": 1}"#).is_err());
    }
}
