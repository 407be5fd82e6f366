use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use surfrec_core::EventRng;
use surfrec_io::TrajectoryWriter;
use surfrec_models::{RecombinationCoefficients, RunInput};
use surfrec_sampler::{MeanFieldIntegrator, OdeSpec, Sampler};

#[derive(Parser, Debug)]
#[command(about = "Compare averaged SSA runs with the mean-field rate equations on the full surface network")]
struct Args {
    #[arg(long, default_value_t = 20)]
    runs: usize,

    #[arg(long, default_value_t = 7)]
    seed: u64,

    #[arg(long, default_value_t = 1e-5)]
    t_stop: f64,

    #[arg(long, default_value = "runs")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let names = [
        "Physisorption",
        "Chemisorption",
        "Surface Diffusion",
        "Langmuir-Hinshelwood recombination",
    ];
    let mut numbers = vec![
        200.0, 500.0, 0.016, // Tw, Tg, M
        1.0, 1e15, 30e3, // k1, vd, Ed
        1.0, 1.0, 17.5e3, // k3, k4, Er
        1e13, 15e3, // vD, ED
        17.5e3, // ELHF
        200.0, 0.0, 0.0, 150.0, 30.0, 0.0, // A, Af, As, Fv, Sv, A2
    ];
    numbers.push(args.t_stop);

    let mut input = RunInput::from_numbers(&names, &numbers)?;
    let network = input.compose()?;
    let species = network.species.names();
    println!("Species: {}", species.join(" "));

    // Mean field
    let ode = MeanFieldIntegrator::new(&network.events, network.n_species())?;
    // surface diffusion onto 30 free sites is stiff: keep dt * k * Sv well below 1
    let spec = OdeSpec::new(args.t_stop / 1e6, args.t_stop).with_stride(10_000);
    let mean_field = ode.integrate(input.initial.clone(), &spec)?;
    let ode_final = mean_field.final_state().cloned().unwrap_or_else(|| input.initial.clone());

    // Stochastic ensemble
    let sampler = Sampler::new(&network.events, network.n_species())?;
    let mut rng = EventRng::new(args.seed);
    let mut mean = vec![0.0; network.n_species()];
    let mut last_run = None;
    for _ in 0..args.runs {
        let outcome = sampler.run(input.initial.clone(), input.t_stop, &mut rng)?;
        if let Some(state) = outcome.trajectory.final_state() {
            for (m, x) in mean.iter_mut().zip(state.iter()) {
                *m += x / args.runs as f64;
            }
        }
        last_run = Some(outcome.trajectory);
    }

    println!("\n{:<4} {:>12} {:>12}", "", "SSA mean", "RK4");
    for (i, name) in species.iter().enumerate() {
        println!("{:<4} {:>12.3} {:>12.3}", name, mean[i], ode_final[i]);
    }

    if let Some(gamma) = RecombinationCoefficients::estimate(&network, &input.initial, &ode_final) {
        println!("\nMean-field recombination coefficient: {:e}", gamma.total);
    }

    std::fs::create_dir_all(&args.out_dir)?;
    let writer = TrajectoryWriter::new(species, network.n_events());
    writer.write_file(&mean_field, &args.out_dir.join("mean_field.txt"))?;
    if let Some(trajectory) = last_run {
        writer.write_file(&trajectory, &args.out_dir.join("ssa_last.txt"))?;
    }
    println!("\nTrajectories written to {}", args.out_dir.display());

    Ok(())
}
