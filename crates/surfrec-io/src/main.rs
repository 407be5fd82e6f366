use clap::Parser;
use surfrec_io::cli::{run_integrate_command, run_simulate_command, Cli, Commands};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate { run, seed, strict } => {
            run_simulate_command(run, seed, strict)?;
        }
        Commands::Integrate {
            run,
            dt,
            save_stride,
        } => {
            run_integrate_command(run, dt, save_stride)?;
        }
    }

    Ok(())
}
