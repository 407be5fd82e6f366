use approx::assert_relative_eq;
use std::path::Path;
use surfrec_io::{read_trajectory_file, run_integrate_command, run_simulate_command, RunArgs};
use surfrec_sampler::TerminationReason;
use tempfile::tempdir;

const PHYSISORPTION: [&str; 11] = [
    "Physisorption", "300", "500", "0.016", "1", "1e13", "20000", "1000", "0", "1000", "1e-9",
];

fn args(tokens: &[&str], out: &Path) -> RunArgs {
    RunArgs {
        args: tokens.iter().map(|t| t.to_string()).collect(),
        out: Some(out.to_path_buf()),
        progress: false,
        config: None,
    }
}

#[test]
fn physisorption_scenario() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("physisorption.txt");
    let outcome = run_simulate_command(args(&PHYSISORPTION, &out), Some(17), true).unwrap();

    assert_eq!(outcome.termination, TerminationReason::StopTimeReached);
    assert!(outcome.trajectory.n_steps() > 0);

    let table = read_trajectory_file(&out).unwrap();
    assert_eq!(table.species, vec!["A", "Af", "Fv"]);
    assert_eq!(table.n_events, 2);
    assert_eq!(table.trajectory.len(), outcome.trajectory.n_steps() + 1);
    assert_eq!(table.trajectory.snapshots, outcome.trajectory.snapshots);

    let times: Vec<f64> = table.trajectory.times().collect();
    assert!(times.windows(2).all(|w| w[1] >= w[0]));
    assert!(times.iter().all(|&t| t <= 1e-9));

    let first = table.trajectory.initial_state().unwrap();
    let last = table.trajectory.final_state().unwrap();
    assert_eq!(first.as_slice(), &[1000.0, 0.0, 1000.0]);
    assert!(last[1] > 0.0, "Af should rise from zero");
    assert!(last[0] < 1000.0 && last[2] < 1000.0);
}

#[test]
fn fixed_seed_gives_identical_files() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.txt");
    let second = dir.path().join("second.txt");
    run_simulate_command(args(&PHYSISORPTION, &first), Some(5), false).unwrap();
    run_simulate_command(args(&PHYSISORPTION, &second), Some(5), false).unwrap();

    let a = std::fs::read(&first).unwrap();
    let b = std::fs::read(&second).unwrap();
    assert!(!a.is_empty());
    assert_eq!(a, b);
}

#[test]
fn config_file_drives_integration() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("basic.txt");
    let config = dir.path().join("basic.json");
    std::fs::write(
        &config,
        format!(
            r#"{{"reactions": ["Basic"], "parameters": [2, 1, 90, 0, 1], "out": {:?}}}"#,
            out.to_str().unwrap()
        ),
    )
    .unwrap();

    let run = RunArgs {
        args: Vec::new(),
        out: None,
        progress: false,
        config: Some(config),
    };
    let trajectory = run_integrate_command(run, Some(1e-3), 250).unwrap();
    assert_eq!(trajectory.len(), 5);

    let table = read_trajectory_file(&out).unwrap();
    let last = table.trajectory.final_state().unwrap();
    let exact = 30.0 + 60.0 * (-3.0f64).exp();
    assert_relative_eq!(last[0], exact, max_relative = 1e-8);
    assert_relative_eq!(last[0] + last[1], 90.0, max_relative = 1e-12);
}

#[test]
fn bad_input_writes_nothing() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("never.txt");

    let unknown = ["Teleportation", "1", "1", "1", "0", "1"];
    assert!(run_simulate_command(args(&unknown, &out), Some(1), false).is_err());

    let short = ["Basic", "1", "1", "10", "0"];
    assert!(run_simulate_command(args(&short, &out), Some(1), false).is_err());

    let trailing = ["Basic", "1", "1", "10", "0", "1", "oops"];
    assert!(run_simulate_command(args(&trailing, &out), Some(1), false).is_err());

    assert!(!out.exists());
}

#[test]
fn unwritable_output_is_an_error() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("missing").join("out.txt");
    let basic = ["Basic", "1", "1", "10", "0", "1"];

    // the output is opened before the engine runs, so the failure is the
    // open, never the post-run write
    let err = run_simulate_command(args(&basic, &out), Some(1), false).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("Failed to open output"), "{}", message);
    assert!(!message.contains("Failed to write trajectory"), "{}", message);

    let err = run_integrate_command(args(&basic, &out), None, 1).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to open output"));
    assert!(!out.exists());
    assert!(!dir.path().join("missing").exists());
}

#[test]
fn failed_run_removes_staged_output() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("basic.txt");
    // rk4 rejects a negative step after the output has been staged
    let err = run_integrate_command(args(&["Basic", "1", "1", "10", "0", "1"], &out), Some(-1.0), 1)
        .unwrap_err();
    assert!(format!("{:#}", err).contains("Integration failed"));
    assert!(!out.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
