use std::{process::ExitCode, time::Instant};

use log::info;

use tsp_local_core::{Error, OutputTarget, Result, SolverOptions, logging, read_points, solve};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Help(usage)) => {
            print!("{usage}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run() -> Result<()> {
    let now = Instant::now();
    let options = SolverOptions::from_args()?;
    logging::init_logger(&options)?;

    info!("options: {options}");

    let target = OutputTarget::resolve(&options)?;
    let points = read_points(options.input_path())?;

    let solution = solve(&points, &options);
    target.write(&solution.tour)?;

    info!(
        "output: n={} length={:.4} isolated={} time={:.2}s",
        solution.tour.len(),
        solution.final_length,
        solution.isolated,
        now.elapsed().as_secs_f32()
    );

    Ok(())
}
