use log::error;
use std::process::ExitCode;

use timetable_solver::server;
use timetable_solver::server::SolveRequest;

fn solve_file(path: &str) -> Result<String, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    let request: SolveRequest = serde_json::from_str(&raw)?;
    let report = timetable_solver::solve(&request.input, &request.config)?;
    Ok(serde_json::to_string_pretty(&report)?)
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // a request file on the command line is solved once; otherwise serve HTTP
    if let Some(path) = std::env::args().nth(1) {
        return match tokio::task::spawn_blocking(move || solve_file(&path).map_err(|e| e.to_string())).await {
            Ok(Ok(report)) => {
                println!("{report}");
                ExitCode::SUCCESS
            }
            Ok(Err(e)) => {
                error!("{e}");
                ExitCode::FAILURE
            }
            Err(e) => {
                error!("Solver task failed: {e}");
                ExitCode::FAILURE
            }
        };
    }

    if let Err(e) = server::run_server().await {
        error!("Server stopped: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
