// Prevents additional console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use searchlight::settings::Settings;
use searchlight::startup::{StartupOutcome, run};

use std::process::ExitCode;

use log::error;

fn main() -> ExitCode {
    let settings = Settings::load();

    match run(&settings) {
        Ok(StartupOutcome::Primary) | Ok(StartupOutcome::Forwarded(_)) => ExitCode::SUCCESS,
        Err(e) => {
            // The logger may be what failed.
            eprintln!("{e}");
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
