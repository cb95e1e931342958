mod config;
mod error;
mod models;
mod utils;

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use dotenv::dotenv;
use log::{debug, error, info};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use crate::config::{Cli, Settings};
use crate::error::{Result, ResultError};
use crate::models::ResultReport;
use crate::utils::board::parse_result;
use crate::utils::fetch::Fetcher;
use crate::utils::report::{render_json, Presenter};
use crate::utils::terminal::{wait_with_spinner, SPINNER_INTERVAL};

fn print_install_help(tool: &str) {
    eprintln!("\n========================================");
    eprintln!("{tool} is not installed on your system.");
    eprintln!("========================================\n");
    eprintln!("To install {tool}, run ONE of these commands:\n");
    eprintln!("Ubuntu/Debian:\n  sudo apt-get update && sudo apt-get install -y {tool}\n");
    eprintln!("Fedora/RHEL/CentOS:\n  sudo dnf install -y {tool}\n");
    eprintln!("Arch Linux:\n  sudo pacman -S {tool}\n");
    eprintln!("macOS:\n  brew install {tool}\n");
    eprintln!("After installing, run this program again (or pass --backend http).");
    eprintln!("========================================");
}

async fn run<W: Write>(settings: Settings, out: &mut W) -> Result<()> {
    let fetcher = Fetcher::new(settings.backend, settings.endpoint.clone())?;
    fetcher.ensure_available().await?;

    // Download and parse in the background while the banner is typed.
    let student = settings.student.clone();
    info!("Fetching result for roll {} from {}", student.roll, settings.endpoint);
    let task = tokio::spawn(async move {
        let html = fetcher.fetch(&student).await?;
        parse_result(&html)
    });

    let presenter = Presenter {
        animate: settings.animate,
        type_delay: settings.type_delay,
        student_name: settings.student_name.clone(),
    };

    let scraped = if settings.json {
        task.await??
    } else {
        presenter.banner(out).await.map_err(ResultError::Output)?;
        if settings.animate {
            wait_with_spinner(task, out, SPINNER_INTERVAL).await??
        } else {
            task.await??
        }
    };
    let report = ResultReport::new(settings.student, scraped);

    if settings.json {
        let json = render_json(&report).map_err(|e| ResultError::Output(e.into()))?;
        return writeln!(out, "{json}").map_err(ResultError::Output);
    }

    presenter.report(out, &report).map_err(ResultError::Output)?;
    presenter.signature(out).await.map_err(ResultError::Output)?;
    Ok(())
}

fn exit_status(result: &Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

// What the user is told when a run fails for anything but a missing downloader.
fn failure_message(e: &ResultError) -> String {
    match e {
        ResultError::Output(e) => format!("Could not print the result: {e}"),
        _ => "Failed to fetch result!\nPlease check your roll number and registration number.".to_string(),
    }
}

// Entry point for the async main function, powered by tokio runtime.
#[tokio::main]
async fn main() -> ExitCode {
    // Loads environment variables from a `.env` file, if present.
    dotenv().ok();

    let cli = Cli::parse();
    let settings = match Settings::from_cli(cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    // Logs go to stderr so the report (or JSON) owns stdout.
    if let Err(e) = TermLogger::init(settings.log_level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("Could not initialise logging: {}", e);
    }
    debug!("Settings: {:?}", settings);

    let result = run(settings, &mut io::stdout()).await;
    match &result {
        Ok(()) => {}
        Err(ResultError::CapabilityMissing(tool)) => {
            error!("{} is required by the selected backend", tool);
            print_install_help(tool);
        }
        Err(e) => {
            error!("Error retrieving result: {}", e);
            eprintln!("{}", failure_message(e));
        }
    }
    ExitCode::from(exit_status(&result))
}
