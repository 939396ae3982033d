/// TableLens command line
///
/// Loads a CSV file, answers one JSON request against it and prints the JSON
/// response on stdout.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tablelens::{Explorer, LensError, Response, Table};

#[derive(Parser)]
#[command(name = "tablelens", about = "Explore a CSV file: preview, group, describe and chart")]
struct Cli {
    /// CSV file to load
    #[arg(long, env = "TABLELENS_DATA")]
    data: PathBuf,

    /// JSON request, e.g. '{"type":"Describe"}'
    #[arg(long, env = "TABLELENS_REQUEST", default_value = r#"{"type":"Overview"}"#)]
    request: String,

    /// Read the JSON request from a file instead of --request
    #[arg(long)]
    request_file: Option<PathBuf>,

    /// Pretty-print the response
    #[arg(long, env = "TABLELENS_PRETTY")]
    pretty: bool,
}

fn read_file(path: &PathBuf) -> tablelens::Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| LensError::Parse(format!("Cannot read {}: {}", path.display(), e)))
}

fn run(cli: &Cli) -> tablelens::Result<String> {
    let csv = read_file(&cli.data)?;
    let name = cli
        .data
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string());
    let table = Table::from_csv(&name, &csv)?;
    log::info!(
        "Loaded '{}': {} rows, {} columns",
        table.name(),
        table.row_count(),
        table.column_count()
    );

    let request = match &cli.request_file {
        Some(path) => read_file(path)?,
        None => cli.request.clone(),
    };

    let explorer = Explorer::new(table);
    let response = explorer.handle_json(&request);
    if !cli.pretty {
        return Ok(response);
    }
    let value: serde_json::Value = serde_json::from_str(&response)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

fn main() -> ExitCode {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();
    match run(&cli) {
        Ok(output) => {
            let failed = serde_json::from_str::<serde_json::Value>(&output)
                .map(|v| v["type"] == "Error")
                .unwrap_or(false);
            println!("{}", output);
            if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            log::error!("{}", e);
            println!(
                "{}",
                serde_json::to_string(&Response::error(e.to_string()))
                    .unwrap_or_else(|_| e.to_string())
            );
            ExitCode::FAILURE
        }
    }
}
