use std::fs::read_to_string;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use tierpack::api::{self, AppState};
use tierpack::config::Config;
use tierpack::{RawProblem, table};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load("tierpack.toml").unwrap_or_default();

    // With a file argument, solve once and print; otherwise serve HTTP.
    match std::env::args().nth(1) {
        Some(path) => run_file(&path, &config),
        None => serve(config).await,
    }
}

fn run_file(path: &str, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let buf = read_to_string(path)?;
    let payload: RawProblem = serde_yaml::from_str(&buf)?;
    let problem = payload.validate()?;
    let report = tierpack::run(&problem, &config.solve_options())?;

    println!("{}", serde_yaml::to_string(&report)?);
    if let Some(grid) = table::render(&problem, &report) {
        println!("{grid}");
    }
    Ok(())
}

async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState {
        options: config.solve_options(),
    });
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(config.server.listen.as_str()).await?;
    tracing::info!(listen = %config.server.listen, "serving optimize endpoint");
    axum::serve(listener, app).await?;
    Ok(())
}
