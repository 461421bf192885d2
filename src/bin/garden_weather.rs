use garden_weather::{GardenWeatherError, Pipeline, PipelineConfig};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

const CONFIG_ENV: &str = "GARDEN_WEATHER_CONFIG";

async fn load_config() -> Result<PipelineConfig, GardenWeatherError> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => PipelineConfig::from_json_file(&PathBuf::from(path)).await,
        None => {
            info!("{} not set, using default configuration", CONFIG_ENV);
            Ok(PipelineConfig::default())
        }
    }
}

async fn run() -> Result<(), GardenWeatherError> {
    let config = load_config().await?;
    let pipeline = Pipeline::new(config).await?;
    let summary = pipeline.run().call().await?;
    info!(
        "Wrote {} combined rows to {}",
        summary.combined.height(),
        summary.combined_path.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Run failed: {}", e);
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                error!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
