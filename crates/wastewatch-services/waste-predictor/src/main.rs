use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waste_predictor::{api::create_routes, Config, PredictionService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waste_predictor=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    config.validate()?;

    tracing::info!(
        listen_addr = %config.server.listen_addr,
        trash_data = ?config.data.trash_data_path,
        forest_trees = config.training.forest_trees,
        "Starting waste-predictor service"
    );

    let addr: SocketAddr = config.server.listen_addr.parse()?;
    let train_on_startup = config.training.train_on_startup;
    let service = Arc::new(PredictionService::from_config(config));

    if train_on_startup {
        let trainer = Arc::clone(&service);
        tokio::task::spawn_blocking(move || match trainer.train() {
            Ok(report) => tracing::info!(outcome = ?report.outcome, rows = report.rows, "startup training finished"),
            Err(err) => tracing::error!(error = %err, "startup training failed"),
        });
    }

    let app = create_routes().layer(axum::Extension(service));

    tracing::info!(?addr, "Waste predictor listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
