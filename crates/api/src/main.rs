use std::sync::Arc;

use api::config::Config;
use api::context::AppContext;
use api::router::build_router;
use futures::StreamExt;
use mitigation_condition::ReqwestIsimClient;
use mitigation_executor::actuator::ReqwestActuator;
use mitigation_ingest::IngestCore;
use mitigation_store::StateStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive("api=info".parse()?))
        .init();

    // InvalidEnvironmentError: only startup-time misconfiguration is fatal
    // (spec §7) — everything below either succeeds or we exit now.
    let config = Config::from_env()?;
    tracing::info!(store_path = %config.store_path, bus_url = %config.bus_url, "starting mitigation engine");

    let store = StateStore::connect(&config.store_path, config.store_timeout).await?;
    let isim = Arc::new(ReqwestIsimClient::new(config.isim_url.clone(), config.isim_timeout));
    let actuator = Arc::new(ReqwestActuator::new(config.actuator_timeout));
    let ingest = IngestCore::new(store.clone(), isim.clone(), actuator.clone(), config.scoring, config.max_in_flight);

    let ctx = Arc::new(AppContext { store, isim, actuator, ingest });

    spawn_bus_subscriber(ctx.clone(), &config.bus_url, &config.bus_subject).await;

    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(&config.admin_bind).await?;
    tracing::info!(addr = %config.admin_bind, "admin API listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Subscribes to the alert bus subject and pushes every message through the
/// ingest pipeline. Connection loss is logged and left to the NATS client's
/// own reconnection logic (spec §6: not startup-time, so not fatal).
async fn spawn_bus_subscriber(ctx: Arc<AppContext>, bus_url: &str, subject: &str) {
    let subject = subject.to_string();
    match async_nats::connect(bus_url).await {
        Ok(client) => match client.subscribe(subject.clone()).await {
            Ok(mut subscription) => {
                tokio::spawn(async move {
                    while let Some(message) = subscription.next().await {
                        match serde_json::from_slice::<serde_json::Value>(&message.payload) {
                            Ok(raw) => {
                                if let Err(err) = ctx.ingest.ingest(raw).await {
                                    tracing::error!(error = %err, "ingest failed for bus alert");
                                }
                            }
                            Err(err) => {
                                tracing::warn!(error = %err, "dropping unparseable bus message");
                            }
                        }
                    }
                });
                tracing::info!(subject = %subject, "subscribed to alert bus");
            }
            Err(err) => tracing::warn!(error = %err, "failed to subscribe to alert bus subject"),
        },
        Err(err) => tracing::warn!(error = %err, bus_url = %bus_url, "failed to connect to alert bus"),
    }
}
