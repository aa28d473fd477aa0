use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

mod config;
mod dbus;
mod engine;
mod verifier;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("attestd starting");

    let config = config::Config::from_env();
    let session_config = config.session_config();
    session_config.validate()?;

    let engine = engine::spawn_engine(&config.camera_device, config.warmup_frames)?;
    let verifier = verifier::HttpVerifier::new(
        config.verify_endpoint.clone(),
        Duration::from_secs(config.verify_request_timeout_secs),
    );
    tracing::info!(endpoint = %config.verify_endpoint, "verification backend configured");

    let (outcome_tx, mut outcome_rx) = mpsc::channel(8);
    let handle = attest_core::spawn_session(
        Arc::new(engine),
        Arc::new(verifier),
        session_config,
        outcome_tx,
    );

    // Completion dismisses the capture surface so the next check-in
    // starts from Idle.
    let completion_handle = handle.clone();
    tokio::spawn(async move {
        while let Some(outcome) = outcome_rx.recv().await {
            tracing::info!(
                success = outcome.success,
                attempts = outcome.attempts,
                "check-in session completed"
            );
            let _ = completion_handle.set_visible(false).await;
        }
    });

    let _conn = zbus::connection::Builder::session()?
        .name("org.attest.Attest1")?
        .serve_at("/org/attest/Attest1", dbus::AttestService::new(handle))?
        .build()
        .await?;

    tracing::info!("attestd ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("attestd shutting down");

    Ok(())
}
