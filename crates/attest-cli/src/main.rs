use anyhow::Result;
use clap::{Parser, Subcommand};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "attest", about = "Attest liveness check-in CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a check-in session and follow it to completion
    Run,
    /// Cancel the running session
    Cancel,
    /// Show the current session snapshot
    Status,
    /// Signal an app foreground/background transition
    Foreground {
        /// "true" to resume, "false" to suspend
        value: bool,
    },
    /// Run camera diagnostics without the daemon
    Test,
}

async fn daemon_proxy() -> Result<zbus::Proxy<'static>> {
    let conn = zbus::Connection::session().await?;
    let proxy = zbus::Proxy::new(
        &conn,
        "org.attest.Attest1",
        "/org/attest/Attest1",
        "org.attest.Attest1",
    )
    .await?;
    Ok(proxy)
}

async fn follow_session(proxy: &zbus::Proxy<'static>) -> Result<()> {
    loop {
        tokio::time::sleep(Duration::from_secs(1)).await;
        let raw: String = proxy.call("Status", &()).await?;
        let status: serde_json::Value = serde_json::from_str(&raw)?;
        let session = &status["session"];
        let state = session["status"].as_str().unwrap_or("unknown");
        let guidance = session["guidance"].as_str().unwrap_or("");
        let remaining = session["remaining_secs"].as_u64().unwrap_or(0);

        match state {
            "processing" => println!("[{remaining:>2}s] {guidance}"),
            "success" => {
                println!("Check-in verified.");
                return Ok(());
            }
            "timeout" => {
                println!("Check-in timed out: {guidance}");
                return Ok(());
            }
            _ => {
                println!("Session ended ({state}).");
                return Ok(());
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            let proxy = daemon_proxy().await?;
            proxy.call::<_, _, ()>("StartSession", &()).await?;
            println!("Session started, look at the camera...");
            follow_session(&proxy).await?;
        }
        Commands::Cancel => {
            let proxy = daemon_proxy().await?;
            proxy.call::<_, _, ()>("CancelSession", &()).await?;
            println!("Session cancelled");
        }
        Commands::Status => {
            let proxy = daemon_proxy().await?;
            let raw: String = proxy.call("Status", &()).await?;
            println!("{raw}");
        }
        Commands::Foreground { value } => {
            let proxy = daemon_proxy().await?;
            proxy.call::<_, _, ()>("SetForeground", &(value)).await?;
            println!("Foreground set to {value}");
        }
        Commands::Test => {
            let devices = attest_hw::Camera::list_devices();
            if devices.is_empty() {
                println!("No V4L2 capture devices found");
                return Ok(());
            }
            for info in &devices {
                println!("{} — {} ({})", info.path, info.name, info.driver);
            }
            let camera = attest_hw::Camera::open(&devices[0].path)?;
            let frame = camera.capture_frame()?;
            println!(
                "Captured {}x{} frame, avg brightness {:.1}, JPEG {} bytes",
                frame.width,
                frame.height,
                frame.avg_brightness(),
                frame.to_jpeg()?.len()
            );
        }
    }

    Ok(())
}
