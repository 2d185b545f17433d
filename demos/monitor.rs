use std::sync::Arc;

use myair3::{Config, Update};

/// Run with: MYAIR3_HOST=192.168.1.50 cargo run --example monitor
#[tokio::main]
async fn main() -> myair3::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let coordinator = Arc::new(
        config
            .builder()
            .on_update(|update| match update {
                Update::Refreshed(snapshot) => {
                    println!(
                        "System: {} | mode: {} | fan: {} | {:.1}\u{00b0}C (target {:.1}\u{00b0}C)",
                        if snapshot.is_on() { "on" } else { "off" },
                        snapshot.hvac_mode().as_str(),
                        snapshot.fan().as_str(),
                        snapshot.central_actual_temp,
                        snapshot.central_desired_temp,
                    );
                    for zone in snapshot.zones.values() {
                        println!(
                            "  [{}] {} | {:.1}\u{00b0}C / target {:.1}\u{00b0}C | damper {}%{}",
                            zone.id,
                            zone.name,
                            zone.current_temp(),
                            zone.target_temp(),
                            zone.user_percent_setting,
                            if zone.temp_sensor_available() { "" } else { " | LOW BATT" },
                        );
                    }
                }
                Update::Failed(e) => eprintln!("Refresh failed: {e}"),
            })
            .build()?,
    );

    println!("Connecting to {}...", coordinator.host());
    coordinator.first_refresh().await?;
    println!(
        "Connected. Polling every {}s (Ctrl-C to stop)...",
        coordinator.update_interval().as_secs()
    );

    let poller = coordinator.spawn();
    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("failed to listen for Ctrl-C: {e}");
    }
    poller.abort();

    let diagnostics = coordinator.diagnostics();
    println!(
        "{}",
        serde_json::to_string_pretty(&diagnostics).unwrap_or_default()
    );
    Ok(())
}
