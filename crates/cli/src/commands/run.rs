//! `agora run` — Assemble a room and advance it tick by tick.

use std::path::Path;
use std::time::Duration;
use agora_config::{AppConfig, RoomConfig};
use agora_room::Agorama;
use tracing::info;

pub async fn run(
    room_path: &Path,
    ticks: usize,
    delay_ms: Option<u64>,
    export: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let room = RoomConfig::load(room_path)?;

    if !config.has_api_key() {
        tracing::warn!("No API key configured; set AGORA_API_KEY or run against a local provider");
    }

    let mut agorama = Agorama::from_config(&room, &config)
        .map_err(|e| format!("Cannot assemble room from {}: {e}", room_path.display()))?;
    if let Some(ms) = delay_ms {
        agorama = agorama.with_tick_delay(Duration::from_millis(ms));
    }

    info!(room = %room.name, ticks, "Starting room");
    for report in agorama.run(ticks).await {
        info!("{report}");
    }

    println!("{}", agorama.log().render());

    if let Some(path) = export {
        agorama.log().save(path)?;
        println!("\n📝 Room saved to {}", path.display());
    }

    Ok(())
}
