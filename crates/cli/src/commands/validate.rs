//! `agora validate` — Parse a room file and summarize it.

use std::path::Path;
use agora_config::RoomConfig;

pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let room = RoomConfig::load(path)?;

    println!("✅ {} is valid", path.display());
    println!("  Room:      {}", room.name);
    println!("  Messages:  {}", room.initial_state.len());
    println!("  Agents:");
    for agent in &room.agents {
        println!(
            "    - {:<12} {:<10} {} (window {}{})",
            agent.name,
            format!("{:?}", agent.kind).to_lowercase(),
            agent.model_reference,
            agent.history_window,
            if agent.is_gated() { ", gated" } else { "" },
        );
    }

    Ok(())
}
