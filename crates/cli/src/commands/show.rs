//! `agora show` — Print an exported room.

use std::path::Path;
use agora_core::ChatRoom;

pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let room = ChatRoom::load(path).map_err(|e| format!("Cannot read {}: {e}", path.display()))?;

    println!("💬 {} ({} messages)", room.name(), room.len());
    println!("{}", "=".repeat(room.name().chars().count() + 3));
    println!("{}", room.render());

    Ok(())
}
