//! `agora init` — Write a sample room file.

use std::path::Path;
use agora_config::RoomConfig;

pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        println!("⚠️  {} already exists, leaving it alone", path.display());
        return Ok(());
    }

    write_sample(path)?;
    println!("✅ Created sample room at: {}", path.display());
    println!("\n📝 Next steps:");
    println!("   1. Set AGORA_API_KEY (or OPENROUTER_API_KEY)");
    println!("   2. agora run {} --ticks 3", path.display());

    Ok(())
}

fn write_sample(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(path, RoomConfig::sample().to_yaml()?)?;
    Ok(())
}
