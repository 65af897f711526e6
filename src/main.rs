use anyhow::{Context, Result};
use building_sprites::{batch, logging};
use std::path::Path;

fn main() -> Result<()> {
    logging::init();

    let dir = Path::new(batch::BUILDINGS_DIR);
    batch::run(dir).with_context(|| format!("Cannot process {}", dir.display()))?;

    Ok(())
}
