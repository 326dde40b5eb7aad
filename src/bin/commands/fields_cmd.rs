use anyhow::{Context, Result};
use ipdb::Reader;
use std::path::PathBuf;

pub fn cmd_fields(database: PathBuf) -> Result<()> {
    let reader = Reader::open(&database)
        .with_context(|| format!("Failed to load database: {}", database.display()))?;

    for field in reader.fields()? {
        println!("{}", field);
    }
    Ok(())
}
