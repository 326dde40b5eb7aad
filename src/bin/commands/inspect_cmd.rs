use anyhow::{Context, Result};
use ipdb::Reader;
use serde_json::json;
use std::path::PathBuf;

use crate::cli_utils::{format_unix_timestamp, ip_version_label};

pub fn cmd_inspect(database: PathBuf, json_output: bool) -> Result<()> {
    let reader = Reader::open(&database)
        .with_context(|| format!("Failed to load database: {}", database.display()))?;
    let meta = reader.meta()?;
    let languages = meta.language_names();

    if json_output {
        let output = json!({
            "file": database.display().to_string(),
            "build": meta.build,
            "ip_version": meta.ip_version,
            "supports_ipv4": meta.supports_ipv4(),
            "supports_ipv6": meta.supports_ipv6(),
            "node_count": meta.node_count,
            "total_size": meta.total_size,
            "languages": meta.languages,
            "fields": meta.fields,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Database:   {}", database.display());
        println!("Built:      {}", format_unix_timestamp(meta.build));
        println!("IP version: {}", ip_version_label(&meta));
        println!("Nodes:      {}", meta.node_count);
        println!("Total size: {} bytes", meta.total_size);
        println!("Languages:  {}", languages.join(", "));
        println!();
        println!("Fields:");
        for field in &meta.fields {
            println!("  {}", field);
        }
    }

    Ok(())
}
