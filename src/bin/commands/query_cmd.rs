use anyhow::{Context, Result};
use ipdb::{IpdbError, Reader};
use serde_json::{json, Map, Value};
use std::path::PathBuf;

pub fn cmd_query(database: PathBuf, ip: String, language: String, json_output: bool) -> Result<()> {
    let reader = Reader::open(&database)
        .with_context(|| format!("Failed to load database: {}", database.display()))?;

    let fields = reader.fields()?;
    let values = match reader.find(&ip, &language) {
        Ok(values) => values,
        Err(IpdbError::NotFound) => {
            if json_output {
                println!("null");
            } else {
                eprintln!("{}: not found", ip);
            }
            std::process::exit(1);
        }
        Err(e) => return Err(e).with_context(|| format!("Query failed for: {}", ip)),
    };

    if json_output {
        let mut object = Map::new();
        for (name, value) in fields.iter().zip(values) {
            object.insert(name.clone(), Value::String(value));
        }
        let output = json!({
            "ip": ip,
            "language": language,
            "data": object,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for (name, value) in fields.iter().zip(&values) {
            println!("{}: {}", name, value);
        }
    }

    Ok(())
}
