mod cli_utils;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{cmd_fields, cmd_inspect, cmd_query};

#[derive(Parser)]
#[command(name = "ipdb")]
#[command(
    about = "Query and inspect IPDB geolocation databases",
    long_about = "ipdb - Memory-mapped reader for .ipdb IP geolocation databases\n\n\
    Looks up IPv4 and IPv6 addresses and prints the columns stored for the\n\
    requested language.\n\n\
    Examples:\n\
      ipdb query ipipfree.ipdb 114.114.114.114\n\
      ipdb query ipipfree.ipdb 8.8.8.8 --language EN --json\n\
      ipdb inspect ipipfree.ipdb\n\
      ipdb fields ipipfree.ipdb"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up an IP address
    Query {
        /// Path to the .ipdb file
        #[arg(value_name = "DATABASE")]
        database: PathBuf,

        /// IPv4 or IPv6 address
        #[arg(value_name = "IP")]
        ip: String,

        /// Language block to return (as declared in the metadata)
        #[arg(short, long, default_value = "CN")]
        language: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show database metadata
    Inspect {
        /// Path to the .ipdb file
        #[arg(value_name = "DATABASE")]
        database: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List field names, one per line
    Fields {
        /// Path to the .ipdb file
        #[arg(value_name = "DATABASE")]
        database: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Query {
            database,
            ip,
            language,
            json,
        } => cmd_query(database, ip, language, json),
        Commands::Inspect { database, json } => cmd_inspect(database, json),
        Commands::Fields { database } => cmd_fields(database),
    }
}
