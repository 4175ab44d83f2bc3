use anyhow::Result;
use clap::{Parser, Subcommand};

use reso_cli::commands;
use reso_cli::config::Config;
use reso_cli::paths;
use reso_cli::transport::{Client, ClientSettings};

#[derive(Parser)]
#[command(name = "reso-cli", version = env!("CARGO_PKG_VERSION"), about = "Query the local MLS via the RESO Web API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available resources
    Resources,

    /// List fields for a resource
    Fields {
        /// Resource name
        resource: String,

        /// Case-insensitive regex to filter field names
        #[arg(long = "match", value_name = "PATTERN")]
        pattern: Option<String>,
    },

    /// Search records
    ///
    /// Query options: --eq/--ne/--gt/--ge/--lt/--le FIELD=VALUE (repeatable),
    /// --filter EXPR (raw OData $filter, overrides structured filters),
    /// --select F1,F2, --expand A1,A2, --orderby "FIELD [desc]", --top N,
    /// --skip N
    Search {
        /// Resource name followed by query options
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "RESOURCE [OPTIONS]")]
        args: Vec<String>,
    },

    /// Get a single record by key
    Get {
        /// Resource name
        resource: String,

        /// Primary key of the record
        key: String,

        /// Fields to return
        #[arg(long, value_name = "FIELD1,FIELD2")]
        select: Option<String>,
    },

    /// Count matching records (same query options as search)
    Count {
        /// Resource name followed by query options
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "RESOURCE [OPTIONS]")]
        args: Vec<String>,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("Error: {:#}", error);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let client = Client::new(ClientSettings {
        endpoint: config.endpoint.clone(),
        authentication: config.authentication.clone(),
        md_file: paths::metadata_path(),
        use_replication_endpoint: config.use_replication_endpoint,
    })?;

    match cli.command {
        Commands::Resources => commands::resources::execute(&client),
        Commands::Fields { resource, pattern } => {
            commands::fields::execute(&client, &config, &resource, pattern.as_deref())
        }
        Commands::Search { args } => commands::search::execute(&client, &config, &args),
        Commands::Get {
            resource,
            key,
            select,
        } => commands::get::execute(&client, &config, &resource, &key, select.as_deref()),
        Commands::Count { args } => commands::count::execute(&client, &config, &args),
    }
}
