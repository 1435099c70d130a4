//! Mediq CLI — command-line interface for the diagnostic pipeline.
//!
//! Reuses the same core domain logic (mediq-core) and server bootstrap
//! (mediq-server) that power the HTTP API.

mod commands;

use clap::{Parser, Subcommand};

/// Mediq CLI — LLM-backed medical symptom analysis
#[derive(Parser)]
#[command(name = "mediq", version, about = "Mediq CLI — LLM-backed medical symptom analysis")]
pub struct Cli {
    /// Directory holding roles.yaml / tasks.yaml prompt definitions
    #[arg(long, env = "MEDIQ_CATALOG_DIR", global = true)]
    catalog_dir: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze patient symptoms through the full diagnostic pipeline
    Analyze {
        /// Symptom description (reads stdin when neither TEXT nor --file is given)
        text: Option<String>,

        /// Read the symptom description from a file
        #[arg(long, conflicts_with = "text")]
        file: Option<String>,

        /// Abandon the analysis after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Print the full result envelope as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the Mediq HTTP backend server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },

    /// Inspect the role/task prompt catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List the roles and tasks the pipeline is built from
    List,
    /// Verify the catalog parses and a pipeline can be built from it
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mediq_core=warn,mediq_server=warn,mediq_cli=info".into()),
        )
        .init();

    let result = if let Some(command) = cli.command {
        match command {
            Commands::Analyze {
                text,
                file,
                timeout_secs,
                json,
            } => {
                commands::analyze::run(
                    cli.catalog_dir.as_deref(),
                    text,
                    file.as_deref(),
                    timeout_secs,
                    json,
                )
                .await
            }

            Commands::Serve { host, port } => {
                commands::serve::run(host, port, cli.catalog_dir.as_deref()).await
            }

            Commands::Catalog { action } => match action {
                CatalogAction::List => commands::catalog::list(cli.catalog_dir.as_deref()).await,
                CatalogAction::Check => commands::catalog::check(cli.catalog_dir.as_deref()).await,
            },
        }
    } else {
        // No subcommand — show help
        use clap::CommandFactory;
        Cli::command().print_help().ok();
        println!();
        Ok(())
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_analyze_with_flags() {
        let cli = Cli::try_parse_from([
            "mediq",
            "analyze",
            "persistent cough for three weeks",
            "--timeout-secs",
            "120",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Analyze {
                text,
                file,
                timeout_secs,
                json,
            }) => {
                assert_eq!(text.as_deref(), Some("persistent cough for three weeks"));
                assert!(file.is_none());
                assert_eq!(timeout_secs, Some(120));
                assert!(json);
            }
            _ => panic!("expected analyze subcommand"),
        }
    }

    #[test]
    fn test_cli_rejects_text_and_file_together() {
        let result = Cli::try_parse_from([
            "mediq",
            "analyze",
            "chest pain",
            "--file",
            "symptoms.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parses_global_catalog_dir() {
        let cli = Cli::try_parse_from([
            "mediq",
            "catalog",
            "list",
            "--catalog-dir",
            "/etc/mediq/catalog",
        ])
        .unwrap();
        assert_eq!(cli.catalog_dir.as_deref(), Some("/etc/mediq/catalog"));
    }

    #[test]
    fn test_cli_serve_defaults() {
        let cli = Cli::try_parse_from(["mediq", "serve"]).unwrap();
        match cli.command {
            Some(Commands::Serve { host, port }) => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 8000);
            }
            _ => panic!("expected serve subcommand"),
        }
    }
}
