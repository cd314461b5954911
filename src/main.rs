// src/main.rs

use anyhow::Result;
use clap::{CommandFactory, Parser};
use sideload::cli::{Cli, Commands};
use sideload::commands;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { package } => commands::validate::cmd_validate(&package),
        Commands::Install {
            package,
            machine,
            log_file,
        } => commands::install::cmd_install(&package, machine, log_file.as_deref()).await,
        Commands::Remove {
            package,
            yes,
            log_file,
        } => commands::remove::cmd_remove(&package, yes, log_file.as_deref()).await,
        Commands::List {
            frameworks,
            critical,
            publisher,
            sort,
            machine,
        } => commands::list::cmd_list(frameworks, critical, &publisher, &sort, machine).await,
        Commands::Search {
            term,
            frameworks,
            critical,
            publisher,
            machine,
        } => commands::list::cmd_search(&term, frameworks, critical, &publisher, machine).await,
        Commands::Info { family_name } => commands::info::cmd_info(&family_name).await,
        Commands::Export {
            path,
            locations,
            frameworks,
            critical,
        } => commands::export::cmd_export(&path, locations, frameworks, critical).await,
        Commands::Policy => commands::policy::cmd_policy().await,
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "sideload",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}
