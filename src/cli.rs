// src/cli.rs
//! CLI definitions for the sideload package manager
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sideload")]
#[command(author = "Sideload Project")]
#[command(version)]
#[command(about = "MSIX/APPX package sideloading manager", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a package file and show its descriptor
    Validate {
        /// Path to the package file (.appx, .appxbundle, .msix, .msixbundle)
        package: PathBuf,
    },

    /// Install a package file
    Install {
        /// Path to the package file
        package: PathBuf,

        /// Deploy machine-wide instead of for the current user
        #[arg(long)]
        machine: bool,

        /// Append the operation outcome to a log file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Remove an installed package
    Remove {
        /// Package family name, or the package's internal name
        package: String,

        /// Skip the critical-app confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Append the operation outcome to a log file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// List installed packages
    List {
        /// Include framework packages
        #[arg(long)]
        frameworks: bool,

        /// Include critical system apps
        #[arg(long)]
        critical: bool,

        /// Publisher filter: all, microsoft, third-party
        #[arg(long, default_value = "all")]
        publisher: String,

        /// Sort key: display-name, name-desc, date-newest, date-oldest,
        /// publisher, version-desc
        #[arg(long, default_value = "display-name")]
        sort: String,

        /// Enumerate machine-wide packages
        #[arg(long)]
        machine: bool,
    },

    /// Search installed packages by substring
    Search {
        /// Case-insensitive search term
        term: String,

        /// Include framework packages
        #[arg(long)]
        frameworks: bool,

        /// Include critical system apps
        #[arg(long)]
        critical: bool,

        /// Publisher filter: all, microsoft, third-party
        #[arg(long, default_value = "all")]
        publisher: String,

        /// Enumerate machine-wide packages
        #[arg(long)]
        machine: bool,
    },

    /// Show details for one installed package
    Info {
        /// Package family name
        family_name: String,
    },

    /// Export the package inventory as CSV
    Export {
        /// Output file path
        path: PathBuf,

        /// Include the InstallLocation column
        #[arg(long)]
        locations: bool,

        /// Include framework packages
        #[arg(long)]
        frameworks: bool,

        /// Include critical system apps
        #[arg(long)]
        critical: bool,
    },

    /// Show the host sideloading policy
    Policy,

    /// Generate shell completion scripts
    Completions {
        /// Shell type
        shell: Shell,
    },
}
