// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: publisher filter
fn publisher_arg() -> Arg {
    Arg::new("publisher")
        .long("publisher")
        .default_value("all")
        .help("Publisher filter: all, microsoft, third-party")
}

/// Common argument: include framework packages
fn frameworks_arg() -> Arg {
    Arg::new("frameworks")
        .long("frameworks")
        .action(clap::ArgAction::SetTrue)
        .help("Include framework packages")
}

/// Common argument: include critical system apps
fn critical_arg() -> Arg {
    Arg::new("critical")
        .long("critical")
        .action(clap::ArgAction::SetTrue)
        .help("Include critical system apps")
}

fn build_cli() -> Command {
    Command::new("sideload")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Sideload Project")
        .about("MSIX/APPX package sideloading manager")
        .subcommand_required(true)
        .subcommand(
            Command::new("validate")
                .about("Validate a package file and show its descriptor")
                .arg(Arg::new("package").required(true).help("Path to the package file")),
        )
        .subcommand(
            Command::new("install")
                .about("Install a package file")
                .arg(Arg::new("package").required(true).help("Path to the package file"))
                .arg(
                    Arg::new("machine")
                        .long("machine")
                        .action(clap::ArgAction::SetTrue)
                        .help("Deploy machine-wide instead of for the current user"),
                )
                .arg(
                    Arg::new("log_file")
                        .long("log-file")
                        .help("Append the operation outcome to a log file"),
                ),
        )
        .subcommand(
            Command::new("remove")
                .about("Remove an installed package")
                .arg(
                    Arg::new("package")
                        .required(true)
                        .help("Package family name or internal name"),
                )
                .arg(
                    Arg::new("yes")
                        .short('y')
                        .long("yes")
                        .action(clap::ArgAction::SetTrue)
                        .help("Skip the critical-app confirmation prompt"),
                )
                .arg(
                    Arg::new("log_file")
                        .long("log-file")
                        .help("Append the operation outcome to a log file"),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("List installed packages")
                .arg(frameworks_arg())
                .arg(critical_arg())
                .arg(publisher_arg())
                .arg(
                    Arg::new("sort")
                        .long("sort")
                        .default_value("display-name")
                        .help("Sort key"),
                ),
        )
        .subcommand(
            Command::new("search")
                .about("Search installed packages by substring")
                .arg(Arg::new("term").required(true).help("Search term"))
                .arg(frameworks_arg())
                .arg(critical_arg())
                .arg(publisher_arg()),
        )
        .subcommand(
            Command::new("info")
                .about("Show details for one installed package")
                .arg(Arg::new("family_name").required(true).help("Package family name")),
        )
        .subcommand(
            Command::new("export")
                .about("Export the package inventory as CSV")
                .arg(Arg::new("path").required(true).help("Output file path"))
                .arg(
                    Arg::new("locations")
                        .long("locations")
                        .action(clap::ArgAction::SetTrue)
                        .help("Include the InstallLocation column"),
                )
                .arg(frameworks_arg())
                .arg(critical_arg()),
        )
        .subcommand(Command::new("policy").about("Show the host sideloading policy"))
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("sideload.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
