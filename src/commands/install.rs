// src/commands/install.rs
//! Package installation command

use super::{report_result, services};
use crate::package::descriptor::PackageScope;
use crate::progress::{CallbackProgress, ProgressEvent};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Validate and install a package file, with a progress bar.
pub async fn cmd_install(package: &Path, machine: bool, log_file: Option<&Path>) -> Result<()> {
    info!("Installing package: {}", package.display());

    let scope = if machine {
        PackageScope::Machine
    } else {
        PackageScope::User
    };
    let services = services(scope);

    if machine {
        println!("Machine-wide deployment requires an elevated session.");
    }
    if !services.orchestrator.is_sideloading_enabled().await {
        warn!("sideloading appears to be disabled on this host; unsigned packages will be rejected by the OS");
    }

    let bar = Arc::new(ProgressBar::new(100));
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}%  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    let tracker = CallbackProgress::new({
        let bar = bar.clone();
        move |event| match event {
            ProgressEvent::Message(message) => bar.set_message(message),
            ProgressEvent::Percent(percent) => bar.set_position(percent as u64),
            ProgressEvent::Finished(message) => bar.finish_with_message(message),
            ProgressEvent::Error(message) => bar.abandon_with_message(message),
        }
    });

    let result = services
        .orchestrator
        .install_file(package, Some(&tracker))
        .await;

    report_result(&result, services.orchestrator.errors(), log_file)
}
