//! Extension install command

use anyhow::{Context, Result};

use armory_core::input::read_sources;
use armory_extensions::{AssumeYes, Installer, Prompter};

use crate::cli::InstallArgs;
use crate::output;
use crate::prompt::TerminalPrompter;

pub async fn run(args: InstallArgs) -> Result<()> {
    let catalog = args.catalog.catalog();

    let mut installer = Installer::new(catalog)
        .with_request(&args.extensions)
        .interactive(args.interactive)
        .assume_yes(args.yes)
        .upgrade(args.upgrade)
        .prune(args.prune);

    if let Some(dir) = args.dir {
        installer = installer.with_extension_dir(dir);
    }

    if !args.from.is_empty() {
        let bytes = read_sources(&args.from)
            .await
            .context("Failed to read request document")?;
        installer = installer.with_request_document(&bytes);
    }

    installer
        .preflight()
        .await
        .context("Preflight validation failed")?;

    // Interactive runs own the terminal; everything else gets a spinner
    // around the download/extract phase.
    let result = if args.interactive {
        installer.run(&TerminalPrompter).await
    } else {
        let prompter: &dyn Prompter = if args.yes {
            &AssumeYes
        } else {
            &TerminalPrompter
        };
        let spinner = (args.yes).then(|| output::spinner("Installing extensions..."));
        let result = installer.run(prompter).await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        result
    };

    match result {
        Ok(()) => {
            output::success(&format!(
                "Extension directory {} is up to date",
                installer.extension_dir().display()
            ));
            Ok(())
        }
        Err(e) => {
            output::error(&format!("Installation failed: {}", e));
            Err(e.into())
        }
    }
}
