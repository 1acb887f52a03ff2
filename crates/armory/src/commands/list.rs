//! Catalog listing command

use anyhow::{Context, Result};

use crate::cli::ListArgs;
use crate::output;

pub async fn run(args: ListArgs) -> Result<()> {
    let catalog = args.catalog.catalog();

    let spinner = output::spinner("Querying catalog...");
    let mut names = catalog
        .list_extension_names()
        .await
        .context("Failed to list extensions")?;
    names.sort();
    spinner.finish_and_clear();

    if names.is_empty() {
        output::warning(&format!(
            "No extensions found in organization '{}'",
            args.catalog.org
        ));
        return Ok(());
    }

    for name in &names {
        if args.versions {
            let versions = catalog
                .list_versions(name)
                .await
                .with_context(|| format!("Failed to list versions for '{}'", name))?;

            if versions.is_empty() {
                println!("{}  (no releases)", name);
            } else {
                println!("{}  {}", name, versions.join(", "));
            }
        } else {
            println!("{}", name);
        }
    }

    output::info(&format!("{} extension(s) available", names.len()));
    Ok(())
}
