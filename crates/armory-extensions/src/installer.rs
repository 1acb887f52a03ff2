//! Installer orchestrator
//!
//! The public facade over the pipeline. An `Installer` is configured
//! with chained builder calls, validated by `preflight()`, and driven to
//! convergence by `run()`:
//!
//! 1. Preflight parses and resolves every request (`latest` becomes a
//!    concrete tag, exact tags are checked against the catalog) and
//!    verifies the extension directory exists.
//! 2. Run optionally merges interactive selections, asks for
//!    confirmation, rescans the directory, plans, and applies removals
//!    before installations.
//!
//! Failures after preflight abort the run with the first error; nothing
//! is rolled back, and the next invocation reconciles from whatever
//! state remains on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use armory_core::{Error, ExtensionSpec, Requested, Result};

use crate::archive::extract_zip;
use crate::cache::scan_installed;
use crate::github::GithubCatalog;
use crate::prompt::Prompter;
use crate::reconcile;

/// Directory used when the caller does not name one
pub const DEFAULT_EXTENSION_DIR: &str = "./extensions";

/// Orchestrates catalog resolution, download, extraction, and pruning
pub struct Installer {
    /// Catalog client, credential already attached
    catalog: GithubCatalog,

    /// Accumulated requests, one version per name
    requested: BTreeMap<String, Requested>,

    /// Managed extension directory
    extension_dir: PathBuf,

    /// Offer a catalog multi-select before confirming
    interactive: bool,

    /// Skip the confirmation prompt
    assume_yes: bool,

    /// Refresh requests from installed extensions at their newest versions
    upgrade: bool,

    /// Remove installed extensions that are not requested
    prune: bool,

    /// Setup errors collected during configuration, drained by preflight
    setup_errors: Vec<Error>,

    /// Concrete name -> version mapping produced by preflight
    resolved: BTreeMap<String, String>,

    /// Whether preflight has completed successfully
    preflighted: bool,
}

impl Installer {
    /// Create an installer over a catalog
    pub fn new(catalog: GithubCatalog) -> Self {
        Self {
            catalog,
            requested: BTreeMap::new(),
            extension_dir: PathBuf::new(),
            interactive: false,
            assume_yes: false,
            upgrade: false,
            prune: false,
            setup_errors: Vec::new(),
            resolved: BTreeMap::new(),
            preflighted: false,
        }
    }

    /// Add requests given as `NAME[@VERSION]` strings
    ///
    /// Malformed entries are collected and surfaced by `preflight()`;
    /// a later entry for the same name overrides an earlier one.
    pub fn with_request<S: AsRef<str>>(mut self, specs: &[S]) -> Self {
        for spec in specs {
            match ExtensionSpec::parse(spec.as_ref()) {
                Ok(spec) => {
                    self.requested.insert(spec.name, spec.requested);
                }
                Err(e) => self.setup_errors.push(e),
            }
        }
        self
    }

    /// Add requests from a flat name -> version document
    pub fn with_request_document(mut self, bytes: &[u8]) -> Self {
        match armory_core::parse_request_document(bytes) {
            Ok(specs) => {
                for spec in specs {
                    self.requested.insert(spec.name, spec.requested);
                }
            }
            Err(e) => self.setup_errors.push(e),
        }
        self
    }

    /// Set the managed extension directory
    pub fn with_extension_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.extension_dir = dir.into();
        self
    }

    /// Offer a catalog multi-select before confirming
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Skip the confirmation prompt
    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    /// Refresh requests from installed extensions at their newest versions
    pub fn upgrade(mut self, upgrade: bool) -> Self {
        self.upgrade = upgrade;
        self
    }

    /// Remove installed extensions that are not requested
    pub fn prune(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    /// The resolved name -> version mapping (meaningful after preflight)
    pub fn requested_versions(&self) -> &BTreeMap<String, String> {
        &self.resolved
    }

    /// The managed extension directory (defaulted by preflight)
    pub fn extension_dir(&self) -> &Path {
        &self.extension_dir
    }

    /// Validate the request set and the extension directory
    ///
    /// Resolves every `latest` request to a concrete tag and verifies
    /// exact tags against the catalog. After a successful preflight no
    /// placeholder version remains.
    pub async fn preflight(&mut self) -> Result<()> {
        // Setup errors are reported in full, then the first one fails
        // the run.
        if !self.setup_errors.is_empty() {
            for err in &self.setup_errors {
                error!("{}", err);
            }
            let first = self.setup_errors.remove(0);
            self.setup_errors.clear();
            return Err(first);
        }

        for (name, requested) in &self.requested {
            let version = match requested {
                Requested::Exact(v) if v.is_empty() => {
                    return Err(Error::missing_version(name));
                }
                Requested::Latest => {
                    let newest = self.catalog.first_version(name).await?;
                    debug!("Resolved {}@latest to {}", name, newest);
                    newest
                }
                Requested::Exact(v) => {
                    if !self.catalog.version_exists(name, v).await? {
                        return Err(Error::unknown_extension(name, v));
                    }
                    v.clone()
                }
            };

            self.resolved.insert(name.clone(), version);
        }

        if self.extension_dir.as_os_str().is_empty() {
            self.extension_dir = PathBuf::from(DEFAULT_EXTENSION_DIR);
        }
        if !self.extension_dir.is_dir() {
            return Err(Error::missing_directory(
                self.extension_dir.display().to_string(),
            ));
        }

        self.preflighted = true;
        Ok(())
    }

    /// Converge the extension directory on the requested set
    ///
    /// Runs preflight first if the caller has not. Returns cleanly
    /// without touching the filesystem when the user declines the
    /// confirmation prompt.
    pub async fn run(&mut self, prompter: &dyn Prompter) -> Result<()> {
        if !self.preflighted {
            self.preflight().await?;
        }

        // 1. Interactive selection over the alphabetized catalog;
        //    selections never override explicit requests.
        if self.interactive {
            let mut names = self.catalog.list_extension_names().await?;
            names.sort();

            let picks = prompter.multi_select("Select extensions to install", &names)?;
            for name in picks {
                if !self.resolved.contains_key(&name) {
                    let newest = self.catalog.first_version(&name).await?;
                    self.resolved.insert(name, newest);
                }
            }
        }

        // Nothing requested and no flag that could mutate the directory;
        // asking for confirmation here would be noise.
        if self.resolved.is_empty() && !self.upgrade && !self.prune {
            info!("Nothing to install");
            return Ok(());
        }

        // 2. Confirmation summary; declining is a clean exit.
        if !self.assume_yes {
            let summary = self
                .resolved
                .iter()
                .map(|(n, v)| format!("  {}@{}", n, v))
                .collect::<Vec<_>>()
                .join("\n");
            let message = format!(
                "Install {} extension(s) into {}?",
                self.resolved.len(),
                self.extension_dir.display()
            );

            if !prompter.confirm(&message, &summary)? {
                info!("Installation cancelled");
                return Ok(());
            }
        }

        // 3. Rebuild the installed set from the directory.
        let installed = scan_installed(&self.extension_dir)?;

        // 4. Upgrade refreshes requests from installed names, never
        //    overriding an explicit request.
        if self.upgrade {
            for name in installed.keys() {
                if !self.resolved.contains_key(name) {
                    let newest = self.catalog.first_version(name).await?;
                    debug!("Upgrade: refreshing {} to {}", name, newest);
                    self.resolved.insert(name.clone(), newest);
                }
            }
        }

        let plan = reconcile::plan(&self.resolved, &installed, self.prune);
        if plan.is_empty() {
            info!("Extension directory is already up to date");
            return Ok(());
        }

        // 5. Removals strictly precede installations.
        for (name, version) in &plan.removals {
            let dir = self.extension_dir.join(format!("{}_{}", name, version));
            info!("Removing {} {}", name, version);
            std::fs::remove_dir_all(&dir)?;
        }

        // 6. Download, extract, discard the transient archive.
        for (name, version) in &plan.installs {
            self.install_one(name, version).await?;
        }

        info!(
            "Installed {} extension(s), removed {}",
            plan.installs.len(),
            plan.removals.len()
        );
        Ok(())
    }

    /// Download and extract a single extension version
    async fn install_one(&self, name: &str, version: &str) -> Result<()> {
        info!("Installing {} {}", name, version);

        let bytes = self.catalog.download(name, version).await?;

        let zip_path = self
            .extension_dir
            .join(format!("{}_{}.zip", name, version));
        std::fs::write(&zip_path, &bytes)?;
        set_mode(&zip_path, 0o644)?;

        let dest = self.extension_dir.join(format!("{}_{}", name, version));
        std::fs::create_dir_all(&dest)?;
        set_mode(&dest, 0o755)?;

        if let Err(e) = extract_zip(&zip_path, &dest) {
            // A partially extracted directory is unusable; clear it so a
            // rescan does not mistake it for an installation.
            let _ = std::fs::remove_dir_all(&dest);
            let _ = std::fs::remove_file(&zip_path);
            return Err(e);
        }

        std::fs::remove_file(&zip_path)?;
        debug!("Extracted {} {} to {}", name, version, dest.display());
        Ok(())
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
