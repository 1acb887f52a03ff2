//! Extension management for Armory
//!
//! This crate handles:
//! - Catalog discovery and release listing against the hosting platform
//! - Release archive download and safe zip extraction
//! - Scanning the managed extension directory into an installed set
//! - Reconciling the installed set against a requested set
//! - The `Installer` orchestrator driving the whole pipeline

pub mod archive;
pub mod cache;
pub mod github;
pub mod installer;
pub mod prompt;
pub mod reconcile;

pub use cache::scan_installed;
pub use github::GithubCatalog;
pub use installer::Installer;
pub use prompt::{AssumeNo, AssumeYes, Prompter};
pub use reconcile::Plan;
