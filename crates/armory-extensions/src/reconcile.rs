//! Reconciliation planning
//!
//! Computes the filesystem mutations that converge the installed set on
//! the requested set. Planning is pure; the `Installer` applies the plan.
//! Removals always precede installations so an upgrade frees its old
//! directory before the new version is extracted.

use std::collections::BTreeMap;

/// A planned change set: removals first, then installations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// (name, installed version) directories to delete
    pub removals: Vec<(String, String)>,

    /// (name, requested version) extensions to download and extract
    pub installs: Vec<(String, String)>,
}

impl Plan {
    /// Whether the plan changes anything
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.installs.is_empty()
    }
}

/// Plan the changes that converge `installed` on `requested`
///
/// An installed extension is removed when its version differs from the
/// requested one (upgrades always clear the old directory), or when it
/// is not requested at all and `prune` is set. An extension is installed
/// when it is requested and either absent or present at another version.
pub fn plan(
    requested: &BTreeMap<String, String>,
    installed: &BTreeMap<String, String>,
    prune: bool,
) -> Plan {
    let mut plan = Plan::default();

    for (name, installed_version) in installed {
        match requested.get(name) {
            Some(requested_version) if requested_version != installed_version => {
                plan.removals
                    .push((name.clone(), installed_version.clone()));
            }
            Some(_) => {}
            None if prune => {
                plan.removals
                    .push((name.clone(), installed_version.clone()));
            }
            None => {}
        }
    }

    for (name, requested_version) in requested {
        if installed.get(name) != Some(requested_version) {
            plan.installs.push((name.clone(), requested_version.clone()));
        }
    }

    plan
}
