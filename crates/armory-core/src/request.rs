//! Extension request model
//!
//! A request names an extension and either pins an exact release tag or
//! asks for the newest published release. The `latest` placeholder only
//! exists at request time; preflight resolves it to a concrete tag before
//! anything touches the filesystem.

use std::fmt;

use crate::error::{Error, Result};

/// The version a user asked for: the newest release, or an exact tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requested {
    /// Resolve to the newest non-prerelease release during preflight
    Latest,
    /// A specific release tag
    Exact(String),
}

impl Requested {
    /// Returns the exact tag, or None for `Latest`
    pub fn exact(&self) -> Option<&str> {
        match self {
            Requested::Latest => None,
            Requested::Exact(v) => Some(v),
        }
    }
}

impl fmt::Display for Requested {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requested::Latest => write!(f, "latest"),
            Requested::Exact(v) => write!(f, "{}", v),
        }
    }
}

/// A parsed `NAME[@VERSION]` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSpec {
    pub name: String,
    pub requested: Requested,
}

impl ExtensionSpec {
    /// Parse a request string of the form `NAME` or `NAME@VERSION`
    ///
    /// A bare name requests the newest release. More than one `@` is
    /// rejected; the version part is otherwise free-form.
    pub fn parse(spec: &str) -> Result<Self> {
        let mut parts = spec.split('@');
        let name = parts.next().unwrap_or_default();

        let requested = match (parts.next(), parts.next()) {
            (None, _) => Requested::Latest,
            (Some(version), None) => {
                if version.is_empty() || version == "latest" {
                    Requested::Latest
                } else {
                    Requested::Exact(version.to_string())
                }
            }
            (Some(_), Some(_)) => return Err(Error::invalid_spec(spec)),
        };

        if name.is_empty() {
            return Err(Error::invalid_spec(spec));
        }

        Ok(Self {
            name: name.to_string(),
            requested,
        })
    }

    /// Create a spec pinned to an exact version
    pub fn exact(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requested: Requested::Exact(version.into()),
        }
    }

    /// Create a spec requesting the newest release
    pub fn latest(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requested: Requested::Latest,
        }
    }
}

impl fmt::Display for ExtensionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.requested)
    }
}

/// Parse a request document: a flat YAML mapping of name to version
///
/// Values of `latest` request the newest release. Empty values are kept
/// as-is so preflight can reject them with a missing-version error rather
/// than silently resolving them.
pub fn parse_request_document(bytes: &[u8]) -> Result<Vec<ExtensionSpec>> {
    use std::collections::BTreeMap;

    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Vec::new());
    }

    let mapping: BTreeMap<String, String> = serde_yaml_ng::from_slice(bytes)?;

    Ok(mapping
        .into_iter()
        .map(|(name, version)| {
            let requested = if version == "latest" {
                Requested::Latest
            } else {
                Requested::Exact(version)
            };
            ExtensionSpec { name, requested }
        })
        .collect())
}
