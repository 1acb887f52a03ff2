//! Error types for armory-core

use thiserror::Error;

/// Result type alias using armory-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Armory
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed extension spec string
    #[error("Invalid extension spec '{spec}': expected NAME or NAME@VERSION")]
    InvalidSpec { spec: String },

    /// Empty version for a requested extension
    #[error("Missing version for extension: {name}")]
    MissingVersion { name: String },

    /// Extension or version not present in the remote catalog
    #[error("Unknown extension: {name}@{version}")]
    UnknownExtension { name: String, version: String },

    /// No non-prerelease releases published for an extension
    #[error("No releases found for extension: {name}")]
    NoReleases { name: String },

    /// Extension directory does not exist
    #[error("Extension directory does not exist: {path}")]
    MissingDirectory { path: String },

    /// HTTP or network failure, including non-success status codes
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Response body matched neither the expected shape nor the error envelope
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    /// The platform returned its error envelope
    #[error("Remote error: {message} (see {documentation_url})")]
    Remote {
        message: String,
        documentation_url: String,
    },

    /// Archive entry resolved outside the destination directory
    #[error("Archive entry escapes destination directory: {entry}")]
    PathTraversal { entry: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid spec error
    pub fn invalid_spec(spec: impl Into<String>) -> Self {
        Self::InvalidSpec { spec: spec.into() }
    }

    /// Create a missing version error
    pub fn missing_version(name: impl Into<String>) -> Self {
        Self::MissingVersion { name: name.into() }
    }

    /// Create an unknown extension error
    pub fn unknown_extension(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::UnknownExtension {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Create a no releases error
    pub fn no_releases(name: impl Into<String>) -> Self {
        Self::NoReleases { name: name.into() }
    }

    /// Create a missing directory error
    pub fn missing_directory(path: impl Into<String>) -> Self {
        Self::MissingDirectory { path: path.into() }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a remote error from the platform's error envelope
    pub fn remote(message: impl Into<String>, documentation_url: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
            documentation_url: documentation_url.into(),
        }
    }

    /// Create a path traversal error
    pub fn path_traversal(entry: impl Into<String>) -> Self {
        Self::PathTraversal {
            entry: entry.into(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }
}
