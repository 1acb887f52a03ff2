//! GitHub catalog client
//!
//! Read-only access to the remote extension catalog:
//! - Enumerating an organization's public repositories that follow the
//!   extension naming convention (`*-orchestrator`, `*-pam`)
//! - Listing non-prerelease release tags for an extension
//! - Downloading the conventional release archive
//!   `{host}/{org}/{name}/releases/download/{version}/{name}_{version}.zip`
//!
//! One reqwest client is constructed up front and reused for every
//! request; the bearer credential is held immutably after construction.
//! Base URLs are injectable so tests can point the catalog at a mock
//! server.

use serde::Deserialize;
use tracing::{debug, warn};

use armory_core::{Error, Result};

/// Default API endpoint for the hosting platform
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default download host for release assets
pub const DEFAULT_HOST_URL: &str = "https://github.com";

/// Repositories fetched per catalog page
pub const REPOS_PER_PAGE: usize = 100;

/// Hard upper bound on catalog pagination
///
/// Guards against runaway loops if the remote API keeps returning
/// non-empty pages. At 100 repositories per page this covers 10,000
/// repositories, far beyond any real extension catalog.
pub const MAX_REPO_PAGES: usize = 100;

/// Repository name suffixes that mark a repository as an extension
const EXTENSION_SUFFIXES: &[&str] = &["-orchestrator", "-pam"];

/// Minimal projection of a platform repository
#[derive(Debug, Clone, Deserialize)]
struct Repository {
    name: String,
}

/// Minimal projection of a platform release
#[derive(Debug, Clone, Deserialize)]
struct ReleaseRecord {
    tag_name: String,
    prerelease: bool,
}

/// The platform's error envelope
#[derive(Debug, Clone, Deserialize)]
struct ErrorEnvelope {
    message: String,
    documentation_url: String,
}

/// Read-only client for the remote extension catalog
#[derive(Debug, Clone)]
pub struct GithubCatalog {
    /// Shared HTTP client
    client: reqwest::Client,

    /// API endpoint (overridable for tests)
    api_url: String,

    /// Release asset download host (overridable for tests)
    host_url: String,

    /// Organization that publishes the extensions
    org: String,

    /// Optional bearer credential attached to every request
    token: Option<String>,
}

impl GithubCatalog {
    /// Create a catalog client for an organization
    pub fn new(org: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: DEFAULT_API_URL.to_string(),
            host_url: DEFAULT_HOST_URL.to_string(),
            org: org.into(),
            token: None,
        }
    }

    /// Attach a bearer credential
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    /// Override the API endpoint
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Override the release download host
    pub fn with_host_url(mut self, host_url: impl Into<String>) -> Self {
        self.host_url = host_url.into();
        self
    }

    /// The organization this catalog reads from
    pub fn org(&self) -> &str {
        &self.org
    }

    /// Enumerate extension names published by the organization
    ///
    /// Pages through the organization's public repositories until an
    /// empty page (bounded by [`MAX_REPO_PAGES`]) and keeps names ending
    /// in one of the extension suffixes, in the platform's order.
    pub async fn list_extension_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for page in 1..=MAX_REPO_PAGES {
            let url = format!(
                "{}/orgs/{}/repos?type=public&page={}&per_page={}",
                self.api_url, self.org, page, REPOS_PER_PAGE
            );

            let repos: Vec<Repository> = self.get_json(&url).await?;
            if repos.is_empty() {
                break;
            }

            debug!("Catalog page {} returned {} repositories", page, repos.len());

            names.extend(
                repos
                    .into_iter()
                    .map(|r| r.name)
                    .filter(|name| is_extension_name(name)),
            );

            if page == MAX_REPO_PAGES {
                warn!(
                    "Stopped catalog pagination at the {}-page bound",
                    MAX_REPO_PAGES
                );
            }
        }

        Ok(names)
    }

    /// List non-prerelease release tags for an extension
    ///
    /// Tags come back in the platform's release order, which in practice
    /// is newest first; no additional sorting is applied. An empty list
    /// is a valid result.
    pub async fn list_versions(&self, name: &str) -> Result<Vec<String>> {
        let url = format!("{}/repos/{}/{}/releases", self.api_url, self.org, name);
        let releases: Vec<ReleaseRecord> = self.get_json(&url).await?;

        Ok(releases
            .into_iter()
            .filter(|r| !r.prerelease)
            .map(|r| r.tag_name)
            .collect())
    }

    /// The newest release tag for an extension
    pub async fn first_version(&self, name: &str) -> Result<String> {
        self.list_versions(name)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::no_releases(name))
    }

    /// Whether a specific release tag exists for an extension
    ///
    /// A repository the platform does not know (a 404 envelope) reports
    /// false, the same as a missing tag.
    pub async fn version_exists(&self, name: &str, version: &str) -> Result<bool> {
        let url = format!("{}/repos/{}/{}/releases", self.api_url, self.org, name);
        let Some(releases) = self.get_json_opt::<Vec<ReleaseRecord>>(&url).await? else {
            return Ok(false);
        };

        Ok(releases
            .iter()
            .any(|r| !r.prerelease && r.tag_name == version))
    }

    /// The conventional download URL for a release archive
    pub fn download_url(&self, name: &str, version: &str) -> String {
        format!(
            "{}/{}/{}/releases/download/{}/{}_{}.zip",
            self.host_url, self.org, name, version, name, version
        )
    }

    /// Download the release archive for an extension version
    pub async fn download(&self, name: &str, version: &str) -> Result<Vec<u8>> {
        let url = self.download_url(name, version);
        debug!("Downloading release archive from {}", url);

        let response = self.request(&url).send().await?;

        if !response.status().is_success() {
            return Err(Error::transport(format!(
                "Failed to download '{}': HTTP {}",
                url,
                response.status()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Build a GET request with the bearer credential attached
    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .get(url)
            .header("User-Agent", concat!("armory/", env!("CARGO_PKG_VERSION")));

        if let Some(ref token) = self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        request
    }

    /// Fetch a URL and decode the expected JSON shape
    ///
    /// Non-success statuses surface as remote errors when the platform's
    /// error envelope decodes, transport errors otherwise. A success
    /// body that matches neither the expected shape nor the envelope is
    /// a decode error.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.request(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        decode_json(url, status, &body)
    }

    /// Like `get_json`, but a 404 carrying the error envelope becomes
    /// `None` instead of an error
    async fn get_json_opt<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        let response = self.request(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status == reqwest::StatusCode::NOT_FOUND
            && serde_json::from_slice::<ErrorEnvelope>(&body).is_ok()
        {
            return Ok(None);
        }

        decode_json(url, status, &body).map(Some)
    }
}

fn decode_json<T: serde::de::DeserializeOwned>(
    url: &str,
    status: reqwest::StatusCode,
    body: &[u8],
) -> Result<T> {
    if !status.is_success() {
        if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(body) {
            return Err(Error::remote(envelope.message, envelope.documentation_url));
        }
        return Err(Error::transport(format!(
            "Request to '{}' failed: HTTP {}",
            url, status
        )));
    }

    match serde_json::from_slice::<T>(body) {
        Ok(value) => Ok(value),
        Err(decode_err) => {
            if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(body) {
                return Err(Error::remote(envelope.message, envelope.documentation_url));
            }
            Err(Error::decode(format!(
                "Unexpected response from '{}': {}",
                url, decode_err
            )))
        }
    }
}

/// Whether a repository name follows the extension naming convention
pub fn is_extension_name(name: &str) -> bool {
    EXTENSION_SUFFIXES
        .iter()
        .any(|suffix| name.ends_with(suffix))
}
