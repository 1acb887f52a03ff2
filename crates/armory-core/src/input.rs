//! Byte-source adapters for request documents
//!
//! A request document can come from standard input (`-`), a local file
//! path, or an absolute `http://`/`https://` URL. Multiple sources
//! concatenate in the order given. Supplying no sources is not an error;
//! it simply yields no bytes.

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// Read and concatenate the named byte sources
pub async fn read_sources(sources: &[String]) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();

    for source in sources {
        let chunk = read_source(source).await?;
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

/// Read a single byte source: `-` for stdin, a URL, or a file path
pub async fn read_source(source: &str) -> Result<Vec<u8>> {
    if source == "-" {
        debug!("Reading request document from stdin");
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        return Ok(buf);
    }

    if source.starts_with("http://") || source.starts_with("https://") {
        debug!("Fetching request document from {}", source);
        let response = reqwest::get(source).await?;

        if !response.status().is_success() {
            return Err(Error::transport(format!(
                "Failed to fetch '{}': HTTP {}",
                source,
                response.status()
            )));
        }

        return Ok(response.bytes().await?.to_vec());
    }

    debug!("Reading request document from file {}", source);
    let path = Path::new(source);
    Ok(std::fs::read(path)?)
}
