//! The remote content-type catalog.
//!
//! The compiler consumes a single operation of the catalog protocol: GET
//! `<base>/<machine-name>` returning the latest library package for that
//! machine name. Tests substitute an in-process [`Catalog`] implementation,
//! so nothing above this seam knows about HTTP.

use std::time::Duration;

use log::info;

use crate::error::{Error, Result};

/// Default endpoint, overridable via `H5FORGE_CATALOG_URL` or the CLI.
pub const DEFAULT_CATALOG_URL: &str = "https://api.h5p.org/v1/content-types";

/// A source of library packages.
pub trait Catalog: Send + Sync {
    /// Download the package for a machine name.
    fn download(&self, machine_name: &str) -> Result<Vec<u8>>;
}

/// HTTP catalog client.
pub struct HttpCatalog {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("default TLS backend available");
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Endpoint from `H5FORGE_CATALOG_URL`, falling back to the default.
    pub fn from_env() -> Self {
        match std::env::var("H5FORGE_CATALOG_URL") {
            Ok(url) if !url.is_empty() => Self::new(url),
            _ => Self::new(DEFAULT_CATALOG_URL),
        }
    }
}

impl Catalog for HttpCatalog {
    fn download(&self, machine_name: &str) -> Result<Vec<u8>> {
        let url = format!("{}/{machine_name}", self.base_url);
        info!("downloading library {machine_name} from {url}");
        let response = self
            .client
            .get(&url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|e| Error::CatalogUnavailable(Box::new(e)))?;
        let bytes = response
            .bytes()
            .map_err(|e| Error::CatalogUnavailable(Box::new(e)))?;
        Ok(bytes.to_vec())
    }
}
