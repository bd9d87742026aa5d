// API client module: a small blocking HTTP client that talks to the
// package registry endpoint. The registry speaks a single request: a
// multipart POST carrying the zipped package.

use crate::error::{BjspmError, Result};
use reqwest::blocking::{multipart, Client};
use std::fs::File;
use std::path::Path;

pub const DEFAULT_API_URL: &str = "https://bjspm.croncle.com/api.php";
pub const API_URL_ENV: &str = "BJSPM_API_URL";

const ACTION_FIELD: &str = "action";
const UPLOAD_ACTION: &str = "UPLOAD_PACKAGE";
const PACKAGE_FIELD: &str = "package";

/// What the server sent back. The body is not interpreted, only shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResponse {
    pub status: u16,
    pub body: String,
}

/// Sends a finished archive somewhere. `ApiClient` is the real one; the
/// publish pipeline only depends on this trait.
pub trait PackageTransport {
    fn upload_package(&self, archive: &Path) -> Result<UploadResponse>;
}

/// Holds a reqwest blocking client and the endpoint URL.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    endpoint: String,
}

impl ApiClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, endpoint))
    }

    /// Use an already configured reqwest client.
    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        ApiClient {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Create an ApiClient configured from the environment variable
    /// `BJSPM_API_URL` or fall back to the public registry.
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.into());
        Self::new(endpoint)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl PackageTransport for ApiClient {
    /// Stream the archive as the `package` part of a multipart form, next
    /// to the fixed `action=UPLOAD_PACKAGE` field.
    fn upload_package(&self, archive: &Path) -> Result<UploadResponse> {
        let file = File::open(archive)
            .map_err(|e| BjspmError::io("Failed to open archive", archive, e))?;
        let file_name = archive
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("package.zip");

        let part = multipart::Part::reader(file)
            .file_name(file_name.to_string())
            .mime_str("application/zip")?;
        let form = multipart::Form::new()
            .text(ACTION_FIELD, UPLOAD_ACTION)
            .part(PACKAGE_FIELD, part);

        log::info!("uploading {} to {}", archive.display(), self.endpoint);
        let res = self.client.post(&self.endpoint).multipart(form).send()?;
        let status = res.status();
        if !status.is_success() {
            log::warn!("registry answered {status}");
        }
        let body = res.text()?;
        Ok(UploadResponse {
            status: status.as_u16(),
            body,
        })
    }
}
