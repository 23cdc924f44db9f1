//! Anchor-data retrieval: the fetch collaborator seam and response validation.

use std::path::PathBuf;

use crate::error::Error;
use crate::types::RawSnapshot;

/// Content types the anchor data may be served as.
pub const ACCEPTED_CONTENT_TYPES: &[&str] = &["application/json", "application/vnd.csswg.shepherd.v1+json"];

/// Endpoint listing every specification.
pub const SPECIFICATIONS_ENDPOINT: &str = "specifications";

/// Query parameters asking for both snapshot and draft anchors.
pub const SPECIFICATIONS_PARAMS: &[(&str, &str)] = &[("anchors", "true"), ("draft", "true")];

/// A source of anchor data. Implementations do one attempt; there are no retries.
pub trait Fetch {
    /// Perform one request.
    ///
    /// # Errors
    ///
    /// Returns `Error::Fetch` (or `Error::Io`) on transport failure.
    fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Response, Error>;
}

/// What the fetch collaborator hands back.
#[derive(Debug, Clone)]
pub struct Response {
    /// Declared content type.
    pub content_type: String,
    /// Decoded body.
    pub data: serde_json::Value,
    /// HTTP status.
    pub status: u16,
}

/// Serves a previously downloaded snapshot from disk as a `200 application/json` response.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    /// Snapshot file to read.
    path: PathBuf,
}

impl FileFetcher {
    /// Serve the JSON document at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        return Self { path: path.into() };
    }
}

impl Fetch for FileFetcher {
    fn fetch(&self, endpoint: &str, _params: &[(&str, &str)]) -> Result<Response, Error> {
        tracing::debug!(endpoint, path = %self.path.display(), "reading anchor data from file");
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            return Error::Fetch {
                reason: format!("{}: {e}", self.path.display()),
            };
        })?;
        let data = serde_json::from_str(&content).map_err(|e| {
            return Error::Fetch {
                reason: format!("{}: {e}", self.path.display()),
            };
        })?;
        return Ok(Response {
            content_type: "application/json".to_string(),
            data,
            status: 200,
        });
    }
}

/// Fetch the full specification list with anchors and validate the response.
///
/// # Errors
///
/// Returns `Error::ApiRejected` for a 406 or any non-2xx status,
/// `Error::UnsupportedContentType` for an unknown content type, and
/// `Error::Fetch` if the fetch fails or the payload is not a spec map.
pub fn fetch_anchor_data(fetcher: &dyn Fetch) -> Result<RawSnapshot, Error> {
    tracing::info!("downloading anchor data");
    let response = fetcher.fetch(SPECIFICATIONS_ENDPOINT, SPECIFICATIONS_PARAMS)?;
    return decode_response(response);
}

/// Validate status and content type, then decode the spec map.
///
/// # Errors
///
/// See [`fetch_anchor_data`].
pub fn decode_response(response: Response) -> Result<RawSnapshot, Error> {
    if response.status == 406 || !(200..300).contains(&response.status) {
        return Err(Error::ApiRejected { status: response.status });
    }

    let base_type = response.content_type.split(';').next().unwrap_or("").trim();
    if !ACCEPTED_CONTENT_TYPES.contains(&base_type) {
        return Err(Error::UnsupportedContentType {
            content_type: response.content_type,
        });
    }

    return serde_json::from_value(response.data).map_err(|e| {
        return Error::Fetch {
            reason: format!("anchor data is not a specification map: {e}"),
        };
    });
}
