/// Crate-level error types for xrefdb compilation runs.
use std::path::PathBuf;

/// All errors in xrefdb carry enough context to produce a useful diagnostic
/// without a debugger. Each variant names the artifact, spec, or reason for failure.
#[allow(clippy::error_impl_error, reason = "crate-level error type shared by lib and binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The anchor-data API answered with a status this client cannot use.
    #[error(
        "anchor-data API rejected the request (status {status}); either this API version is no \
         longer supported or there was a transient network error"
    )]
    ApiRejected {
        /// HTTP status reported by the fetch collaborator.
        status: u16,
    },

    /// The fetch collaborator failed before producing a usable payload.
    #[error("couldn't download anchor data: {reason}")]
    Fetch {
        /// Description of the transport or decoding failure.
        reason: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization or deserialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// A shard file does not follow the line-record format.
    #[error("malformed shard {}: {reason}", path.display())]
    MalformedShard {
        /// Shard file that failed to parse.
        path: PathBuf,
        /// Description of the format violation.
        reason: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// A multi-page heading URI did not have the expected `page...#fragment` shape.
    #[error("unexpected heading URI pattern `{uri}` in spec `{spec}`")]
    UnexpectedHeadingUri {
        /// Versioned shortname of the spec owning the heading.
        spec: String,
        /// The offending URI.
        uri: String,
    },

    /// The anchor-data response declared a content type this client cannot decode.
    #[error("unrecognized anchor-data content-type `{content_type}`")]
    UnsupportedContentType {
        /// The content type reported by the fetch collaborator.
        content_type: String,
    },

    /// Writing one output artifact failed.
    #[error("couldn't save {} to disk: {source}", artifact.display())]
    Write {
        /// Artifact path that failed to write.
        artifact: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
