use std::path::{Path, PathBuf};

use crate::error::Error;

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = ".xrefdb.toml";

/// Shard group length used when the config does not set one.
pub const DEFAULT_SHARD_KEY_LENGTH: usize = 2;

/// Project configuration loaded from `.xrefdb.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Anchor-data snapshot to compile.
    pub input: PathBuf,
    /// Directory the indices are written to.
    pub output: PathBuf,
    /// Significant characters per shard group name.
    pub shard_key_length: usize,
}

/// Raw TOML structure for `.xrefdb.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct XrefdbTomlConfig {
    #[serde(default)]
    input: Option<PathBuf>,
    #[serde(default)]
    output: Option<PathBuf>,
    #[serde(default)]
    shard_key_length: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            input: PathBuf::from("anchors.json"),
            output: PathBuf::from("spec-data"),
            shard_key_length: DEFAULT_SHARD_KEY_LENGTH,
        };
    }
}

impl Config {
    /// Load config from `.xrefdb.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist. Returns an error if the
    /// file exists but is malformed: a config the user wrote is never
    /// silently ignored. Relative paths resolve against `root`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let defaults = Self::default();
                return Ok(Self {
                    input: root.join(defaults.input),
                    output: root.join(defaults.output),
                    shard_key_length: defaults.shard_key_length,
                });
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse(root, &content);
    }

    /// Parse config content, resolving relative paths against `root`.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed or has unknown keys.
    pub fn parse(root: &Path, content: &str) -> Result<Self, Error> {
        let raw: XrefdbTomlConfig = toml::from_str(content)?;
        let defaults = Self::default();
        return Ok(Self {
            input: root.join(raw.input.unwrap_or(defaults.input)),
            output: root.join(raw.output.unwrap_or(defaults.output)),
            shard_key_length: raw.shard_key_length.filter(|n| return *n > 0).unwrap_or(defaults.shard_key_length),
        });
    }
}
