use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the project config file.
pub const CONFIG_FILE: &str = "ssrkit.json";

/// Environment variable overriding the esbuild binary.
pub const ESBUILD_ENV: &str = "SSRKIT_ESBUILD";

/// Default URL prefix under which client bundles are hosted.
pub const DEFAULT_MOUNT_PATH: &str = "/client-bundles";

/// Runtime configuration for the ssrkit CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Current working directory.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }
}

/// Contents of `ssrkit.json`.
///
/// ```json
/// {
///   "components": [{ "entry": "src/widgets.tsx" }],
///   "esbuild": { "minify": true, "external": ["react"] },
///   "host": { "address": "127.0.0.1:4100", "mount_path": "/client-bundles" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Component entry points, in registration order.
    pub components: Vec<ComponentEntry>,
    /// Bundler settings.
    pub esbuild: EsbuildConfig,
    /// Static hosting settings.
    pub host: HostConfig,
}

/// One registered component bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEntry {
    /// Entry point, relative to the config file's directory.
    pub entry: PathBuf,
}

/// Settings forwarded to the esbuild binary.
///
/// The bundle/format/platform flags are fixed and cannot be set here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EsbuildConfig {
    /// Path to the esbuild binary (defaults to `esbuild` on `PATH`).
    pub binary: Option<PathBuf>,
    /// Minify output.
    pub minify: bool,
    /// Inline source maps into the bundle text.
    pub sourcemap: bool,
    /// Packages left as imports.
    pub external: Vec<String>,
    /// Compile-time replacements.
    pub define: BTreeMap<String, String>,
}

/// Settings for `ssrkit host`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Socket address to bind.
    pub address: Option<String>,
    /// URL prefix for bundles.
    pub mount_path: Option<String>,
}

impl ProjectConfig {
    /// Read and parse a config file.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let source = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&source).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Discover `ssrkit.json` from `cwd` upward and load it.
    ///
    /// Returns the directory holding the file alongside the config, or `cwd`
    /// with defaults when no file exists. Relative component entries are
    /// resolved against the returned directory.
    pub fn discover(cwd: &Path) -> Result<(PathBuf, Self), Error> {
        match find_config_file(cwd) {
            Some(path) => {
                let config = Self::from_file(&path)?;
                let root = path
                    .parent()
                    .map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);
                Ok((root, config))
            }
            None => Ok((cwd.to_path_buf(), Self::default())),
        }
    }

    /// Entry points resolved against `root`.
    #[must_use]
    pub fn entry_points(&self, root: &Path) -> Vec<PathBuf> {
        self.components
            .iter()
            .map(|c| {
                if c.entry.is_absolute() {
                    c.entry.clone()
                } else {
                    root.join(&c.entry)
                }
            })
            .collect()
    }

    /// Effective esbuild binary: `SSRKIT_ESBUILD`, then the config, then `esbuild`.
    #[must_use]
    pub fn esbuild_binary(&self) -> PathBuf {
        std::env::var_os(ESBUILD_ENV)
            .map(PathBuf::from)
            .or_else(|| self.esbuild.binary.clone())
            .unwrap_or_else(|| PathBuf::from("esbuild"))
    }

    /// Effective mount path for hosted bundles.
    #[must_use]
    pub fn mount_path(&self) -> &str {
        self.host.mount_path.as_deref().unwrap_or(DEFAULT_MOUNT_PATH)
    }
}

/// Walk up from `cwd` looking for `ssrkit.json`.
#[must_use]
pub fn find_config_file(cwd: &Path) -> Option<PathBuf> {
    let mut current = cwd.to_path_buf();

    loop {
        let candidate = current.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }

        if !current.pop() {
            return None;
        }
    }
}
