//! Bundler backed by the `esbuild` binary.
//!
//! Output is read from stdout (no `--outfile`), so nothing touches disk.
//! Diagnostics are parsed from stderr in esbuild's plain-text log format:
//!
//! ```text
//! ✘ [ERROR] Could not resolve "./missing"
//!
//!     src/widgets.tsx:1:7:
//!       1 │ import "./missing";
//! ```

use super::{BuildMessage, BuildOutput, Bundler};
use crate::codes;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, trace};

/// Flags every invocation carries. Configuration can add to these, never replace them.
const FIXED_FLAGS: &[&str] = &[
    "--bundle",
    "--format=esm",
    "--platform=browser",
    "--color=false",
    "--log-level=warning",
];

/// Spawns `esbuild` once per entry point.
#[derive(Debug, Clone)]
pub struct EsbuildBundler {
    program: PathBuf,
    cwd: Option<PathBuf>,
    minify: bool,
    sourcemap: bool,
    external: Vec<String>,
    define: BTreeMap<String, String>,
}

impl Default for EsbuildBundler {
    fn default() -> Self {
        Self::new()
    }
}

impl EsbuildBundler {
    /// Use `esbuild` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("esbuild"),
            cwd: None,
            minify: false,
            sourcemap: false,
            external: Vec::new(),
            define: BTreeMap::new(),
        }
    }

    /// Build from project settings.
    #[must_use]
    pub fn from_config(config: &crate::config::ProjectConfig, root: &Path) -> Self {
        let mut bundler = Self::new()
            .program(config.esbuild_binary())
            .cwd(root)
            .minify(config.esbuild.minify)
            .sourcemap(config.esbuild.sourcemap);
        for package in &config.esbuild.external {
            bundler = bundler.external(package);
        }
        for (key, value) in &config.esbuild.define {
            bundler = bundler.define(key, value);
        }
        bundler
    }

    /// Path of the esbuild executable.
    #[must_use]
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Working directory for the child process.
    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    #[must_use]
    pub fn minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    /// Inline source maps into the bundle text.
    #[must_use]
    pub fn sourcemap(mut self, sourcemap: bool) -> Self {
        self.sourcemap = sourcemap;
        self
    }

    /// Keep `package` as an import instead of bundling it.
    #[must_use]
    pub fn external(mut self, package: impl Into<String>) -> Self {
        self.external.push(package.into());
        self
    }

    /// Replace `key` with `value` at compile time.
    #[must_use]
    pub fn define(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.define.insert(key.into(), value.into());
        self
    }

    /// Command-line arguments for `entry`.
    #[must_use]
    pub fn args(&self, entry: &Path) -> Vec<String> {
        let mut args = vec![entry.display().to_string()];
        args.extend(FIXED_FLAGS.iter().map(|f| (*f).to_string()));
        if self.minify {
            args.push("--minify".to_string());
        }
        if self.sourcemap {
            args.push("--sourcemap=inline".to_string());
        }
        for package in &self.external {
            args.push(format!("--external:{package}"));
        }
        for (key, value) in &self.define {
            args.push(format!("--define:{key}={value}"));
        }
        args
    }
}

#[async_trait]
impl Bundler for EsbuildBundler {
    async fn build(&self, entry: &Path) -> BuildOutput {
        let args = self.args(entry);
        debug!(program = %self.program.display(), entry = %entry.display(), "invoking esbuild");
        trace!(?args, "esbuild arguments");

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }

        let output = match command.output().await {
            Ok(output) => output,
            Err(e) => {
                return BuildOutput::failure(vec![BuildMessage::new(format!(
                    "{}: failed to spawn {}: {e}",
                    codes::BUNDLER_SPAWN_FAILED,
                    self.program.display()
                ))]);
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        let (mut errors, warnings) = parse_diagnostics(&stderr);

        if !output.status.success() && errors.is_empty() {
            let detail = stderr.trim();
            let text = if detail.is_empty() {
                format!("{}: esbuild exited with {}", codes::BUNDLER_EXIT_FAILURE, output.status)
            } else {
                format!("{}: {detail}", codes::BUNDLER_EXIT_FAILURE)
            };
            errors.push(BuildMessage::new(text));
        }

        let output_text = if errors.is_empty() {
            Some(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            None
        };

        BuildOutput {
            errors,
            warnings,
            output_text,
        }
    }
}

/// Split esbuild's stderr into (errors, warnings).
///
/// The first `path:line:col:` line after a diagnostic becomes its location.
#[must_use]
pub fn parse_diagnostics(stderr: &str) -> (Vec<BuildMessage>, Vec<BuildMessage>) {
    enum Kind {
        Error,
        Warning,
    }

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut last: Option<Kind> = None;

    for line in stderr.lines() {
        if let Some(text) = marker_text(line, "[ERROR] ") {
            errors.push(BuildMessage::new(text));
            last = Some(Kind::Error);
            continue;
        }
        if let Some(text) = marker_text(line, "[WARNING] ") {
            warnings.push(BuildMessage::new(text));
            last = Some(Kind::Warning);
            continue;
        }

        let Some(location) = location_line(line) else {
            continue;
        };
        let target = match last {
            Some(Kind::Error) => errors.last_mut(),
            Some(Kind::Warning) => warnings.last_mut(),
            None => None,
        };
        if let Some(message) = target {
            if message.location.is_none() {
                message.location = Some(location.to_string());
            }
        }
    }

    (errors, warnings)
}

fn marker_text<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let idx = line.find(marker)?;
    // Only the leading symbol (✘, ▲, X, !) may precede the marker.
    if line[..idx].trim().chars().count() > 1 {
        return None;
    }
    Some(line[idx + marker.len()..].trim())
}

/// Matches `    src/a.ts:12:4:` and returns `src/a.ts:12:4`.
fn location_line(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let body = trimmed.strip_suffix(':')?;
    let mut parts = body.rsplitn(3, ':');
    let column = parts.next()?;
    let row = parts.next()?;
    let file = parts.next()?;
    if file.is_empty()
        || !column.chars().all(|c| c.is_ascii_digit())
        || !row.chars().all(|c| c.is_ascii_digit())
        || column.is_empty()
        || row.is_empty()
    {
        return None;
    }
    Some(body)
}
