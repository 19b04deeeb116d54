//! Bundler seam.
//!
//! A bundler turns one entry point into browser-executable text, or into a list
//! of error messages. The compiler treats it as a black box and only looks at
//! the first error.
//!
//! ## Usage
//!
//! ```ignore
//! use ssrkit_core::bundler::{Bundler, EsbuildBundler};
//!
//! let bundler = EsbuildBundler::new().minify(true);
//! let output = bundler.build(Path::new("src/widgets.tsx")).await;
//! let bundle = output.into_bundle(Path::new("src/widgets.tsx"))?;
//! ```

mod esbuild;

pub use esbuild::{parse_diagnostics, EsbuildBundler};

use crate::compiler::CompileError;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Something that can bundle an entry point for the browser.
///
/// Implementations are invoked with fixed settings: all dependencies bundled,
/// ESM output, browser platform, nothing written to disk.
#[async_trait]
pub trait Bundler: Send + Sync + 'static {
    /// Bundle `entry` and report the outcome.
    ///
    /// Failures are reported through [`BuildOutput::errors`], never by panicking.
    async fn build(&self, entry: &Path) -> BuildOutput;
}

#[async_trait]
impl<B: Bundler + ?Sized> Bundler for Arc<B> {
    async fn build(&self, entry: &Path) -> BuildOutput {
        (**self).build(entry).await
    }
}

/// A single diagnostic from the bundler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMessage {
    /// Human-readable message text.
    pub text: String,
    /// `file:line:column` when the bundler reported one.
    pub location: Option<String>,
}

impl BuildMessage {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            location: None,
        }
    }

    #[must_use]
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for BuildMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} ({})", self.text, location),
            None => f.write_str(&self.text),
        }
    }
}

/// Result of one bundler invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutput {
    /// Errors, in the order the bundler reported them.
    pub errors: Vec<BuildMessage>,
    /// Warnings. Never fail a build.
    pub warnings: Vec<BuildMessage>,
    /// Bundled text, when the bundler produced any.
    pub output_text: Option<String>,
}

impl BuildOutput {
    /// A successful build with the given text.
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            output_text: Some(text.into()),
            ..Default::default()
        }
    }

    /// A failed build with the given errors.
    #[must_use]
    pub fn failure(errors: Vec<BuildMessage>) -> Self {
        Self {
            errors,
            ..Default::default()
        }
    }

    /// Convert into a bundle.
    ///
    /// Any reported error fails the conversion with the first error's text;
    /// partially produced output is discarded.
    pub fn into_bundle(self, entry: &Path) -> Result<Bundle, CompileError> {
        if let Some(first) = self.errors.into_iter().next() {
            return Err(CompileError::Build {
                entry: entry.to_path_buf(),
                message: first.text,
            });
        }
        match self.output_text {
            Some(text) => Ok(Bundle::from_entry(entry, text)),
            None => Err(CompileError::MissingOutput {
                entry: entry.to_path_buf(),
            }),
        }
    }
}

/// Browser-executable bundle text.
///
/// Cloning is cheap; the text is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    code: Arc<str>,
    entry: Option<PathBuf>,
}

impl Bundle {
    /// A bundle supplied directly by the caller.
    #[must_use]
    pub fn new(code: impl Into<Arc<str>>) -> Self {
        Self {
            code: code.into(),
            entry: None,
        }
    }

    /// A bundle compiled from `entry`.
    #[must_use]
    pub fn from_entry(entry: &Path, code: impl Into<Arc<str>>) -> Self {
        Self {
            code: code.into(),
            entry: Some(entry.to_path_buf()),
        }
    }

    /// The bundle text.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Entry point this bundle was compiled from, if any.
    #[must_use]
    pub fn entry(&self) -> Option<&Path> {
        self.entry.as_deref()
    }

    /// Size of the text in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.code.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

impl From<&str> for Bundle {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for Bundle {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}
