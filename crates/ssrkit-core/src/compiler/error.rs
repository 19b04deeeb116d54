use crate::codes;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

type BoxedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the compiled component surface.
///
/// Cloneable so one failed build can be reported to every caller awaiting it.
#[derive(Error, Debug, Clone)]
pub enum CompileError {
    /// The bundler reported errors; only the first one's text is kept.
    #[error("{message}")]
    Build { entry: PathBuf, message: String },

    #[error("bundler produced no output for {}", entry.display())]
    MissingOutput { entry: PathBuf },

    #[error("build of {} did not finish: {reason}", entry.display())]
    JobFailed { entry: PathBuf, reason: String },

    /// A server, session runtime, or static host failed. Passed through as is.
    #[error(transparent)]
    Server(BoxedError),
}

impl CompileError {
    pub(crate) fn server<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Server(Arc::new(err))
    }

    /// Stable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Build { .. } => codes::COMPILE_BUILD_FAILED,
            Self::MissingOutput { .. } => codes::COMPILE_MISSING_OUTPUT,
            Self::JobFailed { .. } => codes::COMPILE_JOB_FAILED,
            Self::Server(_) => codes::COMPILE_SERVER_ERROR,
        }
    }

    /// Entry point whose build failed, if this is a build error.
    #[must_use]
    pub fn entry(&self) -> Option<&std::path::Path> {
        match self {
            Self::Build { entry, .. }
            | Self::MissingOutput { entry }
            | Self::JobFailed { entry, .. } => Some(entry),
            Self::Server(_) => None,
        }
    }

    /// The collaborator's error, for downcasting.
    #[must_use]
    pub fn server_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Server(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("port 80 in use")]
    struct PortInUse;

    #[test]
    fn test_build_message_is_verbatim() {
        let err = CompileError::Build {
            entry: PathBuf::from("a.ts"),
            message: "Could not resolve \"react\"".into(),
        };
        assert_eq!(err.to_string(), "Could not resolve \"react\"");
        assert_eq!(err.code(), codes::COMPILE_BUILD_FAILED);
    }

    #[test]
    fn test_server_error_passes_through() {
        let err = CompileError::server(PortInUse);
        assert_eq!(err.to_string(), "port 80 in use");
        assert!(err.entry().is_none());
        assert!(err.server_error().unwrap().downcast_ref::<PortInUse>().is_some());
    }
}
