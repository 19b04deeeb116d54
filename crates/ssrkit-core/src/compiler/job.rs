//! Scheduled bundle builds.

use super::CompileError;
use crate::bundler::{Bundle, Bundler};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

type JobFuture = Shared<BoxFuture<'static, Result<Bundle, CompileError>>>;

/// One bundler invocation, started at registration time and awaited later.
///
/// The result is memoized: every `wait` after the first sees the same bundle
/// (or the same error) without re-running the bundler.
#[derive(Clone)]
pub(crate) struct BuildJob {
    entry: PathBuf,
    future: JobFuture,
}

impl BuildJob {
    /// Start building `entry`.
    ///
    /// Inside a Tokio runtime the build is spawned right away. Outside one it
    /// starts on the first `wait`.
    pub(crate) fn schedule(bundler: Arc<dyn Bundler>, entry: PathBuf) -> Self {
        let work = build(bundler, entry.clone());

        let future = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!(entry = %entry.display(), "spawning build");
                let task = handle.spawn(work);
                let task_entry = entry.clone();
                async move {
                    match task.await {
                        Ok(result) => result,
                        Err(e) => Err(CompileError::JobFailed {
                            entry: task_entry,
                            reason: e.to_string(),
                        }),
                    }
                }
                .boxed()
            }
            Err(_) => {
                debug!(entry = %entry.display(), "no runtime, deferring build");
                work.boxed()
            }
        };

        Self {
            entry,
            future: future.shared(),
        }
    }

    pub(crate) fn entry(&self) -> &Path {
        &self.entry
    }

    pub(crate) async fn wait(&self) -> Result<Bundle, CompileError> {
        self.future.clone().await
    }
}

async fn build(bundler: Arc<dyn Bundler>, entry: PathBuf) -> Result<Bundle, CompileError> {
    let output = bundler.build(&entry).await;
    for warning in &output.warnings {
        warn!(entry = %entry.display(), "bundler warning: {warning}");
    }
    let result = output.into_bundle(&entry);
    match &result {
        Ok(bundle) => debug!(entry = %entry.display(), bytes = bundle.len(), "build finished"),
        Err(e) => debug!(entry = %entry.display(), error = %e, "build failed"),
    }
    result
}

/// Await every job and return bundles in registration order.
///
/// All jobs run to completion; the reported error is the one from the
/// earliest-registered failing job, independent of completion order.
pub(crate) async fn join_jobs(jobs: &[BuildJob]) -> Result<Vec<Bundle>, CompileError> {
    futures::future::join_all(jobs.iter().map(BuildJob::wait))
        .await
        .into_iter()
        .collect()
}
