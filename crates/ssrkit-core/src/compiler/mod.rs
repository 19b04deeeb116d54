//! Component compiler.
//!
//! Accumulates component registrations, bundles each entry point, and injects
//! the results into a rendering pipeline.
//!
//! ## Usage
//!
//! ```ignore
//! use ssrkit_core::{create_compiler, EsbuildBundler, ServeOptions, ViewExports};
//!
//! let compiled = create_compiler(EsbuildBundler::new())
//!     .with_components("src/navbar.tsx", ViewExports::new().view("Navbar", navbar))
//!     .with_components("src/footer.tsx", ViewExports::new().view("Footer", footer))
//!     .compile();
//!
//! compiled.serve(&server, render, ServeOptions::new(settings)).await?;
//! ```
//!
//! ## Merge policy
//!
//! For every call the builder's own components come first and the call-site
//! `additional_components` are layered on top:
//!
//! - `ssr_views`: call-site views replace builder views with the same name
//! - `bundles`: call-site bundles are appended after builder bundles

mod error;
mod job;

pub use error::CompileError;

use crate::bundler::{Bundle, Bundler};
use crate::server::{AdditionalComponents, RenderServer, ServeOptions, SessionRuntime, StaticHost};
use crate::view::{BaseWrapper, SsrViews, ViewExports, ViewWrapper};
use job::{join_jobs, BuildJob};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// One `with_components` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Bundle entry point.
    pub entry: PathBuf,
    /// Export names registered with it.
    pub exports: Vec<String>,
}

/// Start a builder that bundles with `bundler` and wraps views with [`BaseWrapper`].
pub fn create_compiler(bundler: impl Bundler) -> ComponentCompiler {
    ComponentCompiler::new(bundler)
}

/// Builder accumulating components until [`compile`](Self::compile).
///
/// Each step consumes the builder and returns the extended one.
pub struct ComponentCompiler {
    bundler: Arc<dyn Bundler>,
    wrapper: Arc<dyn ViewWrapper>,
    registrations: Vec<Registration>,
    jobs: Vec<BuildJob>,
    ssr_views: SsrViews,
}

impl ComponentCompiler {
    #[must_use]
    pub fn new(bundler: impl Bundler) -> Self {
        Self::with_wrapper(bundler, BaseWrapper::default())
    }

    /// Use a custom view wrapper.
    #[must_use]
    pub fn with_wrapper(bundler: impl Bundler, wrapper: impl ViewWrapper) -> Self {
        Self {
            bundler: Arc::new(bundler),
            wrapper: Arc::new(wrapper),
            registrations: Vec::new(),
            jobs: Vec::new(),
            ssr_views: SsrViews::new(),
        }
    }

    /// Register an entry point and the views it exports.
    ///
    /// The build starts now and is awaited by the compiled surface; a failing
    /// build does not fail this call. Views are wrapped immediately and
    /// replace earlier views with the same name.
    #[must_use]
    pub fn with_components(mut self, entry: impl Into<PathBuf>, views: ViewExports) -> Self {
        let entry = entry.into();
        let exports = views.names();
        debug!(entry = %entry.display(), ?exports, "registering components");

        self.jobs
            .push(BuildJob::schedule(Arc::clone(&self.bundler), entry.clone()));

        for (name, view) in views {
            let wrapped = self.wrapper.wrap(&name, view);
            self.ssr_views.insert(name, wrapped);
        }

        self.registrations.push(Registration { entry, exports });
        self
    }

    /// Names of every view registered so far.
    pub fn view_names(&self) -> impl Iterator<Item = &str> {
        self.ssr_views.keys().map(String::as_str)
    }

    #[must_use]
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    /// Number of scheduled builds.
    #[must_use]
    pub fn pending_builds(&self) -> usize {
        self.jobs.len()
    }

    /// Freeze the registrations.
    #[must_use]
    pub fn compile(self) -> CompiledComponents {
        debug!(builds = self.jobs.len(), views = self.ssr_views.len(), "compiled components");
        CompiledComponents {
            inner: Arc::new(Compiled {
                registrations: self.registrations,
                jobs: self.jobs,
                ssr_views: self.ssr_views,
            }),
        }
    }
}

impl fmt::Debug for ComponentCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentCompiler")
            .field("registrations", &self.registrations)
            .finish_non_exhaustive()
    }
}

struct Compiled {
    registrations: Vec<Registration>,
    jobs: Vec<BuildJob>,
    ssr_views: SsrViews,
}

/// Frozen set of components, ready to hand to a server.
///
/// Cheap to clone; clones share the same build results.
#[derive(Clone)]
pub struct CompiledComponents {
    inner: Arc<Compiled>,
}

impl CompiledComponents {
    #[must_use]
    pub fn registrations(&self) -> &[Registration] {
        &self.inner.registrations
    }

    /// Wrapped views accumulated by the builder.
    #[must_use]
    pub fn ssr_views(&self) -> &SsrViews {
        &self.inner.ssr_views
    }

    #[must_use]
    pub fn pending_builds(&self) -> usize {
        self.inner.jobs.len()
    }

    /// Entry points of the scheduled builds, in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &Path> {
        self.inner.jobs.iter().map(BuildJob::entry)
    }

    /// Await every build and return the bundles in registration order.
    pub async fn bundles(&self) -> Result<Vec<Bundle>, CompileError> {
        join_jobs(&self.inner.jobs).await
    }

    /// Await every build and layer `call_site` over the builder's components.
    pub async fn additional_components(
        &self,
        call_site: AdditionalComponents,
    ) -> Result<AdditionalComponents, CompileError> {
        let bundles = self.bundles().await?;
        let own = AdditionalComponents {
            ssr_views: self.inner.ssr_views.clone(),
            bundles,
        };
        Ok(own.layered(call_site))
    }

    async fn merged<O>(&self, options: ServeOptions<O>) -> Result<ServeOptions<O>, CompileError> {
        let additional_components = self
            .additional_components(options.additional_components)
            .await?;
        Ok(ServeOptions {
            additional_components,
            server: options.server,
        })
    }

    /// Await the builds, merge, and start `server`.
    pub async fn serve<S: RenderServer>(
        &self,
        server: &S,
        render: S::Render,
        options: ServeOptions<S::Options>,
    ) -> Result<S::Output, CompileError> {
        let options = self.merged(options).await?;
        info!(
            bundles = options.additional_components.bundles.len(),
            views = options.additional_components.ssr_views.len(),
            "starting server"
        );
        server
            .serve(render, options)
            .await
            .map_err(CompileError::server)
    }

    /// Bind `options` for per-session handling. Nothing is awaited yet.
    pub fn create_session_handler<R: SessionRuntime>(
        &self,
        runtime: Arc<R>,
        options: ServeOptions<R::Options>,
    ) -> SessionHandler<R> {
        SessionHandler {
            compiled: self.clone(),
            runtime,
            options,
        }
    }

    /// Await the builds and publish the bundles through `host`.
    pub async fn host_statics<H: StaticHost>(
        &self,
        host: &H,
        server: H::Server,
        mount_path: Option<&str>,
    ) -> Result<H::Output, CompileError> {
        let bundles = self.bundles().await?;
        info!(bundles = bundles.len(), mount_path = ?mount_path, "hosting client bundles");
        host.host_client_bundles(server, mount_path, bundles)
            .await
            .map_err(CompileError::server)
    }
}

impl fmt::Debug for CompiledComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledComponents")
            .field("registrations", &self.inner.registrations)
            .field("ssr_views", &self.inner.ssr_views.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Options bound to a compiled component set, waiting for a renderer.
pub struct SessionHandler<R: SessionRuntime> {
    compiled: CompiledComponents,
    runtime: Arc<R>,
    options: ServeOptions<R::Options>,
}

impl<R: SessionRuntime> SessionHandler<R> {
    /// Produce a request handler for `render` and `configuration`.
    #[must_use]
    pub fn handle(&self, render: R::Render, configuration: R::Configuration) -> RequestHandler<R> {
        RequestHandler {
            session: self.clone(),
            render,
            configuration,
        }
    }
}

impl<R: SessionRuntime> Clone for SessionHandler<R> {
    fn clone(&self) -> Self {
        Self {
            compiled: self.compiled.clone(),
            runtime: Arc::clone(&self.runtime),
            options: self.options.clone(),
        }
    }
}

/// Handles one request at a time; clone freely to serve concurrently.
pub struct RequestHandler<R: SessionRuntime> {
    session: SessionHandler<R>,
    render: R::Render,
    configuration: R::Configuration,
}

impl<R: SessionRuntime> RequestHandler<R> {
    /// Await the (memoized) builds, merge, and hand the request to the runtime.
    pub async fn call(&self, request: R::Request) -> Result<R::Output, CompileError> {
        let options = self
            .session
            .compiled
            .merged(self.session.options.clone())
            .await?;
        self.session
            .runtime
            .handle(options, self.render.clone(), self.configuration.clone(), request)
            .await
            .map_err(CompileError::server)
    }
}

impl<R: SessionRuntime> Clone for RequestHandler<R> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            render: self.render.clone(),
            configuration: self.configuration.clone(),
        }
    }
}
