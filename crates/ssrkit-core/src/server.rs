//! Seams to the rendering server.
//!
//! The composer never renders, routes, or manages sessions itself. It shapes
//! [`AdditionalComponents`] and hands it to one of these collaborators.

use crate::bundler::Bundle;
use crate::view::SsrViews;
use async_trait::async_trait;
use std::fmt;

/// The `{ssr_views, bundles}` payload injected into a render pipeline.
#[derive(Clone, Default)]
pub struct AdditionalComponents {
    /// Server-renderable views by export name.
    pub ssr_views: SsrViews,
    /// Client bundles, in load order.
    pub bundles: Vec<Bundle>,
}

impl AdditionalComponents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay `overlay` on top of `self`.
    ///
    /// Views from `overlay` replace same-named views; its bundles are appended
    /// after the existing ones.
    #[must_use]
    pub fn layered(mut self, overlay: AdditionalComponents) -> Self {
        self.ssr_views.extend(overlay.ssr_views);
        self.bundles.extend(overlay.bundles);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ssr_views.is_empty() && self.bundles.is_empty()
    }
}

impl fmt::Debug for AdditionalComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdditionalComponents")
            .field("ssr_views", &self.ssr_views.keys().collect::<Vec<_>>())
            .field("bundles", &self.bundles.len())
            .finish()
    }
}

/// Options passed to a server, session runtime, or the compiled surface.
///
/// `server` is whatever the collaborator takes besides the component payload
/// and passes through untouched.
#[derive(Debug, Clone, Default)]
pub struct ServeOptions<O> {
    pub additional_components: AdditionalComponents,
    pub server: O,
}

impl<O> ServeOptions<O> {
    #[must_use]
    pub fn new(server: O) -> Self {
        Self {
            additional_components: AdditionalComponents::default(),
            server,
        }
    }

    #[must_use]
    pub fn with_additional_components(mut self, components: AdditionalComponents) -> Self {
        self.additional_components = components;
        self
    }
}

/// A server that renders with `render` and the merged components.
#[async_trait]
pub trait RenderServer: Send + Sync {
    type Render: Send + 'static;
    type Options: Send + 'static;
    type Output: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    async fn serve(
        &self,
        render: Self::Render,
        options: ServeOptions<Self::Options>,
    ) -> Result<Self::Output, Self::Error>;
}

/// Per-session request handling.
///
/// Invoked once per request with freshly merged options.
#[async_trait]
pub trait SessionRuntime: Send + Sync + 'static {
    type Render: Clone + Send + Sync + 'static;
    type Options: Clone + Send + Sync + 'static;
    type Configuration: Clone + Send + Sync + 'static;
    type Request: Send + 'static;
    type Output: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    async fn handle(
        &self,
        options: ServeOptions<Self::Options>,
        render: Self::Render,
        configuration: Self::Configuration,
        request: Self::Request,
    ) -> Result<Self::Output, Self::Error>;
}

/// Publishes compiled bundles for browsers to fetch.
#[async_trait]
pub trait StaticHost: Send + Sync {
    type Server: Send;
    type Output: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    async fn host_client_bundles(
        &self,
        server: Self::Server,
        mount_path: Option<&str>,
        bundles: Vec<Bundle>,
    ) -> Result<Self::Output, Self::Error>;
}

/// Static host that hands the bundles back, in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundleCollector;

#[async_trait]
impl StaticHost for BundleCollector {
    type Server = ();
    type Output = Vec<Bundle>;
    type Error = std::convert::Infallible;

    async fn host_client_bundles(
        &self,
        _server: (),
        _mount_path: Option<&str>,
        bundles: Vec<Bundle>,
    ) -> Result<Vec<Bundle>, Self::Error> {
        Ok(bundles)
    }
}
