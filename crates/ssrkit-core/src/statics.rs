//! Serving compiled bundles over HTTP with axum.
//!
//! Bundles are mounted in registration order:
//!
//! ```text
//! GET {mount}/0.js           first bundle
//! GET {mount}/1.js           second bundle
//! GET {mount}/manifest.json  {"bundles":["{mount}/0.js","{mount}/1.js"]}
//! ```

use crate::bundler::Bundle;
use crate::config::DEFAULT_MOUNT_PATH;
use crate::server::StaticHost;
use async_trait::async_trait;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::convert::Infallible;

/// Adds bundle routes to an existing [`Router`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RouterStatics;

/// Body of `{mount}/manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleManifest {
    /// Bundle URLs in load order.
    pub bundles: Vec<String>,
}

#[async_trait]
impl StaticHost for RouterStatics {
    type Server = Router;
    type Output = Router;
    type Error = Infallible;

    async fn host_client_bundles(
        &self,
        server: Router,
        mount_path: Option<&str>,
        bundles: Vec<Bundle>,
    ) -> Result<Router, Infallible> {
        Ok(mount_bundles(server, mount_path, bundles))
    }
}

/// Normalize a mount path to `/segment` form; `/` becomes the empty prefix.
#[must_use]
pub fn normalize_mount_path(mount_path: Option<&str>) -> String {
    let raw = mount_path.unwrap_or(DEFAULT_MOUNT_PATH).trim();
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// URL of the bundle at `index` under `mount`.
#[must_use]
pub fn bundle_url(mount: &str, index: usize) -> String {
    format!("{mount}/{index}.js")
}

/// Add one route per bundle plus the manifest.
pub fn mount_bundles(router: Router, mount_path: Option<&str>, bundles: Vec<Bundle>) -> Router {
    let mount = normalize_mount_path(mount_path);
    let manifest = BundleManifest {
        bundles: (0..bundles.len()).map(|i| bundle_url(&mount, i)).collect(),
    };

    let mut router = router;
    for (index, bundle) in bundles.into_iter().enumerate() {
        let url = bundle_url(&mount, index);
        router = router.route(
            &url,
            get(move || {
                let bundle = bundle.clone();
                async move { javascript(&bundle) }
            }),
        );
    }

    router.route(
        &format!("{mount}/manifest.json"),
        get(move || {
            let manifest = manifest.clone();
            async move { Json(manifest) }
        }),
    )
}

fn javascript(bundle: &Bundle) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        bundle.code().to_owned(),
    )
        .into_response()
}
