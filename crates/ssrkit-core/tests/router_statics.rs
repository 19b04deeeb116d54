//! Integration tests for hosting compiled bundles on an axum router.

use async_trait::async_trait;
use axum::{routing::get, Router};
use ssrkit_core::{create_compiler, BuildOutput, Bundler, RouterStatics, ViewExports};
use std::net::SocketAddr;
use std::path::Path;

struct PathBundler;

#[async_trait]
impl Bundler for PathBundler {
    async fn build(&self, entry: &Path) -> BuildOutput {
        BuildOutput::success(format!("export default {:?};", entry.display().to_string()))
    }
}

/// Serve `app` on an ephemeral port and return its address.
async fn spawn_app(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_bundles_served_in_registration_order() {
    let compiled = create_compiler(PathBundler)
        .with_components("navbar.tsx", ViewExports::new())
        .with_components("footer.tsx", ViewExports::new())
        .compile();

    let host = Router::new().route("/health", get(|| async { "ok" }));
    let app = compiled
        .host_statics(&RouterStatics, host, Some("/static/"))
        .await
        .unwrap();
    let addr = spawn_app(app).await;
    let client = reqwest::Client::new();

    let first = client
        .get(format!("http://{addr}/static/0.js"))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 200);
    assert_eq!(
        first.headers()["content-type"].to_str().unwrap(),
        "application/javascript"
    );
    assert_eq!(first.text().await.unwrap(), "export default \"navbar.tsx\";");

    let second = client
        .get(format!("http://{addr}/static/1.js"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(second, "export default \"footer.tsx\";");

    let manifest: serde_json::Value = client
        .get(format!("http://{addr}/static/manifest.json"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        manifest,
        serde_json::json!({"bundles": ["/static/0.js", "/static/1.js"]})
    );

    // Existing routes are kept.
    let health = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(health.text().await.unwrap(), "ok");

    let missing = client
        .get(format!("http://{addr}/static/2.js"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn test_default_mount_path() {
    let compiled = create_compiler(PathBundler)
        .with_components("a.tsx", ViewExports::new())
        .compile();
    let app = compiled
        .host_statics(&RouterStatics, Router::new(), None)
        .await
        .unwrap();
    let addr = spawn_app(app).await;

    let body = reqwest::get(format!("http://{addr}/client-bundles/0.js"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "export default \"a.tsx\";");
}
