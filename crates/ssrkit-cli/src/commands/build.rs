//! `ssrkit build` command implementation.
//!
//! Compiles every registered entry point and writes the bundles to disk, or
//! prints a summary when no output directory is given.

use super::{prepare, relative};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use ssrkit_core::statics::{bundle_url, normalize_mount_path, BundleManifest};
use ssrkit_core::{Bundle, BundleCollector, CompileError};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Build command action.
#[derive(Debug, Clone)]
pub struct BuildAction {
    /// Working directory.
    pub cwd: PathBuf,
    /// Entry points (empty = use ssrkit.json).
    pub entries: Vec<PathBuf>,
    /// Output directory (if None, only a summary is printed).
    pub outdir: Option<PathBuf>,
}

/// JSON output for the build command.
#[derive(Serialize)]
struct BuildResultJson {
    ok: bool,
    bundles: Vec<BundleJson>,
    duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<BuildErrorJson>,
}

#[derive(Serialize)]
struct BundleJson {
    entry: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    outfile: Option<String>,
    size_bytes: usize,
}

#[derive(Serialize)]
struct BuildErrorJson {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    entry: Option<String>,
}

/// Run the build command.
pub fn run(action: BuildAction, json: bool) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    runtime.block_on(run_async(action, json))
}

async fn run_async(action: BuildAction, json: bool) -> Result<()> {
    let start = Instant::now();
    let prepared = prepare(&action.cwd, &action.entries).into_diagnostic()?;
    let root = prepared.root.clone();

    let result = prepared
        .compiled
        .host_statics(&BundleCollector, (), None)
        .await;
    let duration_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(bundles) => {
            let outfiles = match &action.outdir {
                Some(outdir) => Some(write_bundles(
                    outdir,
                    &bundles,
                    prepared.config.mount_path(),
                )?),
                None => None,
            };

            let entries: Vec<BundleJson> = bundles
                .iter()
                .enumerate()
                .map(|(i, bundle)| BundleJson {
                    entry: bundle
                        .entry()
                        .map(|e| relative(e, &root))
                        .unwrap_or_default(),
                    outfile: outfiles.as_ref().map(|files| files[i].display().to_string()),
                    size_bytes: bundle.len(),
                })
                .collect();

            if json {
                let json_result = BuildResultJson {
                    ok: true,
                    bundles: entries,
                    duration_ms,
                    error: None,
                };
                println!("{}", serde_json::to_string(&json_result).into_diagnostic()?);
            } else {
                for entry in &entries {
                    let size_kb = entry.size_bytes as f64 / 1024.0;
                    match &entry.outfile {
                        Some(outfile) => {
                            println!("  {} -> {} ({:.1}KB)", entry.entry, outfile, size_kb);
                        }
                        None => println!("  {} ({:.1}KB)", entry.entry, size_kb),
                    }
                }
                println!("  {} bundles in {}ms", entries.len(), duration_ms);
            }

            Ok(())
        }
        Err(e) => {
            report_error(&e, &root, duration_ms, json);
            std::process::exit(1);
        }
    }
}

/// Write `<outdir>/<index>.js` per bundle plus `manifest.json`.
fn write_bundles(outdir: &Path, bundles: &[Bundle], mount_path: &str) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(outdir).into_diagnostic()?;

    let mut written = Vec::with_capacity(bundles.len());
    for (i, bundle) in bundles.iter().enumerate() {
        let path = outdir.join(format!("{i}.js"));
        std::fs::write(&path, bundle.code()).into_diagnostic()?;
        written.push(path);
    }

    let mount = normalize_mount_path(Some(mount_path));
    let manifest = BundleManifest {
        bundles: (0..bundles.len()).map(|i| bundle_url(&mount, i)).collect(),
    };
    let manifest_json = serde_json::to_string_pretty(&manifest).into_diagnostic()?;
    std::fs::write(outdir.join("manifest.json"), manifest_json).into_diagnostic()?;

    Ok(written)
}

fn report_error(err: &CompileError, root: &Path, duration_ms: u64, json: bool) {
    let entry = err.entry().map(|e| relative(e, root));
    if json {
        let json_result = BuildResultJson {
            ok: false,
            bundles: Vec::new(),
            duration_ms,
            error: Some(BuildErrorJson {
                code: err.code().to_string(),
                message: err.to_string(),
                entry,
            }),
        };
        if let Ok(line) = serde_json::to_string(&json_result) {
            println!("{line}");
        }
    } else {
        eprintln!("error: {err}");
        if let Some(entry) = entry {
            eprintln!("  in {entry}");
        }
    }
}
