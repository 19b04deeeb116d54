pub mod build;
pub mod host;
pub mod version;

use ssrkit_core::config::CONFIG_FILE;
use ssrkit_core::{create_compiler, CompiledComponents, EsbuildBundler, ProjectConfig, ViewExports};
use std::path::{Path, PathBuf};

/// Project settings plus the compiled component set for a command.
pub struct Prepared {
    pub root: PathBuf,
    pub config: ProjectConfig,
    pub compiled: CompiledComponents,
}

/// Load `ssrkit.json`, pick the entry points, and register them.
///
/// Entries given on the command line are resolved against `cwd` and take the
/// place of the configured list. Must run inside a Tokio runtime so the builds
/// start immediately.
pub fn prepare(cwd: &Path, entries: &[PathBuf]) -> Result<Prepared, ssrkit_core::Error> {
    let (root, config) = ProjectConfig::discover(cwd)?;

    let entries: Vec<PathBuf> = if entries.is_empty() {
        config.entry_points(&root)
    } else {
        entries
            .iter()
            .map(|e| if e.is_absolute() { e.clone() } else { cwd.join(e) })
            .collect()
    };
    if entries.is_empty() {
        return Err(ssrkit_core::Error::NoComponents { file: CONFIG_FILE });
    }

    let bundler = EsbuildBundler::from_config(&config, &root);
    let compiled = entries
        .into_iter()
        .fold(create_compiler(bundler), |compiler, entry| {
            compiler.with_components(entry, ViewExports::new())
        })
        .compile();

    Ok(Prepared {
        root,
        config,
        compiled,
    })
}

/// Display `path` relative to `root` when possible.
pub fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}
