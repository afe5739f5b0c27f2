//! Jupyter kernelspec generation and installation.
//!
//! Writes the `kernel.json` the Jupyter launcher reads to start this binary.
//! The wire protocol itself is the host's concern; the spec only has to
//! point at `bosque-kernel serve` and declare signal-based interrupts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const KERNEL_NAME: &str = "bosque";
const SYSTEM_KERNELS_DIR: &str = "/usr/local/share/jupyter/kernels";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelSpec {
    pub argv: Vec<String>,
    pub display_name: String,
    pub language: String,
    pub interrupt_mode: String,
}

impl KernelSpec {
    /// Spec pointing at the currently running binary.
    pub fn current() -> Self {
        let exe = std::env::current_exe()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "bosque-kernel".to_string());
        Self {
            argv: vec![
                exe,
                "serve".to_string(),
                "--connection-file".to_string(),
                "{connection_file}".to_string(),
            ],
            display_name: "Bosque".to_string(),
            language: "bosque".to_string(),
            interrupt_mode: "signal".to_string(),
        }
    }
}

/// Jupyter kernels directory for this install scope. `JUPYTER_DATA_DIR`
/// overrides both scopes, matching Jupyter's own lookup.
pub fn kernels_dir(user: bool) -> Result<PathBuf> {
    if let Some(data_dir) = std::env::var_os("JUPYTER_DATA_DIR") {
        return Ok(PathBuf::from(data_dir).join("kernels"));
    }
    if user {
        let base = BaseDirs::new().context("cannot determine home directory")?;
        Ok(base.data_dir().join("jupyter").join("kernels"))
    } else {
        Ok(PathBuf::from(SYSTEM_KERNELS_DIR))
    }
}

/// Write `kernel.json` into the `bosque` kernels directory, replacing any
/// previous install. Returns the directory written to.
pub fn install(user: bool) -> Result<PathBuf> {
    let dir = kernels_dir(user)?.join(KERNEL_NAME);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create kernelspec directory {}", dir.display()))?;

    let spec = KernelSpec::current();
    let json = serde_json::to_string_pretty(&spec)?;
    let path = dir.join("kernel.json");
    std::fs::write(&path, json)
        .with_context(|| format!("failed to write {}", path.display()))?;

    info!(path = %path.display(), "kernelspec installed");
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_has_expected_shape() {
        let spec = KernelSpec::current();
        assert_eq!(spec.language, "bosque");
        assert_eq!(spec.display_name, "Bosque");
        assert_eq!(spec.interrupt_mode, "signal");
        assert_eq!(spec.argv[1], "serve");
        assert!(spec.argv.contains(&"{connection_file}".to_string()));
    }

    #[test]
    fn spec_round_trips_through_json() {
        let spec = KernelSpec::current();
        let json = serde_json::to_string(&spec).unwrap();
        let back: KernelSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back.argv, spec.argv);
        assert_eq!(back.language, spec.language);
    }
}
