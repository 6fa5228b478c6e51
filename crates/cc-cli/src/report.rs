use anyhow::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Serialize)]
pub struct BundleMeta {
    pub tool: String,
    pub tool_version: String,
    pub created_unix_ms: u128,
    pub command: String,
    pub args: serde_json::Value,
    pub input: BundleInputMeta,
}

#[derive(Debug, Clone, Serialize)]
pub struct BundleInputMeta {
    pub original_path: String,
    pub input_sha256: String,
}

#[derive(Debug, Clone, Serialize)]
struct Manifest {
    bundle_version: u32,
    files: Vec<ManifestFile>,
}

#[derive(Debug, Clone, Serialize)]
struct ManifestFile {
    path: String,
    bytes: u64,
    sha256: String,
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    h.finalize().iter().map(|b| format!("{b:02x}")).collect()
}

/// Fails unless `dir` is absent or an empty directory; creates it when absent.
pub fn ensure_empty_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        if !dir.is_dir() {
            anyhow::bail!("bundle path exists but is not a directory: {}", dir.display());
        }
        if dir.read_dir()?.next().is_some() {
            anyhow::bail!("bundle directory must be empty: {}", dir.display());
        }
    } else {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Write a reproducibility bundle: `meta.json`, `inputs/input.csv`,
/// `outputs/result.json` and a `manifest.json` hashing all three.
pub fn write_bundle(
    bundle_dir: &Path,
    command: &str,
    args: serde_json::Value,
    input_path: &Path,
    output_value: &serde_json::Value,
) -> Result<()> {
    ensure_empty_dir(bundle_dir)?;

    let inputs_dir = bundle_dir.join("inputs");
    let outputs_dir = bundle_dir.join("outputs");
    std::fs::create_dir_all(&inputs_dir)?;
    std::fs::create_dir_all(&outputs_dir)?;

    let input_bytes = std::fs::read(input_path)?;
    let input_sha256 = sha256_hex(&input_bytes);
    std::fs::write(inputs_dir.join("input.csv"), &input_bytes)?;

    let meta = BundleMeta {
        tool: "churncause".to_string(),
        tool_version: cc_core::VERSION.to_string(),
        created_unix_ms: SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis(),
        command: command.to_string(),
        args,
        input: BundleInputMeta {
            original_path: input_path.display().to_string(),
            input_sha256,
        },
    };
    std::fs::write(bundle_dir.join("meta.json"), serde_json::to_string_pretty(&meta)?)?;
    std::fs::write(outputs_dir.join("result.json"), serde_json::to_string_pretty(output_value)?)?;

    let mut files = Vec::new();
    for rel in ["meta.json", "inputs/input.csv", "outputs/result.json"] {
        let bytes = std::fs::read(bundle_dir.join(rel))?;
        files.push(ManifestFile {
            path: rel.to_string(),
            bytes: bytes.len() as u64,
            sha256: sha256_hex(&bytes),
        });
    }
    let manifest = Manifest { bundle_version: 1, files };
    std::fs::write(bundle_dir.join("manifest.json"), serde_json::to_string_pretty(&manifest)?)?;

    tracing::info!(dir = %bundle_dir.display(), "bundle written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_bundle_dir_is_refused() {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        let dir = std::env::temp_dir()
            .join(format!("churncause_report_{}_{}", std::process::id(), nanos));
        ensure_empty_dir(&dir).unwrap();
        assert!(dir.is_dir());
        ensure_empty_dir(&dir).unwrap();

        std::fs::write(dir.join("stale.json"), "{}").unwrap();
        let err = ensure_empty_dir(&dir).unwrap_err();
        assert!(err.to_string().contains("bundle directory must be empty"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
