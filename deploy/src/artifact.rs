use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use ethers::{abi::Abi, types::Bytes};
use serde::Deserialize;

/// A compiled-contract artifact: the contract name, its ABI, and the
/// creation bytecode as 0x-prefixed hex, in the layout the contract
/// compiler writes its JSON output.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
}

impl Artifact {
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Locates `<name>.json` under the artifacts directory and parses it.
///
/// The compiler nests artifacts per source file (`contracts/XOXO.sol/XOXO.json`),
/// so the lookup recurses. The `<name>.dbg.json` debug output written next to
/// each artifact never matches the exact file name.
pub fn find_artifact(dir: &Path, name: &str) -> Result<Artifact> {
    let file_name = format!("{name}.json");
    let path = find_file(dir, &file_name)?.ok_or_else(|| {
        anyhow!(
            "artifact for contract {name} not found under {}",
            dir.display()
        )
    })?;

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read artifact {}", path.display()))?;
    let artifact = Artifact::parse(&raw)
        .with_context(|| format!("failed to parse artifact {}", path.display()))?;

    if artifact.contract_name != name {
        bail!(
            "artifact {} declares contract {}, expected {name}",
            path.display(),
            artifact.contract_name
        );
    }
    if artifact.bytecode.is_empty() {
        bail!("contract {name} has no bytecode and cannot be deployed");
    }

    Ok(artifact)
}

fn find_file(dir: &Path, file_name: &str) -> Result<Option<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read artifacts directory {}", dir.display()))?;

    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            if let Some(found) = find_file(&path, file_name)? {
                return Ok(Some(found));
            }
        } else if path.file_name() == Some(OsStr::new(file_name)) {
            return Ok(Some(path));
        }
    }

    Ok(None)
}
