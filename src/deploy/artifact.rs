//! Compiled contract artifacts (ABI plus creation bytecode)

use crate::selector::Abi;
use alloy::primitives::{hex, Bytes};
use eyre::{ensure, eyre, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Creation bytecode: a hex string (Hardhat) or an object with an `object` field (Foundry)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum Bytecode {
    Hex(String),
    Object { object: String },
}

impl Bytecode {
    fn as_hex(&self) -> &str {
        match self {
            Bytecode::Hex(code) | Bytecode::Object { object: code } => code,
        }
    }
}

/// One contract's build artifact
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Artifact {
    pub abi: Abi,
    bytecode: Bytecode,
}

impl Artifact {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse contract artifact")
    }

    /// Decoded creation bytecode; artifacts of interfaces and abstract contracts have none
    pub fn bytecode(&self) -> Result<Bytes> {
        let code = self.bytecode.as_hex();
        let code = code.strip_prefix("0x").unwrap_or(code);
        ensure!(!code.is_empty(), "Artifact has no creation bytecode");
        ensure!(
            !code.contains("__"),
            "Bytecode has unlinked library references"
        );

        let bytes = hex::decode(code).map_err(|e| eyre!("Invalid bytecode hex: {}", e))?;
        Ok(bytes.into())
    }
}

/// Artifacts of one deployment, keyed by contract name
pub type Artifacts = HashMap<String, Artifact>;

/// Build-artifacts directory
///
/// Hardhat-style flat files (`<dir>/<Name>.json`) are looked up first, then the
/// Foundry layout (`<dir>/<Name>.sol/<Name>.json`).
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a contract's artifact file
    pub fn path(&self, contract_name: &str) -> Result<PathBuf> {
        let flat = self.dir.join(format!("{contract_name}.json"));
        let foundry = self
            .dir
            .join(format!("{contract_name}.sol"))
            .join(format!("{contract_name}.json"));

        [flat, foundry]
            .into_iter()
            .find(|path| path.is_file())
            .ok_or_else(|| {
                eyre!(
                    "No artifact for {} in {}",
                    contract_name,
                    self.dir.display()
                )
            })
    }

    pub fn load(&self, contract_name: &str) -> Result<Artifact> {
        let path = self.path(contract_name)?;
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Artifact::from_json(&json).with_context(|| format!("Invalid artifact {}", path.display()))
    }

    /// Load every named artifact, failing on the first missing or invalid one
    pub fn load_all<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<Artifacts> {
        names
            .into_iter()
            .map(|name| Ok((name.to_string(), self.load(name)?)))
            .collect()
    }
}
