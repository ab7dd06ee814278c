//! Loading of compiled contract artifacts and construction of init code

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::JsonAbi,
};
use alloy_primitives::{hex, keccak256, Bytes, B256};
use itertools::Itertools;
use serde::Deserialize;

use crate::{
    constants::{ARTIFACT_EXTENSION, BUILD_INFO_DIR, LIBRARY_PLACEHOLDER_MARKER},
    errors::ScriptError,
};

/// A compiled contract, ready to be deployed
#[derive(Debug, Clone)]
pub struct Artifact {
    /// The name of the contract
    pub contract_name: String,
    /// The contract ABI
    pub abi: JsonAbi,
    /// The creation bytecode, without constructor arguments
    pub bytecode: Bytes,
}

/// The subset of a Hardhat or Foundry artifact that deployment needs
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    /// Present in Hardhat artifacts only
    #[serde(default)]
    contract_name: Option<String>,
    /// The contract ABI
    abi: JsonAbi,
    /// The creation bytecode
    bytecode: RawBytecode,
}

/// Hardhat stores the bytecode as a hex string, Foundry nests it under `object`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    /// Hardhat layout
    Hex(String),
    /// Foundry layout
    Object {
        /// The hex-encoded bytecode
        object: String,
    },
}

impl RawBytecode {
    /// The hex-encoded bytecode
    fn as_hex(&self) -> &str {
        match self {
            RawBytecode::Hex(hex) => hex,
            RawBytecode::Object { object } => object,
        }
    }
}

impl Artifact {
    /// Find and load the artifact for the given contract under the artifacts directory
    pub fn load(artifacts_dir: &Path, contract_name: &str) -> Result<Self, ScriptError> {
        let path = find_artifact_path(artifacts_dir, contract_name)?;
        let contents = fs::read_to_string(&path)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e)))?;

        Self::from_json(contract_name, &contents)
    }

    /// Parse an artifact from its JSON representation
    pub fn from_json(contract_name: &str, contents: &str) -> Result<Self, ScriptError> {
        let raw: RawArtifact = serde_json::from_str(contents)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", contract_name, e)))?;

        if let Some(name) = raw.contract_name.as_deref() {
            if name != contract_name {
                return Err(ScriptError::ArtifactParsing(format!(
                    "expected artifact for `{}`, found `{}`",
                    contract_name, name
                )));
            }
        }

        let bytecode_hex = raw.bytecode.as_hex();
        if bytecode_hex.contains(LIBRARY_PLACEHOLDER_MARKER) {
            return Err(ScriptError::ArtifactParsing(format!(
                "`{}` has unlinked library references",
                contract_name
            )));
        }

        let bytecode = hex::decode(bytecode_hex)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", contract_name, e)))?;
        if bytecode.is_empty() {
            return Err(ScriptError::ArtifactParsing(format!(
                "`{}` has no creation bytecode, is it abstract or an interface?",
                contract_name
            )));
        }

        Ok(Self {
            contract_name: contract_name.to_string(),
            abi: raw.abi,
            bytecode: Bytes::from(bytecode),
        })
    }

    /// ABI-encode constructor arguments, checking them against the constructor's signature
    pub fn encode_constructor_args(&self, args: &[DynSolValue]) -> Result<Vec<u8>, ScriptError> {
        match &self.abi.constructor {
            Some(constructor) => constructor.abi_encode_input(args).map_err(|e| {
                ScriptError::CalldataConstruction(format!(
                    "`{}` constructor: {}",
                    self.contract_name, e
                ))
            }),
            None if args.is_empty() => Ok(Vec::new()),
            None => Err(ScriptError::CalldataConstruction(format!(
                "`{}` has no constructor but {} arguments were given",
                self.contract_name,
                args.len()
            ))),
        }
    }

    /// The creation bytecode followed by the encoded constructor arguments
    pub fn init_code(&self, args: &[DynSolValue]) -> Result<Bytes, ScriptError> {
        let encoded_args = self.encode_constructor_args(args)?;
        Ok([&self.bytecode[..], encoded_args.as_slice()].concat().into())
    }
}

/// The hash identifying a deployment's init code
pub fn init_code_hash(init_code: &[u8]) -> B256 {
    keccak256(init_code)
}

/// Recursively search the artifacts directory for `<contract_name>.json`
pub fn find_artifact_path(
    artifacts_dir: &Path,
    contract_name: &str,
) -> Result<PathBuf, ScriptError> {
    let file_name = format!("{}.{}", contract_name, ARTIFACT_EXTENSION);
    let mut matches = Vec::new();
    collect_matches(artifacts_dir, &file_name, &mut matches)?;
    matches.sort();

    match matches.len() {
        0 => Err(ScriptError::ArtifactNotFound(format!(
            "no `{}` under {}",
            file_name,
            artifacts_dir.display()
        ))),
        1 => Ok(matches.remove(0)),
        _ => Err(ScriptError::ArtifactParsing(format!(
            "ambiguous artifact for `{}`: {}",
            contract_name,
            matches.iter().map(|p| p.display()).join(", ")
        ))),
    }
}

/// Walk `dir`, pushing every file named `file_name` into `matches`
fn collect_matches(
    dir: &Path,
    file_name: &str,
    matches: &mut Vec<PathBuf>,
) -> Result<(), ScriptError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| ScriptError::ArtifactNotFound(format!("{}: {}", dir.display(), e)))?;

    for entry in entries {
        let entry = entry.map_err(|e| ScriptError::ArtifactNotFound(e.to_string()))?;
        // Symlinks are not followed, so link cycles cannot recurse forever
        let file_type = entry
            .file_type()
            .map_err(|e| ScriptError::ArtifactNotFound(e.to_string()))?;
        let path = entry.path();

        if file_type.is_dir() {
            if path.file_name().is_some_and(|name| name == BUILD_INFO_DIR) {
                continue;
            }
            collect_matches(&path, file_name, matches)?;
        } else if path.file_name().is_some_and(|name| name == file_name) {
            matches.push(path);
        }
    }

    Ok(())
}
