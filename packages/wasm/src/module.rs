//! Codec module management
//!
//! Compiles guest bytes and checks the export surface before anything is
//! instantiated.

use crate::abi::ExportNames;
use crate::engine::CodecEngine;
use crate::error::{CodecError, CodecResult};
use std::path::PathBuf;
use wasmtime::{ExternType, Module};

/// Where to load a codec module from
#[derive(Debug, Clone)]
pub enum ModuleSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl From<PathBuf> for ModuleSource {
    fn from(path: PathBuf) -> Self {
        ModuleSource::Path(path)
    }
}

impl From<&std::path::Path> for ModuleSource {
    fn from(path: &std::path::Path) -> Self {
        ModuleSource::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for ModuleSource {
    fn from(bytes: Vec<u8>) -> Self {
        ModuleSource::Bytes(bytes)
    }
}

impl From<&[u8]> for ModuleSource {
    fn from(bytes: &[u8]) -> Self {
        ModuleSource::Bytes(bytes.to_vec())
    }
}

/// A compiled codec module whose exports match the ABI
pub struct CodecModule {
    module: Module,
    /// blake3 of the module bytes
    hash: String,
}

impl CodecModule {
    /// Compile a module from bytes
    pub fn from_bytes(engine: &CodecEngine, bytes: &[u8]) -> CodecResult<Self> {
        let hash = blake3::hash(bytes).to_hex().to_string();

        let module = Module::new(engine.engine(), bytes).map_err(|e| {
            CodecError::instantiation(format!("Failed to compile codec module: {:#}", e))
        })?;

        Self::validate_exports(&module, &engine.config().exports)?;

        tracing::debug!("Compiled codec module: {}", hash);
        Ok(Self { module, hash })
    }

    /// Validate that module has every required export with the right shape
    fn validate_exports(module: &Module, names: &ExportNames) -> CodecResult<()> {
        match module.get_export(&names.memory) {
            Some(ExternType::Memory(_)) => {}
            Some(other) => {
                return Err(CodecError::instantiation(format!(
                    "Export {} is not a memory: {:?}",
                    names.memory, other
                )))
            }
            None => return Err(CodecError::missing_export(&names.memory)),
        }

        let codec_exports = ExportNames::codec_functions().map(|f| names.codec_export(&f));
        let runtime_exports = names.runtime_exports().map(str::to_string);

        for export_name in runtime_exports.into_iter().chain(codec_exports) {
            let Some(export) = module.get_export(&export_name) else {
                return Err(CodecError::missing_export(export_name));
            };
            if export.func().is_none() {
                return Err(CodecError::instantiation(format!(
                    "Export {} is not a function",
                    export_name
                )));
            }
        }

        // Instantiated with an empty import set
        if let Some(import) = module.imports().next() {
            return Err(CodecError::instantiation(format!(
                "Codec module must not import anything, found {}::{}",
                import.module(),
                import.name()
            )));
        }

        Ok(())
    }

    /// Get the wasmtime module
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Get content hash
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl std::fmt::Debug for CodecModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecModule")
            .field("hash", &self.hash)
            .finish()
    }
}
