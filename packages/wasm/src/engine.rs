//! Engine configuration and management
//!
//! The engine is the compilation unit shared by every codec instance opened
//! through it.

use crate::abi::ExportNames;
use crate::error::{CodecError, CodecResult};
use crate::instance::CodecInstance;
use crate::module::{CodecModule, ModuleSource};
use serde::{Deserialize, Serialize};
use std::path::Path;
use wasmtime::{Config, Engine, OptLevel};

/// Default guest memory cap: 256MB
pub const DEFAULT_MAX_MEMORY: usize = 256 * 1024 * 1024;

/// Configuration for loading and running the codec guest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Enable cranelift optimizations
    pub optimize: bool,
    /// Upper bound for guest linear memory in bytes (None = unbounded)
    pub max_memory_bytes: Option<usize>,
    /// Export names of the guest ABI
    pub exports: ExportNames,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            optimize: true,
            max_memory_bytes: Some(DEFAULT_MAX_MEMORY),
            exports: ExportNames::default(),
        }
    }
}

impl CodecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Development configuration (faster compilation, no memory cap)
    pub fn development() -> Self {
        Self {
            optimize: false,
            max_memory_bytes: None,
            exports: ExportNames::default(),
        }
    }

    /// Production configuration (optimized, default memory cap)
    pub fn production() -> Self {
        Self::default()
    }

    pub fn with_max_memory(mut self, bytes: usize) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    pub fn with_call_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.exports.call_prefix = prefix.into();
        self
    }

    pub fn from_toml(content: &str) -> CodecResult<Self> {
        toml::from_str(content).map_err(|e| CodecError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> CodecResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Overlay `PHI_CODEC_*` environment variables on the defaults
    pub fn from_env() -> CodecResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CodecResult<Self> {
        let mut config = Self::default();

        if let Some(value) = lookup("PHI_CODEC_OPTIMIZE") {
            config.optimize = value == "true" || value == "1";
        }

        if let Some(value) = lookup("PHI_CODEC_MAX_MEMORY") {
            config.max_memory_bytes = match value.as_str() {
                "" | "none" => None,
                bytes => Some(bytes.parse().map_err(|_| {
                    CodecError::Config(format!("Invalid value for PHI_CODEC_MAX_MEMORY: {bytes}"))
                })?),
            };
        }

        if let Some(prefix) = lookup("PHI_CODEC_CALL_PREFIX") {
            config.exports.call_prefix = prefix;
        }

        Ok(config)
    }

    /// Build wasmtime Config from our config
    fn to_wasmtime_config(&self) -> Config {
        let mut config = Config::new();
        config.cranelift_opt_level(if self.optimize {
            OptLevel::Speed
        } else {
            OptLevel::None
        });
        config.wasm_multi_value(true);
        config
    }
}

/// Compiles codec modules and opens instances of them
pub struct CodecEngine {
    engine: Engine,
    config: CodecConfig,
}

impl CodecEngine {
    pub fn new(config: CodecConfig) -> CodecResult<Self> {
        let engine = Engine::new(&config.to_wasmtime_config()).map_err(|e| {
            CodecError::instantiation(format!("Failed to create wasmtime engine: {}", e))
        })?;

        Ok(Self { engine, config })
    }

    pub fn default_engine() -> CodecResult<Self> {
        Self::new(CodecConfig::default())
    }

    /// Get reference to wasmtime engine
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Compile and validate a module from bytes
    pub fn load_module(&self, bytes: &[u8]) -> CodecResult<CodecModule> {
        CodecModule::from_bytes(self, bytes)
    }

    /// Compile and validate a module from file
    pub fn load_module_from_file(&self, path: impl AsRef<Path>) -> CodecResult<CodecModule> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            CodecError::instantiation_with_source(
                format!("Failed to read module {}", path.display()),
                e,
            )
        })?;
        let module = self.load_module(&bytes)?;
        tracing::info!("Loaded codec module: {}", path.display());
        Ok(module)
    }

    /// Instantiate an already compiled module
    pub fn instantiate(&self, module: &CodecModule) -> CodecResult<CodecInstance> {
        CodecInstance::new(self, module)
    }

    /// Load and instantiate in one step
    pub fn open(&self, source: impl Into<ModuleSource>) -> CodecResult<CodecInstance> {
        let module = match source.into() {
            ModuleSource::Path(path) => self.load_module_from_file(path)?,
            ModuleSource::Bytes(bytes) => self.load_module(&bytes)?,
        };
        self.instantiate(&module)
    }
}

impl std::fmt::Debug for CodecEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecEngine")
            .field("config", &self.config)
            .finish()
    }
}
