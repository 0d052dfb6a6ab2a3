//! Codec instance management
//!
//! Handles an instantiated codec module and its resolved exports.
//!
//! A `CodecInstance` owns the guest's linear memory and error slot. Neither
//! is synchronised: every guest-facing operation takes `&mut self`, and
//! callers that share an instance across threads must serialise access
//! themselves (one instance per worker, or a lock around it).

use crate::abi::{CodecFunc, ExportNames};
use crate::engine::CodecEngine;
use crate::error::{CodecError, CodecResult};
use crate::memory::GuestMemory;
use crate::module::CodecModule;
use std::collections::HashMap;
use wasmtime::{Instance, Store, StoreLimits, StoreLimitsBuilder, TypedFunc, WasmParams, WasmResults};

/// Per-store host state
pub struct StoreState {
    limits: StoreLimits,
}

/// Allocator and error-slot functions resolved from the guest
pub(crate) struct RuntimeExports {
    pub(crate) allocate: TypedFunc<u32, u32>,
    pub(crate) free: TypedFunc<(u32, u32), u32>,
    pub(crate) get_last_error: TypedFunc<(), (u32, u32)>,
    pub(crate) clear_last_error: TypedFunc<(), u32>,
}

/// An instantiated codec module ready for calls
pub struct CodecInstance {
    pub(crate) store: Store<StoreState>,
    pub(crate) memory: GuestMemory,
    pub(crate) runtime: RuntimeExports,
    /// parse/build functions keyed by unprefixed name
    pub(crate) codec: HashMap<String, CodecFunc>,
    pub(crate) names: ExportNames,
    module_hash: String,
}

impl CodecInstance {
    /// Instantiate a module with an empty import set and resolve its exports
    pub fn new(engine: &CodecEngine, module: &CodecModule) -> CodecResult<Self> {
        let config = engine.config();
        let names = config.exports.clone();

        let mut limits = StoreLimitsBuilder::new();
        if let Some(max_memory) = config.max_memory_bytes {
            limits = limits.memory_size(max_memory);
        }
        let mut store = Store::new(
            engine.engine(),
            StoreState {
                limits: limits.build(),
            },
        );
        store.limiter(|state| &mut state.limits);

        let instance = Instance::new(&mut store, module.module(), &[]).map_err(|e| {
            CodecError::instantiation(format!("Failed to instantiate codec module: {:#}", e))
        })?;

        // Call _initialize if exported (reactor-style builds)
        if let Ok(init) = instance.get_typed_func::<(), ()>(&mut store, "_initialize") {
            init.call(&mut store, ()).map_err(|e| {
                CodecError::instantiation(format!("Failed to call _initialize: {:#}", e))
            })?;
        }

        let memory = instance
            .get_memory(&mut store, &names.memory)
            .ok_or_else(|| CodecError::missing_export(&names.memory))?;

        let runtime = RuntimeExports {
            allocate: resolve(&instance, &mut store, &names.allocate)?,
            free: resolve(&instance, &mut store, &names.free)?,
            get_last_error: resolve(&instance, &mut store, &names.get_last_error)?,
            clear_last_error: resolve(&instance, &mut store, &names.clear_last_error)?,
        };

        let mut codec = HashMap::new();
        for function in ExportNames::codec_functions() {
            let func = resolve(&instance, &mut store, &names.codec_export(&function))?;
            codec.insert(function, func);
        }

        tracing::debug!(
            "Instantiated codec module {} ({} bytes of linear memory)",
            module.hash(),
            memory.data_size(&store)
        );

        Ok(Self {
            store,
            memory: GuestMemory::new(memory),
            runtime,
            codec,
            names,
            module_hash: module.hash().to_string(),
        })
    }

    /// Get memory size in bytes
    ///
    /// Guest memory only grows, so this never decreases over the lifetime of
    /// the instance.
    pub fn memory_size(&self) -> usize {
        self.memory.size(&self.store)
    }

    /// Copy `len` bytes out of guest memory
    pub fn read(&self, ptr: u32, len: u32) -> CodecResult<Vec<u8>> {
        self.memory.read(&self.store, ptr, len)
    }

    /// Copy `bytes` into guest memory at `ptr`
    pub fn write(&mut self, bytes: &[u8], ptr: u32) -> CodecResult<()> {
        self.memory.write(&mut self.store, ptr, bytes)
    }

    /// blake3 hash of the module this instance was created from
    pub fn module_hash(&self) -> &str {
        &self.module_hash
    }

    pub fn export_names(&self) -> &ExportNames {
        &self.names
    }
}

fn resolve<Params, Results>(
    instance: &Instance,
    store: &mut Store<StoreState>,
    export_name: &str,
) -> CodecResult<TypedFunc<Params, Results>>
where
    Params: WasmParams,
    Results: WasmResults,
{
    if instance.get_export(&mut *store, export_name).is_none() {
        return Err(CodecError::missing_export(export_name));
    }
    instance
        .get_typed_func::<Params, Results>(&mut *store, export_name)
        .map_err(|e| {
            CodecError::instantiation(format!(
                "Invalid export signature for {}: {:#}",
                export_name, e
            ))
        })
}

impl std::fmt::Debug for CodecInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecInstance")
            .field("module_hash", &self.module_hash)
            .field("memory_size", &self.memory_size())
            .field("call_prefix", &self.names.call_prefix)
            .finish()
    }
}
