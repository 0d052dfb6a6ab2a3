//! Memory utilities for guest interactions
//!
//! Provides bounds-checked reads and writes on the guest's linear memory.

use crate::error::{CodecError, CodecResult};
use wasmtime::{AsContext, AsContextMut, Memory};

/// Accessor for the guest's exported linear memory.
///
/// Only the `Memory` handle is kept. The backing slice is looked up from the
/// store on every access because any guest call may grow (and move) it.
#[derive(Debug, Clone, Copy)]
pub struct GuestMemory {
    memory: Memory,
}

impl GuestMemory {
    pub fn new(memory: Memory) -> Self {
        Self { memory }
    }

    /// Current memory size in bytes
    pub fn size(&self, store: &impl AsContext) -> usize {
        self.memory.data_size(store)
    }

    /// Copy `len` bytes starting at `ptr` out of guest memory
    pub fn read(&self, store: &impl AsContext, ptr: u32, len: u32) -> CodecResult<Vec<u8>> {
        let data = self.memory.data(store);
        let range = checked_range(ptr, len as usize, data.len())?;
        Ok(data[range].to_vec())
    }

    /// Copy `bytes` into guest memory starting at `ptr`
    pub fn write(&self, store: &mut impl AsContextMut, ptr: u32, bytes: &[u8]) -> CodecResult<()> {
        let data = self.memory.data_mut(store);
        let range = checked_range(ptr, bytes.len(), data.len())?;
        data[range].copy_from_slice(bytes);
        Ok(())
    }
}

fn checked_range(ptr: u32, len: usize, memory_size: usize) -> CodecResult<std::ops::Range<usize>> {
    let start = ptr as usize;
    match start.checked_add(len) {
        Some(end) if end <= memory_size => Ok(start..end),
        _ => Err(CodecError::OutOfBounds {
            ptr,
            len,
            memory_size,
        }),
    }
}
