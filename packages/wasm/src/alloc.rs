//! Guest buffer allocation
//!
//! Buffers inside linear memory are requested from and returned to the
//! guest's own allocator. A [`GuestBuffer`] is move-only, so a buffer can be
//! freed at most once; [`ScopedBuffer`] makes sure it is freed at least once.

use crate::error::{CodecError, CodecResult};
use crate::instance::CodecInstance;
use std::ops::{Deref, DerefMut};

/// A (pointer, length) region of guest linear memory owned by the host.
///
/// A zero pointer or zero length denotes "no buffer".
#[must_use = "guest buffers leak unless freed"]
#[derive(Debug, PartialEq, Eq)]
pub struct GuestBuffer {
    ptr: u32,
    len: u32,
}

impl GuestBuffer {
    /// Take ownership of a region the guest handed over
    pub fn from_raw_parts(ptr: u32, len: u32) -> Self {
        Self { ptr, len }
    }

    pub fn null() -> Self {
        Self { ptr: 0, len: 0 }
    }

    pub fn ptr(&self) -> u32 {
        self.ptr
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether freeing this buffer is a no-op
    pub fn is_null(&self) -> bool {
        self.ptr == 0 || self.len == 0
    }
}

impl CodecInstance {
    /// Allocate `size` bytes inside the guest
    pub fn allocate(&mut self, size: u32) -> CodecResult<GuestBuffer> {
        if size == 0 {
            return Err(CodecError::invalid_argument(
                "refusing to allocate an empty guest buffer",
            ));
        }

        let ptr = self
            .runtime
            .allocate
            .call(&mut self.store, size)
            .map_err(|e| CodecError::trap(&self.names.allocate, e))?;

        if ptr == 0 {
            let message = self.failure_message();
            return Err(CodecError::Allocation { size, message });
        }

        Ok(GuestBuffer { ptr, len: size })
    }

    /// Return a buffer to the guest allocator
    ///
    /// Null buffers are accepted and ignored. A rejected free drains the
    /// guest's error slot into the returned error.
    pub fn free(&mut self, buffer: GuestBuffer) -> CodecResult<()> {
        if buffer.is_null() {
            return Ok(());
        }

        if !self.release_raw(&buffer)? {
            let message = self.failure_message();
            return Err(CodecError::Deallocation {
                ptr: buffer.ptr,
                size: buffer.len,
                message,
            });
        }
        Ok(())
    }

    /// Call the guest `free` without consulting the error slot.
    ///
    /// Returns whether the guest accepted the buffer.
    pub(crate) fn release_raw(&mut self, buffer: &GuestBuffer) -> CodecResult<bool> {
        let ok = self
            .runtime
            .free
            .call(&mut self.store, (buffer.ptr, buffer.len))
            .map_err(|e| CodecError::trap(&self.names.free, e))?;
        Ok(ok != 0)
    }

    /// Allocate a buffer that is freed when the returned guard goes away
    pub fn allocate_scoped(&mut self, size: u32) -> CodecResult<ScopedBuffer<'_>> {
        let buffer = self.allocate(size)?;
        Ok(ScopedBuffer::new(self, buffer))
    }

    /// Put an already owned buffer under a release guard
    pub fn adopt(&mut self, buffer: GuestBuffer) -> ScopedBuffer<'_> {
        ScopedBuffer::new(self, buffer)
    }
}

/// A guest buffer tied to the instance that must free it.
///
/// Call [`release`](Self::release) on the normal path to observe free
/// failures. If the guard is dropped instead (early return, `?`, panic), the
/// buffer is still freed and a failure is logged.
///
/// The guard dereferences to the instance so further guest calls can be made
/// while the buffer is live.
pub struct ScopedBuffer<'a> {
    instance: &'a mut CodecInstance,
    buffer: Option<GuestBuffer>,
}

impl<'a> ScopedBuffer<'a> {
    fn new(instance: &'a mut CodecInstance, buffer: GuestBuffer) -> Self {
        Self {
            instance,
            buffer: Some(buffer),
        }
    }

    pub fn ptr(&self) -> u32 {
        self.buffer.as_ref().map_or(0, GuestBuffer::ptr)
    }

    pub fn len(&self) -> u32 {
        self.buffer.as_ref().map_or(0, GuestBuffer::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the whole buffer out of guest memory
    pub fn read_all(&self) -> CodecResult<Vec<u8>> {
        self.instance.read(self.ptr(), self.len())
    }

    /// Free the buffer now
    pub fn release(mut self) -> CodecResult<()> {
        match self.buffer.take() {
            Some(buffer) => self.instance.free(buffer),
            None => Ok(()),
        }
    }
}

impl Deref for ScopedBuffer<'_> {
    type Target = CodecInstance;

    fn deref(&self) -> &CodecInstance {
        self.instance
    }
}

impl DerefMut for ScopedBuffer<'_> {
    fn deref_mut(&mut self) -> &mut CodecInstance {
        self.instance
    }
}

impl Drop for ScopedBuffer<'_> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            let (ptr, len) = (buffer.ptr, buffer.len);
            if let Err(e) = self.instance.free(buffer) {
                tracing::warn!("Failed to free guest buffer {:#x}+{}: {}", ptr, len, e);
            }
        }
    }
}

impl std::fmt::Debug for ScopedBuffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedBuffer")
            .field("buffer", &self.buffer)
            .finish()
    }
}
