//! Access to the guest's single-slot error holder
//!
//! The guest keeps at most one pending message, overwritten by each new
//! failure. Retrieving it hands a freshly allocated copy to the host, which
//! must free it.

use crate::alloc::GuestBuffer;
use crate::error::{CodecError, CodecResult};
use crate::instance::CodecInstance;

impl CodecInstance {
    /// Read the pending guest error without clearing it
    pub fn get_last_error(&mut self) -> CodecResult<Option<String>> {
        let (len, ptr) = self
            .runtime
            .get_last_error
            .call(&mut self.store, ())
            .map_err(|e| CodecError::trap(&self.names.get_last_error, e))?;

        if ptr == 0 {
            if len != 0 {
                tracing::warn!(
                    "Guest reported a {} byte error message without a buffer",
                    len
                );
                return Ok(Some(String::new()));
            }
            return Ok(None);
        }

        // Freed without going back through the error slot, which is what
        // is being read here
        let buffer = GuestBuffer::from_raw_parts(ptr, len);
        let read = self.read(ptr, len);
        let released = if buffer.is_null() {
            Ok(true)
        } else {
            self.release_raw(&buffer)
        };

        let bytes = read?;
        if !released? {
            return Err(CodecError::Deallocation {
                ptr,
                size: len,
                message: String::new(),
            });
        }

        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Drop the pending guest error
    ///
    /// Only valid after [`get_last_error`](Self::get_last_error) reported one.
    pub fn clear_last_error(&mut self) -> CodecResult<()> {
        let cleared = self
            .runtime
            .clear_last_error
            .call(&mut self.store, ())
            .map_err(|e| CodecError::trap(&self.names.clear_last_error, e))?;

        if cleared == 0 {
            return Err(CodecError::NoErrorToClear);
        }
        Ok(())
    }

    /// Read and clear the pending guest error, if any
    pub fn take_last_error(&mut self) -> CodecResult<Option<String>> {
        let message = self.get_last_error()?;
        if message.is_some() {
            self.clear_last_error()?;
        }
        Ok(message)
    }

    /// Message for a failure the guest signalled through a null pointer.
    ///
    /// Problems with the error channel itself end up in the message so the
    /// original failure still reaches the caller.
    pub(crate) fn failure_message(&mut self) -> String {
        match self.take_last_error() {
            Ok(message) => message.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Failed to retrieve guest error message: {}", e);
                format!("<error message unavailable: {}>", e)
            }
        }
    }
}
