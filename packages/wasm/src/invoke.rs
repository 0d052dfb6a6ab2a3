//! Call protocol for guest codec functions
//!
//! allocate input → write → call → read output → free output → free input.
//! The input buffer is released exactly once whichever way the call ends.

use crate::abi::CodecFunc;
use crate::alloc::GuestBuffer;
use crate::error::{CodecError, CodecResult};
use crate::instance::CodecInstance;

impl CodecInstance {
    /// Run the guest codec function `function` (without call prefix) on `input`
    pub fn invoke(&mut self, function: &str, input: &[u8]) -> CodecResult<Vec<u8>> {
        let export = self.names.codec_export(function);
        let func = self
            .codec
            .get(function)
            .cloned()
            .ok_or_else(|| CodecError::missing_export(&export))?;

        let size = u32::try_from(input.len()).map_err(|_| {
            CodecError::invalid_argument(format!(
                "input of {} bytes does not fit in guest memory",
                input.len()
            ))
        })?;

        let mut input_buffer = self.allocate_scoped(size)?;
        let ptr = input_buffer.ptr();
        let result = input_buffer.exchange(&export, &func, ptr, input);

        // Freed only after the guest call has returned
        let released = input_buffer.release();

        match (result, released) {
            (Ok(output), Ok(())) => {
                tracing::debug!(
                    "Invoked {}: {} bytes in, {} bytes out",
                    export,
                    input.len(),
                    output.len()
                );
                Ok(output)
            }
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(release_error)) => {
                tracing::warn!(
                    "Failed to free input buffer of {} after error: {}",
                    export,
                    release_error
                );
                Err(e)
            }
        }
    }

    fn exchange(
        &mut self,
        export: &str,
        func: &CodecFunc,
        ptr: u32,
        input: &[u8],
    ) -> CodecResult<Vec<u8>> {
        self.write(input, ptr)?;

        let (out_len, out_ptr) = func
            .call(&mut self.store, (ptr, input.len() as u32))
            .map_err(|e| CodecError::trap(export, e))?;

        if out_ptr == 0 {
            let message = self.failure_message();
            return Err(CodecError::invocation(export, message));
        }

        let output = self.adopt(GuestBuffer::from_raw_parts(out_ptr, out_len));
        let bytes = output.read_all()?;
        output.release()?;
        Ok(bytes)
    }
}
