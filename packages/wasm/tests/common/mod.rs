//! Test guest implementing the codec export contract
//!
//! - `malloc` is a bump allocator that grows memory on demand and reclaims
//!   the top allocation on `free` (the call protocol frees in LIFO order).
//! - `free` fails for null pointers and pointers above the heap top, which
//!   catches double frees, and reports the failure through the error slot.
//! - `parse_<kind>` / `build_<kind>` echo their input. Input starting with
//!   `0xC1` fails through the error slot; input starting with `0xC0` traps.

#![allow(dead_code)]

use phi_save_codec_wasm::{CodecConfig, CodecEngine, CodecInstance, SaveCodec};

pub const MALFORMED: u8 = 0xC1;
pub const TRAP: u8 = 0xC0;

pub const PARSE_ERROR: &str = "parse error: malformed input";
pub const OUT_OF_MEMORY: &str = "out of memory";
pub const BOOT_FAILURE: &str = "boot failure";
pub const INVALID_FREE: &str = "invalid free";

const KINDS: [&str; 6] = [
    "user",
    "summary",
    "game_record",
    "game_progress",
    "game_key",
    "settings",
];

const GUEST_CORE: &str = r#"
  (memory (export "memory") 1)
  (global $heap (mut i32) (i32.const 4096))
  (global $err_ptr (mut i32) (i32.const 0))
  (global $err_len (mut i32) (i32.const 0))
  (global $silent i32 (i32.const 0))
  (global $corrupt_error_ptr i32 (i32.const 0))

  (data (i32.const 1024) "invalid length")
  (data (i32.const 1088) "parse error: malformed input")
  (data (i32.const 1152) "out of memory")
  (data (i32.const 1216) "empty or invalid input")
  (data (i32.const 1280) "boot failure")
  (data (i32.const 1344) "invalid free")

  (func $set_error (param $ptr i32) (param $len i32)
    (if (global.get $silent) (then (return)))
    (global.set $err_ptr (local.get $ptr))
    (global.set $err_len (local.get $len)))

  (func $align (param $n i32) (result i32)
    (i32.and (i32.add (local.get $n) (i32.const 7)) (i32.const -8)))

  (func $boot
    (call $set_error (i32.const 1280) (i32.const 12)))

  (func $malloc (export "malloc") (param $size i32) (result i32)
    (local $ptr i32) (local $end i32) (local $have i32)
    (if (i32.eqz (local.get $size))
      (then
        (call $set_error (i32.const 1024) (i32.const 14))
        (return (i32.const 0))))
    (local.set $ptr (global.get $heap))
    (local.set $end (i32.add (local.get $ptr) (call $align (local.get $size))))
    (if (i32.lt_u (local.get $end) (local.get $ptr))
      (then
        (call $set_error (i32.const 1152) (i32.const 13))
        (return (i32.const 0))))
    (local.set $have (i32.mul (memory.size) (i32.const 65536)))
    (if (i32.gt_u (local.get $end) (local.get $have))
      (then
        (if (i32.eq
              (memory.grow
                (i32.shr_u
                  (i32.add (i32.sub (local.get $end) (local.get $have)) (i32.const 65535))
                  (i32.const 16)))
              (i32.const -1))
          (then
            (call $set_error (i32.const 1152) (i32.const 13))
            (return (i32.const 0))))))
    (global.set $heap (local.get $end))
    (local.get $ptr))

  (func (export "free") (param $ptr i32) (param $size i32) (result i32)
    (if (i32.or (i32.eqz (local.get $ptr)) (i32.ge_u (local.get $ptr) (global.get $heap)))
      (then
        (call $set_error (i32.const 1344) (i32.const 12))
        (return (i32.const 0))))
    (if (i32.eq (i32.add (local.get $ptr) (call $align (local.get $size))) (global.get $heap))
      (then (global.set $heap (local.get $ptr))))
    (i32.const 1))

  (func (export "get_last_error") (result i32 i32)
    (local $ptr i32)
    (if (i32.eqz (global.get $err_len))
      (then (return (i32.const 0) (i32.const 0))))
    (if (global.get $corrupt_error_ptr)
      (then (return (global.get $err_len) (i32.const -16))))
    (local.set $ptr (call $malloc (global.get $err_len)))
    (if (i32.eqz (local.get $ptr))
      (then (return (global.get $err_len) (i32.const 0))))
    (memory.copy (local.get $ptr) (global.get $err_ptr) (global.get $err_len))
    (global.get $err_len)
    (local.get $ptr))

  (func (export "clear_last_error") (result i32)
    (if (i32.eqz (global.get $err_len))
      (then (return (i32.const 0))))
    (global.set $err_len (i32.const 0))
    (i32.const 1))

  (func $echo (param $ptr i32) (param $len i32) (result i32 i32)
    (local $out i32)
    (if (i32.eqz (local.get $len))
      (then
        (call $set_error (i32.const 1216) (i32.const 22))
        (return (i32.const 0) (i32.const 0))))
    (if (i32.eq (i32.load8_u (local.get $ptr)) (i32.const 0xC0))
      (then unreachable))
    (if (i32.eq (i32.load8_u (local.get $ptr)) (i32.const 0xC1))
      (then
        (call $set_error (i32.const 1088) (i32.const 28))
        (return (i32.const 0) (i32.const 0))))
    (local.set $out (call $malloc (local.get $len)))
    (if (i32.eqz (local.get $out))
      (then (return (i32.const 0) (i32.const 0))))
    (memory.copy (local.get $out) (local.get $ptr) (local.get $len))
    (local.get $len)
    (local.get $out))
"#;

/// Variations of the test guest
#[derive(Debug, Clone, Copy, Default)]
pub struct Guest {
    /// Prepended to every `parse_<kind>` / `build_<kind>` export
    pub prefix: &'static str,
    /// Leave "boot failure" pending after instantiation
    pub boot_error: bool,
    /// Fail without ever setting the error slot
    pub silent: bool,
    /// `get_last_error` hands out a pointer past the end of memory
    pub corrupt_error_ptr: bool,
}

impl Guest {
    pub fn wat(&self) -> String {
        let mut core = GUEST_CORE.to_string();
        if self.silent {
            core = core.replace(
                "(global $silent i32 (i32.const 0))",
                "(global $silent i32 (i32.const 1))",
            );
        }
        if self.corrupt_error_ptr {
            core = core.replace(
                "(global $corrupt_error_ptr i32 (i32.const 0))",
                "(global $corrupt_error_ptr i32 (i32.const 1))",
            );
        }

        let mut wat = String::from("(module\n");
        wat.push_str(&core);
        for kind in KINDS {
            for op in ["parse", "build"] {
                wat.push_str(&format!(
                    "  (func (export \"{}{op}_{kind}\") (param i32 i32) (result i32 i32)\n    \
                     (call $echo (local.get 0) (local.get 1)))\n",
                    self.prefix
                ));
            }
        }
        if self.boot_error {
            wat.push_str("  (start $boot)\n");
        }
        wat.push_str(")\n");
        wat
    }

    pub fn bytes(&self) -> Vec<u8> {
        wat::parse_str(self.wat()).expect("test guest should assemble")
    }

    pub fn open(&self, config: CodecConfig) -> CodecInstance {
        CodecEngine::new(config)
            .expect("Failed to create engine")
            .open(self.bytes())
            .expect("Failed to open test guest")
    }
}

/// Guest source with every codec export named `<prefix>parse_<kind>` etc.
pub fn guest_wat_with(prefix: &'static str, boot_error: bool) -> String {
    Guest {
        prefix,
        boot_error,
        ..Default::default()
    }
    .wat()
}

pub fn guest_wat() -> String {
    guest_wat_with("", false)
}

pub fn guest_bytes() -> Vec<u8> {
    Guest::default().bytes()
}

pub fn engine() -> CodecEngine {
    CodecEngine::new(CodecConfig::development()).expect("Failed to create engine")
}

pub fn instance() -> CodecInstance {
    engine()
        .open(guest_bytes())
        .expect("Failed to open test guest")
}

pub fn codec() -> SaveCodec {
    SaveCodec::open_with_config(guest_bytes(), &CodecConfig::development())
        .expect("Failed to open test guest")
}
