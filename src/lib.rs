//! # sohook
//! Runtime PLT/GOT symbol interposition through the dynamic linker's relocation tables.
//!
//! The dynamic linker keeps a private per-module record (`soinfo`) describing the
//! module's symbol table, string table and relocation tables. `sohook` walks every
//! loaded module, recovers that record despite its layout having drifted across
//! platform releases, finds the relocation entries that bind a requested symbol
//! name, and atomically rewrites the resolved slot so that calls through it land in
//! a caller-supplied replacement. The previous slot value is handed back to the
//! caller so the replacement can still invoke the original.
//!
//! Only table-driven indirections (PLT jump slots and GOT/absolute data slots) are
//! patched; there is no disassembly, no inline hooking and no un-hooking. A symbol
//! that cannot be found or patched in a module is silently skipped for that module.
//!
//! ## Example
//! ```no_run
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use sohook::Hooker;
//!
//! static ORIG_GETPID: AtomicUsize = AtomicUsize::new(0);
//!
//! unsafe extern "C" fn fake_getpid() -> i32 {
//!     42
//! }
//!
//! let mut hooker = Hooker::new();
//! hooker.register("getpid", &ORIG_GETPID, fake_getpid as usize);
//! unsafe { hooker.install() };
//! if ORIG_GETPID.load(Ordering::Relaxed) == 0 {
//!     // the hook was not installed in any module
//! }
//! ```
#[cfg(not(unix))]
compile_error!("sohook requires a unix-like dynamic linker");

#[cfg(not(any(
    target_arch = "x86_64",
    target_arch = "aarch64",
    target_arch = "x86",
    target_arch = "arm",
)))]
compile_error!("unsupport arch");

pub mod arch;
mod diag;
mod error;
mod hook;
pub mod maps;
mod patch;
mod reloc;
mod scan;
mod soinfo;
mod symbol;

pub use diag::set_log_tag;
pub use error::{Error, Result};
pub use hook::{HookRequest, Hooker};
pub use maps::{Module, modules};
