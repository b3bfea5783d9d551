//! Page-safe atomic patching of a single word.
//!
//! Pages holding relocation slots are read-only once the loader is done with
//! them. Patching briefly raises the containing page's protection to allow the
//! write, swaps the word with one aligned atomic store, and restores the prior
//! protection on every exit path. The page stays readable and executable
//! throughout, so concurrent callers observe either the old or the new target,
//! never a torn value and never a fault.

use crate::diag::hook_log;
use crate::error::{Result, protect_error};
use crate::maps;
use bitflags::bitflags;
use core::ffi::{c_int, c_void};
use core::sync::atomic::{AtomicUsize, Ordering};

bitflags! {
    /// Memory protection flags, matching the `PROT_*` constants.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(crate) struct ProtFlags: c_int {
        /// No access allowed.
        const PROT_NONE = 0;
        /// Allow reading from the memory region.
        const PROT_READ = 1;
        /// Allow writing to the memory region.
        const PROT_WRITE = 2;
        /// Allow executing code in the memory region.
        const PROT_EXEC = 4;
    }
}

fn page_size() -> usize {
    unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize }
}

/// Scoped write access to the page containing one address.
///
/// Construction raises the page protection to additionally allow writing; drop
/// restores the resident protection minus write, so no exit path can leave the
/// page writable or drop permissions the page relied on.
struct WriteGuard {
    page: *mut c_void,
    len: usize,
    restore: ProtFlags,
}

impl WriteGuard {
    unsafe fn new(addr: usize) -> Result<Self> {
        let pagesize = page_size();
        let page = (addr & !(pagesize - 1)) as *mut c_void;
        // the slot lives in a data segment; when the region cannot be found in
        // the maps listing, fall back to a plain read-only restore
        let resident = maps::protection_at(addr).unwrap_or(ProtFlags::PROT_READ);
        let writable = resident | ProtFlags::PROT_READ | ProtFlags::PROT_WRITE;
        if unsafe { libc::mprotect(page, pagesize, writable.bits()) } != 0 {
            return Err(protect_error(format!(
                "mprotect({page:p}, {pagesize}, {writable:?}) failed"
            )));
        }
        Ok(WriteGuard {
            page,
            len: pagesize,
            restore: (resident | ProtFlags::PROT_READ) - ProtFlags::PROT_WRITE,
        })
    }
}

impl Drop for WriteGuard {
    fn drop(&mut self) {
        if unsafe { libc::mprotect(self.page, self.len, self.restore.bits()) } != 0 {
            hook_log!("cannot restore protection of page {:p}", self.page);
        }
    }
}

/// Atomically replace the word at `addr` with `new`, returning the previous
/// value.
///
/// # Safety
/// `addr` must be a mapped, pointer-aligned word. The caller is responsible for
/// it being a relocation slot whose rewrite is meaningful.
pub(crate) unsafe fn patch_address(addr: usize, new: usize) -> Result<usize> {
    let _guard = unsafe { WriteGuard::new(addr)? };
    let slot = unsafe { AtomicUsize::from_ptr(addr as *mut usize) };
    Ok(slot.swap(new, Ordering::SeqCst))
}
