//! Resolution of the dynamic linker's per-module bookkeeping record.
//!
//! The linker never exposes this record; worse, its binary layout has drifted
//! across platform releases. Rather than reinterpreting the handle blindly, a
//! small ordered list of candidate layout decoders each validate the record's
//! flags word at their layout-specific offset and only the first candidate that
//! passes range validation gets to expose the fields, as an abstract
//! [`Descriptor`] view. On 32-bit targets a final heuristic probe tolerates the
//! field-ordering drift seen in very old ABI variants.

use crate::reloc::{RelEntry, RelTable};
use crate::symbol::{RawSym, SymbolTable};
use bitflags::bitflags;
use core::mem::offset_of;

bitflags! {
    /// Flag bits of the linker's per-module record.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(crate) struct SoFlags: u32 {
        /// Relocation finished; the module is usable.
        const LINKED = 0x0000_0001;
        /// The module is the main executable.
        const EXE = 0x0000_0004;
        /// The module is the linker itself.
        const LINKER = 0x0000_0010;
        /// The module uses a GNU-style hash table.
        const GNU_HASH = 0x0000_0040;
        /// Marker bit distinguishing the post-rewrite record layouts.
        const NEW_FORMAT = 0x4000_0000;
    }
}

/// Lowest flags value a new-format record can carry.
const NEW_FLAGS_MIN: u32 = SoFlags::NEW_FORMAT.bits() | SoFlags::LINKED.bits();
/// Highest flags value a new-format record can carry, with headroom for flag
/// bits future releases may add.
const NEW_FLAGS_MAX: u32 = SoFlags::all().bits() + 0x1000;
/// Valid flags range for records predating the new-format marker.
const LEGACY_FLAGS_MIN: u32 = SoFlags::LINKED.bits();
const LEGACY_FLAGS_MAX: u32 =
    SoFlags::LINKED.bits() | SoFlags::EXE.bits() | SoFlags::LINKER.bits();

/// Field block shared by every known record layout. Field order is load-bearing:
/// it mirrors the linker's in-memory structure, so most fields exist only to
/// keep the offsets of the ones the resolver reads.
#[allow(unused)]
#[repr(C)]
pub(crate) struct RawCommon {
    pub flags: u32,
    pub strtab: *const u8,
    pub symtab: *const RawSym,
    pub nbucket: usize,
    pub nchain: usize,
    pub bucket: *const u32,
    pub chain: *const u32,
    /// Present but unused in the 64-bit linker.
    #[cfg(target_pointer_width = "64")]
    pub plt_got: *const usize,
    pub plt_rel: *const RelEntry,
    pub plt_rel_count: usize,
    pub rel: *const RelEntry,
    pub rel_count: usize,
    pub preinit_array: *const usize,
    pub preinit_array_count: usize,
    pub init_array: *const usize,
    pub init_array_count: usize,
    pub fini_array: *const usize,
    pub fini_array_count: usize,
    pub init_func: *const (),
    pub fini_func: *const (),
    /// ARM EABI unwind index, only carried by the 32-bit ARM linker.
    #[cfg(target_arch = "arm")]
    pub exidx: *const usize,
    #[cfg(target_arch = "arm")]
    pub exidx_count: usize,
    pub ref_count: usize,
    /// `struct link_map` embedded by value.
    pub link_map_head: [usize; 5],
    pub constructors_called: bool,
    pub load_bias: usize,
    #[cfg(target_pointer_width = "32")]
    pub has_text_relocations: bool,
    pub has_dt_symbolic: bool,
    pub version: u32,
}

/// Identity block preceding the common fields in the post-rewrite layouts.
#[allow(unused)]
#[repr(C)]
pub(crate) struct RawHead {
    pub phdr: *const u8,
    pub phnum: usize,
    pub entry: usize,
    pub base: usize,
    pub size: usize,
    pub dynamic: *const u8,
    pub next: *const (),
}

/// Identity block of the legacy layout, keeping the padding words the old
/// linker reserved.
#[allow(unused)]
#[repr(C)]
pub(crate) struct RawLegacyHead {
    pub phdr: *const u8,
    pub phnum: usize,
    pub entry: usize,
    pub base: usize,
    pub size: usize,
    pub unused1: u32,
    pub dynamic: *const u8,
    pub unused2: u32,
    pub unused3: u32,
    pub next: *const (),
}

/// Newest layout: the linker grew two bookkeeping words ahead of the common
/// block.
#[allow(unused)]
#[repr(C)]
pub(crate) struct RawExtended {
    pub head: RawHead,
    pub reserved: [usize; 2],
    pub common: RawCommon,
}

/// Newer layout, without the embedded name array.
#[allow(unused)]
#[repr(C)]
pub(crate) struct RawCompact {
    pub head: RawHead,
    pub common: RawCommon,
}

/// Length of the name array embedded in the legacy record.
pub(crate) const SOINFO_NAME_LEN: usize = 128;

/// Legacy layout with the module name embedded in the record itself.
#[allow(unused)]
#[repr(C)]
pub(crate) struct RawLegacy {
    pub name: [u8; SOINFO_NAME_LEN],
    pub head: RawLegacyHead,
    pub common: RawCommon,
}

/// Which candidate decoder accepted the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Newest layout with extended pre-common fields.
    Extended,
    /// Newer compact layout.
    Compact,
    /// Legacy layout with the embedded name array.
    Legacy,
    /// Legacy layout found by the drift probe at the given word offset.
    #[cfg(target_pointer_width = "32")]
    Probed(isize),
}

/// Abstract view over a resolved record.
///
/// Borrowed from linker-owned memory; this crate never owns or mutates the
/// record itself, it only computes where the record lives and which layout it
/// follows. The layout choice stays fixed for all scans against the module
/// within one installation pass.
pub(crate) struct Descriptor {
    pub layout: Layout,
    pub flags: u32,
    pub version: u32,
    pub symtab: SymbolTable,
    pub plt_rel: RelTable,
    pub rel: RelTable,
    pub load_bias: usize,
}

/// Resolve the record behind a module handle.
///
/// Tries the three known layouts in newest-to-oldest order, accepting the first
/// whose flags word range-validates; on 32-bit targets a drift probe runs last.
/// Returns `None` when nothing validates; the caller skips the module. Never
/// caches a layout choice across modules.
///
/// # Safety
/// `handle` must be a module handle returned by the dynamic linker for a loaded
/// module, on a platform where that handle addresses the linker's bookkeeping
/// record.
pub(crate) unsafe fn resolve(handle: *const ()) -> Option<Descriptor> {
    let base = handle as *const u8;
    const CANDIDATES: [(Layout, usize); 3] = [
        (Layout::Extended, offset_of!(RawExtended, common)),
        (Layout::Compact, offset_of!(RawCompact, common)),
        (Layout::Legacy, offset_of!(RawLegacy, common)),
    ];
    for (layout, offset) in CANDIDATES {
        let common = unsafe { base.add(offset) }.cast::<RawCommon>();
        let flags = unsafe { (*common).flags };
        if (NEW_FLAGS_MIN..=NEW_FLAGS_MAX).contains(&flags) {
            return Some(unsafe { view(layout, common) });
        }
    }
    #[cfg(target_pointer_width = "32")]
    if let Some(descriptor) = unsafe { probe_legacy_drift(base) } {
        return Some(descriptor);
    }
    None
}

/// Drift probe for pre-new-format 32-bit records: field positions vary slightly
/// between old toolchain builds, so the common block is searched at seven word
/// offsets around its expected position. A candidate is accepted only when its
/// flags fall in the legacy range, string and symbol table pointers share the
/// same nonzero high-order address region, and the hash bucket/chain counts are
/// plausibly small.
#[cfg(target_pointer_width = "32")]
unsafe fn probe_legacy_drift(base: *const u8) -> Option<Descriptor> {
    const PROBE: [isize; 7] = [0, -1, 1, -2, 2, -3, 3];
    const HIGH_REGION: usize = 0xFFF0_0000;
    let anchor = unsafe { base.add(offset_of!(RawLegacy, common)) }.cast::<usize>();
    for step in PROBE {
        let common = unsafe { anchor.offset(step) }.cast::<RawCommon>();
        let candidate = unsafe { &*common };
        let strtab = candidate.strtab as usize;
        let symtab = candidate.symtab as usize;
        if (LEGACY_FLAGS_MIN..=LEGACY_FLAGS_MAX).contains(&candidate.flags)
            && strtab & HIGH_REGION != 0
            && strtab & HIGH_REGION == symtab & HIGH_REGION
            && candidate.nbucket < 0x10000
            && candidate.nchain < 0x10000
        {
            return Some(unsafe { view(Layout::Probed(step), common) });
        }
    }
    None
}

unsafe fn view(layout: Layout, common: *const RawCommon) -> Descriptor {
    let common = unsafe { &*common };
    Descriptor {
        layout,
        flags: common.flags,
        version: common.version,
        symtab: SymbolTable::new(common.symtab, common.strtab),
        plt_rel: unsafe { RelTable::new(common.plt_rel, common.plt_rel_count) },
        rel: unsafe { RelTable::new(common.rel, common.rel_count) },
        load_bias: common.load_bias,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linked_flags() -> u32 {
        (SoFlags::NEW_FORMAT | SoFlags::GNU_HASH | SoFlags::LINKED).bits()
    }

    #[test]
    fn detects_extended_layout() {
        let mut raw: Box<RawExtended> = Box::new(unsafe { core::mem::zeroed() });
        raw.common.flags = linked_flags();
        raw.common.version = 3;
        raw.common.load_bias = 0x7000;
        let descriptor =
            unsafe { resolve(&*raw as *const RawExtended as *const ()) }.unwrap();
        assert_eq!(descriptor.layout, Layout::Extended);
        assert_eq!(descriptor.version, 3);
        assert_eq!(descriptor.load_bias, 0x7000);
    }

    #[test]
    fn detects_compact_layout() {
        let mut raw: Box<RawCompact> = Box::new(unsafe { core::mem::zeroed() });
        raw.common.flags = linked_flags();
        let descriptor =
            unsafe { resolve(&*raw as *const RawCompact as *const ()) }.unwrap();
        assert_eq!(descriptor.layout, Layout::Compact);
    }

    #[test]
    fn detects_legacy_layout() {
        let mut raw: Box<RawLegacy> = Box::new(unsafe { core::mem::zeroed() });
        raw.common.flags = linked_flags();
        let descriptor = unsafe { resolve(&*raw as *const RawLegacy as *const ()) }.unwrap();
        assert_eq!(descriptor.layout, Layout::Legacy);
    }

    #[test]
    fn future_flag_bits_within_headroom_still_validate() {
        let mut raw: Box<RawCompact> = Box::new(unsafe { core::mem::zeroed() });
        raw.common.flags = linked_flags() | 0x800;
        let descriptor =
            unsafe { resolve(&*raw as *const RawCompact as *const ()) }.unwrap();
        assert_eq!(descriptor.layout, Layout::Compact);
    }

    #[test]
    fn unknown_record_is_rejected() {
        // flags in no candidate position fall into the valid range
        let raw: Box<RawLegacy> = Box::new(unsafe { core::mem::zeroed() });
        assert!(unsafe { resolve(&*raw as *const RawLegacy as *const ()) }.is_none());
    }

    #[cfg(target_pointer_width = "32")]
    #[test]
    fn drift_probe_recovers_shifted_legacy_record() {
        // shift the whole common block one word later than the legacy layout
        // expects and surround it with plausible table pointers
        #[repr(C)]
        struct Shifted {
            name: [u8; SOINFO_NAME_LEN],
            head: RawLegacyHead,
            pad: usize,
            common: RawCommon,
        }
        let mut raw: Box<Shifted> = Box::new(unsafe { core::mem::zeroed() });
        raw.common.flags = SoFlags::LINKED.bits();
        raw.common.strtab = 0xABC1_0000 as *const u8;
        raw.common.symtab = 0xABC2_0000 as *const RawSym;
        raw.common.nbucket = 17;
        raw.common.nchain = 40;
        let descriptor = unsafe { resolve(&*raw as *const Shifted as *const ()) }.unwrap();
        assert_eq!(descriptor.layout, Layout::Probed(1));
    }
}
