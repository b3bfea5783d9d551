//! Relocation entry and table views.
//!
//! The linker's tables use the explicit-addend `Rela` format on 64-bit targets and
//! the implicit `Rel` format on 32-bit targets; the choice is made once per build,
//! never per entry.

cfg_if::cfg_if! {
    if #[cfg(target_pointer_width = "64")]{
        pub(crate) type RawRel = elf::relocation::Elf64_Rela;
        pub(crate) const REL_MASK: usize = 0xFFFFFFFF;
        pub(crate) const REL_BIT: usize = 32;
    }else{
        pub(crate) const REL_MASK: usize = 0xFF;
        pub(crate) const REL_BIT: usize = 8;

        /// 32-bit relocation entry without an addend, as laid out in memory.
        #[repr(C)]
        pub(crate) struct RawRel {
            pub r_offset: u32,
            pub r_info: u32,
        }
    }
}

/// A single relocation entry in a linker-owned table.
#[repr(transparent)]
pub struct RelEntry {
    raw: RawRel,
}

impl RelEntry {
    /// Returns the relocation type.
    #[inline]
    pub fn r_type(&self) -> u32 {
        (self.raw.r_info as usize & REL_MASK) as u32
    }

    /// Returns the symbol index.
    #[inline]
    pub fn r_symbol(&self) -> usize {
        self.raw.r_info as usize >> REL_BIT
    }

    /// Returns the relocation offset (relative to the module's load bias).
    #[inline]
    pub fn r_offset(&self) -> usize {
        self.raw.r_offset as usize
    }

    /// Returns the explicit addend, or zero in the implicit-addend format.
    #[inline]
    pub fn r_addend(&self) -> isize {
        #[cfg(target_pointer_width = "64")]
        {
            self.raw.r_addend as isize
        }
        #[cfg(not(target_pointer_width = "64"))]
        {
            0
        }
    }

    #[cfg(test)]
    pub(crate) fn new(offset: usize, symbol: usize, r_type: u32, addend: isize) -> Self {
        #[cfg(target_pointer_width = "64")]
        let raw = RawRel {
            r_offset: offset as u64,
            r_info: ((symbol as u64) << REL_BIT) | r_type as u64,
            r_addend: addend as i64,
        };
        #[cfg(not(target_pointer_width = "64"))]
        let raw = {
            let _ = addend;
            RawRel {
                r_offset: offset as u32,
                r_info: ((symbol as u32) << REL_BIT) | r_type,
            }
        };
        RelEntry { raw }
    }
}

/// Bounds-checked view of a relocation table: pointer plus declared entry count.
///
/// Iteration can never run past the declared count, and a null table behaves as an
/// empty one.
pub(crate) struct RelTable {
    ptr: *const RelEntry,
    count: usize,
}

impl RelTable {
    /// Wrap a raw table pointer and its declared count.
    ///
    /// # Safety
    /// If `ptr` is non-null it must point to at least `count` consecutive entries
    /// that stay valid for the lifetime of the view.
    pub(crate) unsafe fn new(ptr: *const RelEntry, count: usize) -> Self {
        RelTable { ptr, count }
    }

    pub(crate) fn entries(&self) -> &[RelEntry] {
        if self.ptr.is_null() || self.count == 0 {
            return &[];
        }
        unsafe { core::slice::from_raw_parts(self.ptr, self.count) }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries().len()
    }
}
