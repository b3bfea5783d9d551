//! Symbol and string table views.
//!
//! Both tables live in linker-owned memory; this crate only reads them to map a
//! relocation entry's symbol index to a name.

use core::ffi::CStr;

cfg_if::cfg_if! {
    if #[cfg(target_pointer_width = "64")]{
        pub(crate) type RawSym = elf::symbol::Elf64_Sym;
    }else{
        /// 32-bit ELF symbol table entry, as laid out in memory.
        #[allow(unused)]
        #[repr(C)]
        pub(crate) struct RawSym {
            pub st_name: u32,
            pub st_value: u32,
            pub st_size: u32,
            pub st_info: u8,
            pub st_other: u8,
            pub st_shndx: u16,
        }
    }
}

/// ELF string table wrapper: null-terminated names at byte offsets.
pub(crate) struct StringTable {
    data: *const u8,
}

impl StringTable {
    pub(crate) const fn new(data: *const u8) -> Self {
        StringTable { data }
    }

    /// Get the string starting at `offset`.
    ///
    /// The linker guarantees names are valid null-terminated strings; offsets come
    /// from the module's own symbol table, which indexes the same allocation.
    #[inline]
    pub(crate) fn get_str(&self, offset: usize) -> &'static str {
        unsafe {
            let start = self.data.add(offset).cast();
            let name: &'static CStr = CStr::from_ptr(start);
            core::str::from_utf8_unchecked(name.to_bytes())
        }
    }
}

/// Symbol table view: fixed-stride entries plus the string table resolving their
/// names.
pub(crate) struct SymbolTable {
    symtab: *const RawSym,
    strtab: StringTable,
}

impl SymbolTable {
    pub(crate) const fn new(symtab: *const RawSym, strtab: *const u8) -> Self {
        SymbolTable {
            symtab,
            strtab: StringTable::new(strtab),
        }
    }

    /// Resolve a relocation entry's symbol index to its name.
    ///
    /// Relocation tables carry no symbol count; the index is trusted the same way
    /// the linker trusts it when applying the relocation.
    #[inline]
    pub(crate) fn name(&self, idx: usize) -> &'static str {
        let sym = unsafe { &*self.symtab.add(idx) };
        self.strtab.get_str(sym.st_name as usize)
    }
}
