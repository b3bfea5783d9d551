//! Relocation-table scanning: map a symbol name to its patchable slot.

use crate::arch::{REL_ABSOLUTE, REL_GLOB_DAT, REL_JUMP_SLOT, rel_type_to_str};
use crate::diag::hook_log;
use crate::soinfo::Descriptor;

/// Which relocation table produced a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotKind {
    /// Lazily-bound call slot from the PLT relocation table.
    Plt,
    /// Data or globally-referenced address from the dynamic relocation table.
    Got,
}

impl SlotKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            SlotKind::Plt => "PLT",
            SlotKind::Got => "GOT",
        }
    }
}

/// A resolved, patchable slot.
pub(crate) struct Slot {
    pub addr: usize,
    pub kind: SlotKind,
}

/// Find the slot binding `symbol` in the module described by `descriptor`.
///
/// PLT-first, two phases: the PLT table is scanned for a jump-slot entry whose
/// symbol name matches; only if it yields nothing is the dynamic table scanned
/// for an absolute or global-data entry. The first match within a table wins.
/// A name match with an unexpected relocation type is logged and skipped.
/// `None` means the symbol is simply absent from this module's tables — the
/// common case, not an error.
pub(crate) fn find_slot(descriptor: &Descriptor, symbol: &str) -> Option<Slot> {
    for entry in descriptor.plt_rel.entries() {
        if descriptor.symtab.name(entry.r_symbol()) != symbol {
            continue;
        }
        let r_type = entry.r_type();
        if r_type == REL_JUMP_SLOT {
            return Some(Slot {
                addr: descriptor.load_bias + entry.r_offset(),
                kind: SlotKind::Plt,
            });
        }
        hook_log!(
            "[{symbol}] expected a jump slot, found {} ({r_type:#x})",
            rel_type_to_str(r_type)
        );
    }
    for entry in descriptor.rel.entries() {
        if descriptor.symtab.name(entry.r_symbol()) != symbol {
            continue;
        }
        let r_type = entry.r_type();
        if r_type == REL_ABSOLUTE || r_type == REL_GLOB_DAT {
            let addr = (descriptor.load_bias + entry.r_offset())
                .wrapping_add_signed(entry.r_addend());
            return Some(Slot {
                addr,
                kind: SlotKind::Got,
            });
        }
        hook_log!(
            "[{symbol}] expected an absolute or global-data slot, found {} ({r_type:#x})",
            rel_type_to_str(r_type)
        );
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reloc::{RelEntry, RelTable};
    use crate::soinfo::Layout;
    use crate::symbol::{RawSym, SymbolTable};

    // offsets: 1 -> "open", 6 -> "read"
    static STRTAB: &[u8] = b"\0open\0read\0";

    fn symtab() -> Box<[RawSym; 3]> {
        let mut syms: Box<[RawSym; 3]> = Box::new(unsafe { core::mem::zeroed() });
        syms[1].st_name = 1;
        syms[2].st_name = 6;
        syms
    }

    fn descriptor(
        symtab: &[RawSym; 3],
        plt: &'static [RelEntry],
        dynamic: &'static [RelEntry],
    ) -> Descriptor {
        Descriptor {
            layout: Layout::Compact,
            flags: 0,
            version: 0,
            symtab: SymbolTable::new(symtab.as_ptr(), STRTAB.as_ptr()),
            plt_rel: unsafe { RelTable::new(plt.as_ptr(), plt.len()) },
            rel: unsafe { RelTable::new(dynamic.as_ptr(), dynamic.len()) },
            load_bias: 0x10_0000,
        }
    }

    fn leak(entries: Vec<RelEntry>) -> &'static [RelEntry] {
        Box::leak(entries.into_boxed_slice())
    }

    #[test]
    fn plt_symbol_resolves_to_jump_slot() {
        let syms = symtab();
        let plt = leak(vec![
            RelEntry::new(0x100, 2, REL_JUMP_SLOT, 0),
            RelEntry::new(0x108, 1, REL_JUMP_SLOT, 0),
        ]);
        let desc = descriptor(&syms, plt, &[]);
        let slot = find_slot(&desc, "open").unwrap();
        assert_eq!(slot.addr, 0x10_0108);
        assert_eq!(slot.kind, SlotKind::Plt);
    }

    #[test]
    fn plt_match_wins_over_dynamic_match() {
        let syms = symtab();
        let plt = leak(vec![RelEntry::new(0x100, 1, REL_JUMP_SLOT, 0)]);
        let dynamic = leak(vec![RelEntry::new(0x900, 1, REL_GLOB_DAT, 0)]);
        let desc = descriptor(&syms, plt, dynamic);
        let slot = find_slot(&desc, "open").unwrap();
        assert_eq!(slot.addr, 0x10_0100);
        assert_eq!(slot.kind, SlotKind::Plt);
    }

    #[test]
    fn dynamic_table_applies_the_addend() {
        let syms = symtab();
        let dynamic = leak(vec![RelEntry::new(0x200, 2, REL_GLOB_DAT, 8)]);
        let desc = descriptor(&syms, &[], dynamic);
        let slot = find_slot(&desc, "read").unwrap();
        assert_eq!(slot.kind, SlotKind::Got);
        #[cfg(target_pointer_width = "64")]
        assert_eq!(slot.addr, 0x10_0208);
        #[cfg(target_pointer_width = "32")]
        assert_eq!(slot.addr, 0x10_0200);
    }

    #[test]
    fn unexpected_plt_type_falls_through_to_dynamic_table() {
        let syms = symtab();
        // a name match whose type is not a jump slot must be skipped
        let plt = leak(vec![RelEntry::new(0x100, 1, REL_GLOB_DAT, 0)]);
        let dynamic = leak(vec![RelEntry::new(0x300, 1, REL_ABSOLUTE, 0)]);
        let desc = descriptor(&syms, plt, dynamic);
        let slot = find_slot(&desc, "open").unwrap();
        assert_eq!(slot.addr, 0x10_0300);
        assert_eq!(slot.kind, SlotKind::Got);
    }

    #[test]
    fn absent_symbol_is_not_an_error() {
        let syms = symtab();
        let plt = leak(vec![RelEntry::new(0x100, 1, REL_JUMP_SLOT, 0)]);
        let desc = descriptor(&syms, plt, &[]);
        assert!(find_slot(&desc, "write").is_none());
    }

    #[test]
    fn first_match_within_a_table_wins() {
        let syms = symtab();
        let plt = leak(vec![
            RelEntry::new(0x100, 1, REL_JUMP_SLOT, 0),
            RelEntry::new(0x200, 1, REL_JUMP_SLOT, 0),
        ]);
        let desc = descriptor(&syms, plt, &[]);
        assert_eq!(find_slot(&desc, "open").unwrap().addr, 0x10_0100);
    }
}
