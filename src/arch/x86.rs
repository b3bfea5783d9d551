//! x86 relocation types recognized by the scanner.
//!
//! `elf::abi` only spells the x86-64 names; the jump slot and GOT values coincide
//! on i386, the absolute type does not.

use elf::abi::*;

/// PLT jump slot relocation type - the slot holds the callable address.
pub const REL_JUMP_SLOT: u32 = R_X86_64_JUMP_SLOT;
/// GOT entry relocation type - the slot holds a globally bound data address.
pub const REL_GLOB_DAT: u32 = R_X86_64_GLOB_DAT;
/// Absolute relocation type (R_386_32) - the slot holds the symbol address directly.
pub const REL_ABSOLUTE: u32 = 1;

/// Map an x86 relocation type value to a human readable name.
pub(crate) fn rel_type_to_str(r_type: u32) -> &'static str {
    match r_type {
        0 => "R_386_NONE",
        1 => "R_386_32",
        5 => "R_386_COPY",
        6 => "R_386_GLOB_DAT",
        7 => "R_386_JMP_SLOT",
        8 => "R_386_RELATIVE",
        42 => "R_386_IRELATIVE",
        _ => "UNKNOWN",
    }
}
