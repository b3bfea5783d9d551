//! x86-64 relocation types recognized by the scanner.

use elf::abi::*;

/// PLT jump slot relocation type - the slot holds the callable address.
pub const REL_JUMP_SLOT: u32 = R_X86_64_JUMP_SLOT;
/// GOT entry relocation type - the slot holds a globally bound data address.
pub const REL_GLOB_DAT: u32 = R_X86_64_GLOB_DAT;
/// Absolute relocation type - the slot holds the symbol address directly.
pub const REL_ABSOLUTE: u32 = R_X86_64_64;

/// Map an x86-64 relocation type value to a human readable name.
pub(crate) fn rel_type_to_str(r_type: u32) -> &'static str {
    match r_type {
        R_X86_64_NONE => "R_X86_64_NONE",
        R_X86_64_64 => "R_X86_64_64",
        R_X86_64_COPY => "R_X86_64_COPY",
        R_X86_64_GLOB_DAT => "R_X86_64_GLOB_DAT",
        R_X86_64_JUMP_SLOT => "R_X86_64_JUMP_SLOT",
        R_X86_64_RELATIVE => "R_X86_64_RELATIVE",
        R_X86_64_IRELATIVE => "R_X86_64_IRELATIVE",
        R_X86_64_TPOFF64 => "R_X86_64_TPOFF64",
        R_X86_64_DTPMOD64 => "R_X86_64_DTPMOD64",
        R_X86_64_DTPOFF64 => "R_X86_64_DTPOFF64",
        _ => "UNKNOWN",
    }
}
