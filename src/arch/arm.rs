//! ARM relocation types recognized by the scanner.

use elf::abi::*;

/// PLT jump slot relocation type - the slot holds the callable address.
pub const REL_JUMP_SLOT: u32 = R_ARM_JUMP_SLOT;
/// GOT entry relocation type - the slot holds a globally bound data address.
pub const REL_GLOB_DAT: u32 = R_ARM_GLOB_DAT;
/// Absolute relocation type - the slot holds the symbol address directly.
pub const REL_ABSOLUTE: u32 = R_ARM_ABS32;

/// Map an ARM relocation type value to a human readable name.
pub(crate) fn rel_type_to_str(r_type: u32) -> &'static str {
    match r_type {
        R_ARM_NONE => "R_ARM_NONE",
        R_ARM_ABS32 => "R_ARM_ABS32",
        R_ARM_COPY => "R_ARM_COPY",
        R_ARM_GLOB_DAT => "R_ARM_GLOB_DAT",
        R_ARM_JUMP_SLOT => "R_ARM_JUMP_SLOT",
        R_ARM_RELATIVE => "R_ARM_RELATIVE",
        R_ARM_IRELATIVE => "R_ARM_IRELATIVE",
        R_ARM_TLS_TPOFF32 => "R_ARM_TLS_TPOFF32",
        R_ARM_TLS_DTPMOD32 => "R_ARM_TLS_DTPMOD32",
        R_ARM_TLS_DTPOFF32 => "R_ARM_TLS_DTPOFF32",
        _ => "UNKNOWN",
    }
}
