//! AArch64 relocation types recognized by the scanner.

use elf::abi::*;

/// PLT jump slot relocation type - the slot holds the callable address.
pub const REL_JUMP_SLOT: u32 = R_AARCH64_JUMP_SLOT;
/// GOT entry relocation type - the slot holds a globally bound data address.
pub const REL_GLOB_DAT: u32 = R_AARCH64_GLOB_DAT;
/// Absolute relocation type - the slot holds the symbol address directly.
pub const REL_ABSOLUTE: u32 = R_AARCH64_ABS64;

/// Map an AArch64 relocation type value to a human readable name.
pub(crate) fn rel_type_to_str(r_type: u32) -> &'static str {
    match r_type {
        R_AARCH64_NONE => "R_AARCH64_NONE",
        R_AARCH64_ABS64 => "R_AARCH64_ABS64",
        R_AARCH64_COPY => "R_AARCH64_COPY",
        R_AARCH64_GLOB_DAT => "R_AARCH64_GLOB_DAT",
        R_AARCH64_JUMP_SLOT => "R_AARCH64_JUMP_SLOT",
        R_AARCH64_RELATIVE => "R_AARCH64_RELATIVE",
        R_AARCH64_IRELATIVE => "R_AARCH64_IRELATIVE",
        R_AARCH64_TLS_TPREL => "R_AARCH64_TLS_TPREL",
        R_AARCH64_TLS_DTPMOD => "R_AARCH64_TLS_DTPMOD",
        R_AARCH64_TLS_DTPREL => "R_AARCH64_TLS_DTPREL",
        _ => "UNKNOWN",
    }
}
