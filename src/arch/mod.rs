//! Architectures supported by the hook engine.
//!
//! Each architecture module exports the relocation type values the scanner treats
//! as patchable: the lazily-bound jump slot and the two data-binding variants.

cfg_if::cfg_if! {
    if #[cfg(target_arch = "x86_64")]{
        mod x86_64;
        pub use x86_64::*;
    }else if #[cfg(target_arch = "aarch64")]{
        mod aarch64;
        pub use aarch64::*;
    }else if #[cfg(target_arch = "x86")]{
        mod x86;
        pub use x86::*;
    }else if #[cfg(target_arch = "arm")]{
        mod arm;
        pub use arm::*;
    }
}
