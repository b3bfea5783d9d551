//! Hook registry and the one-shot installation pass.

use crate::diag::hook_log;
use crate::maps::{self, Module};
use crate::patch;
use crate::scan;
use crate::soinfo::{self, Descriptor};
use core::sync::atomic::{AtomicUsize, Ordering};
use std::ffi::{CStr, CString, c_void};

/// A single interposition request: redirect `symbol` to `replacement`, storing
/// the previous target in the caller-owned slot.
pub struct HookRequest {
    symbol: String,
    original: &'static AtomicUsize,
    replacement: usize,
}

/// Installation context owning the hook registry.
///
/// Requests are registered up front, then [`Hooker::install`] runs one pass over
/// every loaded module. The registry preserves insertion order, keeps duplicates,
/// and is never cleared; a second `install` call would re-run the pass but cannot
/// un-hook anything.
pub struct Hooker {
    hooks: Vec<HookRequest>,
}

impl Hooker {
    /// Creates an empty installation context.
    pub const fn new() -> Self {
        Hooker { hooks: Vec::new() }
    }

    /// Registers a hook request.
    ///
    /// `original` is the caller-owned output slot: it must start at zero and is
    /// written at most once, with the first non-zero previous value a patch
    /// uncovers. After installation a zero slot means "hook not installed" and
    /// the caller must not call through it. Callable any number of times before
    /// installation; requests are kept in registration order, duplicates
    /// included.
    pub fn register(
        &mut self,
        symbol: impl Into<String>,
        original: &'static AtomicUsize,
        replacement: usize,
    ) {
        self.hooks.push(HookRequest {
            symbol: symbol.into(),
            original,
            replacement,
        });
    }

    /// Number of registered requests.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Runs the installation pass: for every registered request, across every
    /// loaded module except this crate's own image, resolve the module's linker
    /// record, scan its relocation tables and patch the matching slot.
    ///
    /// Every failure is local: modules whose record cannot be resolved are
    /// skipped, symbols absent from a module are a no-op for it, and nothing
    /// aborts the pass. Success is observable per hook, through the original
    /// slot having been populated. One-shot: modules loaded afterwards are not
    /// covered.
    ///
    /// # Safety
    /// Rewrites live relocation slots. Every registered `replacement` must be a
    /// function whose signature matches the symbol it replaces, and must stay
    /// valid for the life of the process.
    pub unsafe fn install(&self) {
        if self.hooks.is_empty() {
            hook_log!("no hooks registered");
            return;
        }
        hook_log!("installing from pid {}", unsafe { libc::getpid() });
        let own_path = self_path();
        let modules = maps::modules();
        hook_log!("found {} loaded modules", modules.len());
        hook_log!("installing {} hooks", self.hooks.len());
        // records of modules loaded under a recent target SDK are hidden from
        // dlopen callers; lower it for the duration of the pass
        let _sdk = TargetSdkGuard::lower();
        for module in &modules {
            // don't hook our own image. Containment (not equality) mirrors the
            // original linker tooling and can falsely exclude unrelated modules
            // whose path embeds ours.
            if let Some(own) = own_path.as_deref() {
                if module.path.contains(own) {
                    continue;
                }
            }
            self.install_in_module(module);
        }
        hook_log!("done");
    }

    fn install_in_module(&self, module: &Module) {
        let Some(handle) = open_module(&module.path) else {
            hook_log!("[{:#x}] cannot reopen {}", module.base, module.path);
            return;
        };
        let Some(descriptor) = (unsafe { soinfo::resolve(handle) }) else {
            hook_log!(
                "[{:#x}] cannot resolve linker record for {}",
                module.base,
                module.path
            );
            return;
        };
        hook_log!(
            "[{:#x}::{:#x}:{} {:?}] hooking {} (plt={}, dyn={}) ...",
            module.base,
            descriptor.flags,
            descriptor.version,
            descriptor.layout,
            module.path,
            descriptor.plt_rel.len(),
            descriptor.rel.len()
        );
        for hook in &self.hooks {
            self.apply(&descriptor, hook);
        }
    }

    fn apply(&self, descriptor: &Descriptor, hook: &HookRequest) {
        let Some(slot) = scan::find_slot(descriptor, &hook.symbol) else {
            return;
        };
        let previous = match unsafe { patch::patch_address(slot.addr, hook.replacement) } {
            Ok(previous) => previous,
            Err(err) => {
                hook_log!("[{}] patch at {:#x} failed: {err}", hook.symbol, slot.addr);
                return;
            }
        };
        hook_log!(
            "[{}][{previous:#x}] hooked ({})",
            hook.symbol,
            slot.kind.as_str()
        );
        // first-write-wins: a later table hit for the same symbol must not
        // clobber the true original with an already-hooked value
        if previous != 0 {
            let _ = hook
                .original
                .compare_exchange(0, previous, Ordering::SeqCst, Ordering::SeqCst);
        }
    }
}

impl Default for Hooker {
    fn default() -> Self {
        Hooker::new()
    }
}

/// Reopen an already-loaded module to obtain its linker handle.
///
/// `RTLD_NOLOAD` hands back the record without re-running constructors; the
/// oldest linkers don't support it, so a plain local load is the fallback (the
/// module is resident either way).
fn open_module(path: &str) -> Option<*const ()> {
    let path = CString::new(path).ok()?;
    let mut handle = unsafe { libc::dlopen(path.as_ptr(), libc::RTLD_NOLOAD) };
    if handle.is_null() {
        handle = unsafe { libc::dlopen(path.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
    }
    (!handle.is_null()).then_some(handle as *const ())
}

/// Path of the image this crate is linked into, via `dladdr` on one of its own
/// functions.
fn self_path() -> Option<String> {
    let mut info: libc::Dl_info = unsafe { core::mem::zeroed() };
    let probe = open_module as usize as *mut c_void;
    if unsafe { libc::dladdr(probe, &mut info) } == 0 || info.dli_fname.is_null() {
        return None;
    }
    let name = unsafe { CStr::from_ptr(info.dli_fname) };
    Some(name.to_string_lossy().into_owned())
}

cfg_if::cfg_if! {
    if #[cfg(target_os = "android")] {
        type GetSdkFn = unsafe extern "C" fn() -> u32;
        type SetSdkFn = unsafe extern "C" fn(u32);

        /// Best-effort guard lowering the reported target SDK to 23 while held.
        ///
        /// From SDK 24 on, the platform hides linker records from `dlopen`
        /// callers; dropping the process-wide value below the cutoff suppresses
        /// that restriction. Restores the previous value on drop. When the
        /// get/set pair cannot be resolved the guard does nothing.
        struct TargetSdkGuard {
            restore: Option<(SetSdkFn, u32, *mut c_void)>,
        }

        impl TargetSdkGuard {
            fn lower() -> Self {
                const CUTOFF: u32 = 23;
                unsafe {
                    let libdl = libc::dlopen(c"libdl.so".as_ptr(), libc::RTLD_NOW);
                    if libdl.is_null() {
                        return TargetSdkGuard { restore: None };
                    }
                    let get = libc::dlsym(
                        libdl,
                        c"android_get_application_target_sdk_version".as_ptr(),
                    );
                    let set = libc::dlsym(
                        libdl,
                        c"android_set_application_target_sdk_version".as_ptr(),
                    );
                    if get.is_null() || set.is_null() {
                        return TargetSdkGuard { restore: None };
                    }
                    let get: GetSdkFn = core::mem::transmute(get);
                    let set: SetSdkFn = core::mem::transmute(set);
                    let sdk = get();
                    if sdk <= CUTOFF {
                        return TargetSdkGuard { restore: None };
                    }
                    hook_log!("target sdk {sdk} -> {CUTOFF}");
                    set(CUTOFF);
                    TargetSdkGuard {
                        restore: Some((set, sdk, libdl)),
                    }
                }
            }
        }

        impl Drop for TargetSdkGuard {
            fn drop(&mut self) {
                if let Some((set, sdk, libdl)) = self.restore.take() {
                    unsafe {
                        set(sdk);
                        libc::dlclose(libdl);
                    }
                }
            }
        }
    } else {
        /// The target SDK interaction only exists on Android.
        struct TargetSdkGuard;

        impl TargetSdkGuard {
            fn lower() -> Self {
                TargetSdkGuard
            }
        }
    }
}
