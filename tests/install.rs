use rstest::{fixture, rstest};
use sohook::{Hooker, modules, set_log_tag};
use std::sync::atomic::AtomicUsize;

#[fixture]
#[once]
fn init_logger() -> () {
    let _ = env_logger::builder().is_test(true).try_init();
    set_log_tag(Some("sohook-test"));
}

#[rstest]
fn empty_registry_install_is_a_no_op(_init_logger: &()) {
    let hooker = Hooker::new();
    assert!(hooker.is_empty());
    // must return without touching any module
    unsafe { hooker.install() };
}

#[rstest]
fn own_process_enumerates_modules(_init_logger: &()) {
    let modules = modules();
    assert!(!modules.is_empty());
    for module in &modules {
        assert!(module.base > 0);
    }
    // libc's code segment is always among them
    assert!(modules.iter().any(|module| module.path.contains(".so")));
}

#[rstest]
fn registration_keeps_duplicates_and_order(_init_logger: &()) {
    static SLOT: AtomicUsize = AtomicUsize::new(0);
    let mut hooker = Hooker::new();
    hooker.register("close", &SLOT, 0x1000);
    hooker.register("close", &SLOT, 0x1000);
    hooker.register("openat", &SLOT, 0x2000);
    assert_eq!(hooker.len(), 3);
}

// installing against a live linker record only works where module handles
// address the linker's bookkeeping structure
#[cfg(target_os = "android")]
#[rstest]
fn install_records_an_original_target(_init_logger: &()) {
    use std::sync::atomic::Ordering;

    static ORIG_GETPID: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "C" fn fake_getpid() -> libc::pid_t {
        let orig = ORIG_GETPID.load(Ordering::SeqCst);
        assert_ne!(orig, 0);
        let orig: unsafe extern "C" fn() -> libc::pid_t =
            unsafe { core::mem::transmute(orig) };
        unsafe { orig() }
    }

    let mut hooker = Hooker::new();
    hooker.register("getpid", &ORIG_GETPID, fake_getpid as usize);
    unsafe { hooker.install() };
    assert_ne!(ORIG_GETPID.load(Ordering::SeqCst), 0);
    assert_eq!(unsafe { libc::getpid() }, std::process::id() as libc::pid_t);
}
