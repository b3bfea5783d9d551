//! Diagnostic output gate.
//!
//! All diagnostics go through the [`log`] facade; this module only adds the
//! process-wide tag switch: a set tag prefixes every line, no tag suppresses the
//! crate's output entirely. Formatting and sink selection stay with whatever
//! logger implementation the embedding process installed.

use std::sync::RwLock;

pub(crate) static LOG_TAG: RwLock<Option<&'static str>> = RwLock::new(None);

/// Configure the diagnostic tag.
///
/// A `Some` tag enables the crate's diagnostics and prefixes every line with it;
/// `None` (the initial state) suppresses them. Process-wide, no other effect on
/// behavior. May be called at any time, including between installation passes.
pub fn set_log_tag(tag: Option<&'static str>) {
    if let Ok(mut slot) = LOG_TAG.write() {
        *slot = tag;
    }
}

macro_rules! hook_log {
    ($($arg:tt)*) => {
        if let Ok(tag) = $crate::diag::LOG_TAG.read() {
            if let Some(tag) = *tag {
                log::debug!("[{}] {}", tag, format_args!($($arg)*));
            }
        }
    };
}
pub(crate) use hook_log;
