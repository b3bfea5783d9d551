//! Enumeration of loaded modules from the process's memory map.
//!
//! `/proc/self/maps` is line oriented: `<start>-<end> <perms> <offset> <dev> <ino>
//! <path>`. Executable module code segments are the `r-xp` regions; their start
//! address and backing path identify a loaded module.

use crate::diag::hook_log;
use crate::error::{Result, maps_error};
use crate::patch::ProtFlags;

const PROC_MAPS: &str = "/proc/self/maps";

/// A loaded module: the base address of its executable mapping and the path of
/// the backing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// First occupied virtual address of the module's code segment.
    pub base: usize,
    /// Path of the mapped file (text after the last space of the maps line).
    pub path: String,
}

/// One mapped region, kept with its protection so the patcher can learn what a
/// page currently permits.
pub(crate) struct Region {
    pub start: usize,
    pub end: usize,
    pub prot: ProtFlags,
}

/// Lists the currently loaded executable modules.
///
/// Fails softly: when the maps listing cannot be read this returns an empty list
/// and the caller treats it as "no modules found". No ordering guarantee beyond
/// the order regions appear in the listing.
pub fn modules() -> Vec<Module> {
    match read_maps() {
        Ok(content) => parse_modules(&content),
        Err(err) => {
            hook_log!("{err}");
            Vec::new()
        }
    }
}

fn read_maps() -> Result<String> {
    std::fs::read_to_string(PROC_MAPS)
        .map_err(|err| maps_error(format!("cannot read {PROC_MAPS}: {err}")))
}

pub(crate) fn parse_modules(content: &str) -> Vec<Module> {
    let mut modules = Vec::new();
    for line in content.lines() {
        let mut fields = line.split_ascii_whitespace();
        let (Some(range), Some(perms)) = (fields.next(), fields.next()) else {
            continue;
        };
        if perms != "r-xp" {
            continue;
        }
        let Some((start, _)) = range.split_once('-') else {
            continue;
        };
        let Ok(base) = usize::from_str_radix(start, 16) else {
            continue;
        };
        let path = line.rsplit(' ').next().unwrap_or("");
        modules.push(Module {
            base,
            path: path.to_string(),
        });
    }
    modules
}

pub(crate) fn parse_regions(content: &str) -> Vec<Region> {
    let mut regions = Vec::new();
    for line in content.lines() {
        let mut fields = line.split_ascii_whitespace();
        let (Some(range), Some(perms)) = (fields.next(), fields.next()) else {
            continue;
        };
        let Some((start, end)) = range.split_once('-') else {
            continue;
        };
        let (Ok(start), Ok(end)) = (
            usize::from_str_radix(start, 16),
            usize::from_str_radix(end, 16),
        ) else {
            continue;
        };
        let mut prot = ProtFlags::PROT_NONE;
        for (idx, ch) in perms.bytes().enumerate() {
            match (idx, ch) {
                (0, b'r') => prot |= ProtFlags::PROT_READ,
                (1, b'w') => prot |= ProtFlags::PROT_WRITE,
                (2, b'x') => prot |= ProtFlags::PROT_EXEC,
                _ => {}
            }
        }
        regions.push(Region { start, end, prot });
    }
    regions
}

/// Protection of the region containing `addr`, or `None` when the listing is
/// unavailable or the address is not mapped.
pub(crate) fn protection_at(addr: usize) -> Option<ProtFlags> {
    let content = read_maps().ok()?;
    find_protection(&parse_regions(&content), addr)
}

fn find_protection(regions: &[Region], addr: usize) -> Option<ProtFlags> {
    regions
        .iter()
        .find(|region| region.start <= addr && addr < region.end)
        .map(|region| region.prot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_read_exec_private_regions() {
        let listing = "1000-2000 r-xp 0 00:00 0 /lib/a.so\n3000-4000 r--p 0 00:00 0 /lib/b.so\n";
        let modules = parse_modules(listing);
        assert_eq!(
            modules,
            vec![Module {
                base: 0x1000,
                path: "/lib/a.so".to_string(),
            }]
        );
    }

    #[test]
    fn shared_exec_regions_are_not_modules() {
        let listing = "1000-2000 r-xs 0 00:00 0 /lib/a.so\n";
        assert!(parse_modules(listing).is_empty());
    }

    #[test]
    fn path_is_text_after_last_space() {
        let listing = "7f00-7f10 r-xp 0 fd:01 42 /data/app/libfoo bar.so\n";
        let modules = parse_modules(listing);
        assert_eq!(modules[0].path, "bar.so");
    }

    #[test]
    fn garbage_lines_are_skipped() {
        let listing = "not a maps line\nzzzz-qqqq r-xp 0 00:00 0 /lib/a.so\n";
        assert!(parse_modules(listing).is_empty());
    }

    #[test]
    fn region_protections() {
        let listing = "1000-2000 rw-p 0 00:00 0 [heap]\n2000-3000 r-xp 0 00:00 0 /lib/a.so\n";
        let regions = parse_regions(listing);
        assert_eq!(
            find_protection(&regions, 0x1800),
            Some(ProtFlags::PROT_READ | ProtFlags::PROT_WRITE)
        );
        assert_eq!(
            find_protection(&regions, 0x2000),
            Some(ProtFlags::PROT_READ | ProtFlags::PROT_EXEC)
        );
        assert_eq!(find_protection(&regions, 0x4000), None);
    }

    #[test]
    fn own_process_has_modules() {
        assert!(!modules().is_empty());
    }
}
