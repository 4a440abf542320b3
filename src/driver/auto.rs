//! Driver auto-selection.

use crate::driver::DriverKind;

/// Concrete drivers in order of preference.
pub const PRIORITY: [DriverKind; 2] = [DriverKind::Reqwest, DriverKind::Ureq];

/// Concrete drivers compiled into this build.
pub fn available() -> Vec<DriverKind> {
    PRIORITY
        .iter()
        .copied()
        .filter(DriverKind::is_available)
        .collect()
}

/// Picks the preferred driver out of `available`.
pub fn detect(available: &[DriverKind]) -> Option<DriverKind> {
    let kind = PRIORITY.iter().copied().find(|k| available.contains(k));
    match kind {
        Some(kind) => log::debug!("Driver[auto]: selected {}", kind),
        None => log::warn!("Driver[auto]: no transport backend available"),
    }
    kind
}
