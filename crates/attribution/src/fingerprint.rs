use std::env;

use common::hash;

/// Source of an opaque device fingerprint.
///
/// Fingerprints must be stable for the same device,
/// but they are not expected to be unique.
pub trait Fingerprinter {
    /// Derive the fingerprint, if any device signals are available.
    fn fingerprint(&self) -> Option<String>;
}

/// Environment variables that describe the current device and user.
const SIGNAL_VARIABLES: [&str; 8] = [
    "HOSTNAME",
    "COMPUTERNAME",
    "USER",
    "USERNAME",
    "LANG",
    "LC_ALL",
    "TZ",
    "TERM",
];

/// [`Fingerprinter`] implementation that hashes passive signals
/// of the current operating system and environment.
pub struct DeviceFingerprinter;

impl DeviceFingerprinter {
    /// Collect available device signals.
    fn signals() -> Vec<String> {
        let info = os_info::get();

        let mut signals = vec![
            info.os_type().to_string(),
            info.version().to_string(),
            info.bitness().to_string(),
            String::from(env::consts::ARCH),
        ];

        signals.extend(
            SIGNAL_VARIABLES
                .iter()
                .filter_map(|name| env::var(name).ok())
                .filter(|value| !value.is_empty()),
        );

        signals
    }
}

impl Fingerprinter for DeviceFingerprinter {
    fn fingerprint(&self) -> Option<String> {
        let signals = Self::signals();

        if signals.iter().all(|signal| signal.is_empty()) {
            return None;
        }

        Some(hash::blake2_hex(signals.join("|").as_bytes()))
    }
}
