//! Hashing utilities for stable project object identifiers.

use sha2::{Digest, Sha256};

/// Length of an object identifier in hex digits.
pub const OBJECT_ID_LEN: usize = 24;

/// A hasher for building fingerprints from multiple components.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    /// Create a new fingerprint builder.
    pub fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    /// Add a string component to the fingerprint.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.hasher.update(s.as_bytes());
        self.hasher.update(b"\0"); // Separator
        self
    }

    /// Finalize and return the fingerprint as a hex string.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }

    /// Finalize into an uppercase object identifier.
    pub fn finish_object_id(self) -> String {
        self.finish()[..OBJECT_ID_LEN].to_ascii_uppercase()
    }
}

/// Stable identifier for a project object of `kind` named `name`.
///
/// The same object gets the same identifier across runs, so rewriting an
/// unchanged project produces an unchanged file.
pub fn object_id(kind: &str, name: &str) -> String {
    let mut fp = Fingerprint::new();
    fp.update_str(kind).update_str(name);
    fp.finish_object_id()
}
