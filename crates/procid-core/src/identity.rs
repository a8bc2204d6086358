//! Namespace-independent process identity.
//!
//! A pid is only meaningful inside the pid namespace it was observed in and
//! gets recycled. The start time and start stack address in
//! `/proc/[pid]/stat` are the same from a container and from the host, and
//! the boot id separates one boot from the next. Hashing the three together
//! gives a token that names one process instance everywhere.
//!
//! The token layout is fixed: SHA-256 over the boot id bytes, then the start
//! stack address and the start time as 8-byte little-endian integers,
//! rendered as 64 lower-case hex digits. Changing any of it breaks
//! comparisons with identities computed elsewhere.

use sha2::{Digest, Sha256};

/// Length of a unique id in hex characters.
pub const UNIQUE_ID_LEN: usize = 64;

/// Computes the unique id for a process instance.
pub fn derive_unique_id(boot_id: &str, start_stack: u64, start_time: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(boot_id.as_bytes());
    hasher.update(start_stack.to_le_bytes());
    hasher.update(start_time.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOT: &str = "6f1d2c3b-8a4e-4b5f-9c7d-2e1f0a9b8c7d";

    #[test]
    fn test_unique_id_format() {
        let id = derive_unique_id(BOOT, 140735111111111, 100000);
        assert_eq!(id.len(), UNIQUE_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_unique_id_is_deterministic() {
        assert_eq!(
            derive_unique_id(BOOT, 140735111111111, 100000),
            derive_unique_id(BOOT, 140735111111111, 100000)
        );
    }

    #[test]
    fn test_unique_id_changes_with_each_input() {
        let base = derive_unique_id(BOOT, 140735111111111, 100000);

        assert_ne!(base, derive_unique_id("another-boot", 140735111111111, 100000));
        assert_ne!(base, derive_unique_id(BOOT, 140735111111112, 100000));
        assert_ne!(base, derive_unique_id(BOOT, 140735111111111, 100001));
    }

    #[test]
    fn test_unique_id_inputs_do_not_cancel() {
        // Swapping stack and start time must not collide.
        assert_ne!(derive_unique_id(BOOT, 1, 2), derive_unique_id(BOOT, 2, 1));
        assert_ne!(derive_unique_id(BOOT, 0, 0), derive_unique_id("", 0, 0));
    }

    #[test]
    fn test_unique_id_known_vector() {
        // SHA-256 of the empty boot id followed by sixteen zero bytes.
        let mut hasher = Sha256::new();
        hasher.update([0u8; 16]);
        let expected = format!("{:x}", hasher.finalize());

        assert_eq!(derive_unique_id("", 0, 0), expected);
    }

    #[test]
    fn test_unique_id_byte_order() {
        let mut hasher = Sha256::new();
        hasher.update(b"b");
        hasher.update([1, 0, 0, 0, 0, 0, 0, 0]);
        hasher.update([2, 0, 0, 0, 0, 0, 0, 0]);
        let expected = format!("{:x}", hasher.finalize());

        assert_eq!(derive_unique_id("b", 1, 2), expected);
    }
}
