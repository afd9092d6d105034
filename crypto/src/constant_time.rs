//! Constant-time comparisons for authentication tags.
//!
//! MAC verification MUST go through these helpers. A short-circuiting `==`
//! leaks how many leading bytes of a forged tag were correct.

use subtle::ConstantTimeEq;

/// Constant-time equality check for fixed-size arrays
///
/// Execution time is independent of the contents.
///
/// # Example
///
/// ```rust
/// use envelope_crypto::constant_time::ct_eq_array;
///
/// assert!(ct_eq_array(b"tag", b"tag"));
/// assert!(!ct_eq_array(b"tag", b"tog"));
/// ```
pub fn ct_eq_array<const N: usize>(a: &[u8; N], b: &[u8; N]) -> bool {
    a.ct_eq(b).into()
}

/// Check a received tag against the locally computed one
///
/// A received tag of the wrong length never matches. Length is public, so
/// that check does not need to be constant-time.
pub fn verify_mac<const N: usize>(computed_tag: &[u8; N], received_tag: &[u8]) -> bool {
    match <&[u8; N]>::try_from(received_tag) {
        Ok(received) => ct_eq_array(computed_tag, received),
        Err(_) => false,
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_ct_eq_array() {
        assert!(ct_eq_array(&[1u8; 32], &[1u8; 32]));
        let mut other = [1u8; 32];
        other[31] = 0;
        assert!(!ct_eq_array(&[1u8; 32], &other));
    }

    #[test]
    fn test_verify_mac() {
        let tag = [0x12, 0x34, 0x56, 0x78];
        assert!(verify_mac(&tag, &tag));
        assert!(!verify_mac(&tag, &[0x00, 0x00, 0x00, 0x00]));
    }

    #[test]
    fn test_verify_mac_length_mismatch() {
        let tag = [0xAB; 32];
        assert!(!verify_mac(&tag, &tag[..31]));
        assert!(!verify_mac(&tag, &[0xAB; 33]));
        assert!(!verify_mac(&tag, &[]));
    }
}
