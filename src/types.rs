//! Core types shared across the document library.

/// Fingerprint: content-derived digest used to detect changes independent
/// of filesystem timestamps.
pub type Fingerprint = [u8; 32];

/// Compute the fingerprint of raw document content.
pub fn fingerprint(content: &[u8]) -> Fingerprint {
    *blake3::hash(content).as_bytes()
}
