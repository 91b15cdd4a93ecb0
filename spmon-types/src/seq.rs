//! Sequence counter arithmetic.
//!
//! Payload `seq` values are an 8 bit counter shared between an edge node and
//! its devices, wrapping from 255 back to 0. Birth/death sequence (`bdSeq`)
//! values wrap over the full unsigned 64 bit range. Decoded payloads carry
//! both as `u64`, so the helpers operate on `u64` directly.

/// The next expected value of the 0-255 wrapping payload `seq` counter.
pub fn next_seq(prev: u64) -> u64 {
    prev.wrapping_add(1) % 256
}

/// The next expected `bdSeq` value for an edge node or host application.
pub fn next_bdseq(prev: u64) -> u64 {
    prev.wrapping_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_seq_increments() {
        assert_eq!(next_seq(0), 1);
        assert_eq!(next_seq(1), 2);
        assert_eq!(next_seq(254), 255);
    }

    #[test]
    fn test_next_seq_wraps_at_256() {
        assert_eq!(next_seq(255), 0);
        assert_eq!(next_seq(u64::MAX), 0);
    }

    #[test]
    fn test_next_bdseq() {
        assert_eq!(next_bdseq(0), 1);
        assert_eq!(next_bdseq(7), 8);
        assert_eq!(next_bdseq(u64::MAX), 0);
    }
}
