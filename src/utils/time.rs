//! SRAM frame-time helpers.
//!
//! The client's `total_time` counter is a 24-bit little-endian value. We
//! widen it to `i64` for storage (see `events.frame_time`); per spec.md §9
//! the wrap-around behaviour at 2^24 frames is left undefined, matching the
//! original implementation.

/// Decodes a 24-bit little-endian frame counter from the first three bytes
/// of `total_time`. Returns `None` if fewer than three bytes are present.
pub fn decode_frame_time(total_time: &[u8]) -> Option<i64> {
    if total_time.len() < 3 {
        return None;
    }
    Some(total_time[0] as i64 | (total_time[1] as i64) << 8 | (total_time[2] as i64) << 16)
}

/// Decodes the big-endian `toPlayerIdx` watermark the client reports in
/// `sram.multiinfo[0:2]` at catch-up time.
pub fn decode_last_delivered(multiinfo: &[u8]) -> i64 {
    if multiinfo.len() < 2 {
        return 0;
    }
    ((multiinfo[0] as i64) << 8) | multiinfo[1] as i64
}

/// Encodes a `toPlayerIdx` as the big-endian byte pair used for the wire
/// `event_idx` field.
pub fn encode_event_idx(idx: i64) -> [u8; 2] {
    let idx = idx as u16;
    idx.to_be_bytes()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_decode_frame_time() {
        assert_eq!(decode_frame_time(&[0x01, 0x02, 0x03]), Some(0x030201));
        assert_eq!(decode_frame_time(&[]), None);
    }

    #[test]
    fn test_decode_last_delivered() {
        assert_eq!(decode_last_delivered(&[0x00, 0x05]), 5);
        assert_eq!(decode_last_delivered(&[0x01, 0x00]), 256);
    }

    #[test]
    fn test_encode_event_idx() {
        assert_eq!(encode_event_idx(1), [0x00, 0x01]);
        assert_eq!(encode_event_idx(256), [0x01, 0x00]);
    }
}
