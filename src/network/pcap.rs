//! Classic libpcap capture container.
//!
//! Everything is little-endian with microsecond timestamps. See
//! <https://wiki.wireshark.org/Development/LibpcapFileFormat>.

use bytes::{BufMut as _, Bytes, BytesMut};
use std::time::Duration;

pub const PCAP_MAGIC: u32 = 0xa1b2_c3d4;
pub const GLOBAL_HEADER_LEN: usize = 24;
pub const RECORD_HEADER_LEN: usize = 16;
pub const SNAPLEN: u32 = 65535;

/// Captured packet header type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum LinkType {
    Ethernet = 1,
}

/// In-memory capture buffer. The global header is written on creation.
#[derive(Debug)]
pub struct PcapWriter {
    buf: BytesMut,
    packets: usize,
}

impl PcapWriter {
    pub fn new(link_type: LinkType) -> Self {
        let mut buf = BytesMut::with_capacity(4096);
        buf.put_u32_le(PCAP_MAGIC);
        buf.put_u16_le(2); // major version
        buf.put_u16_le(4); // minor version
        buf.put_u32_le(0); // timezone (= UTC)
        buf.put_u32_le(0); // accuracy (not used)
        buf.put_u32_le(SNAPLEN);
        buf.put_u32_le(link_type as u32);
        Self { buf, packets: 0 }
    }

    /// Appends one record stamped with `timestamp` since the UNIX epoch.
    pub fn packet(&mut self, timestamp: Duration, frame: &[u8]) {
        let secs = u32::try_from(timestamp.as_secs()).unwrap_or_else(|_| {
            tracing::warn!(
                "Timestamp {}s does not fit a pcap record, clamping to {}",
                timestamp.as_secs(),
                u32::MAX
            );
            u32::MAX
        });
        let len = u32::try_from(frame.len()).unwrap_or(u32::MAX);
        let captured = len.min(SNAPLEN);
        if captured < len {
            tracing::warn!(
                "Frame of {} bytes exceeds snaplen, truncating to {}",
                len,
                SNAPLEN
            );
        }

        self.buf.put_u32_le(secs);
        self.buf.put_u32_le(timestamp.subsec_micros());
        self.buf.put_u32_le(captured);
        self.buf.put_u32_le(len);
        self.buf.put_slice(&frame[..captured as usize]);
        self.packets += 1;
    }

    pub fn packet_count(&self) -> usize {
        self.packets
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

impl Default for PcapWriter {
    fn default() -> Self {
        Self::new(LinkType::Ethernet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_header() {
        let pcap = PcapWriter::default();
        let bytes = pcap.as_bytes();

        assert_eq!(bytes.len(), GLOBAL_HEADER_LEN);
        assert_eq!(&bytes[0..4], &[0xd4, 0xc3, 0xb2, 0xa1]);
        assert_eq!(&bytes[4..8], &[2, 0, 4, 0]);
        assert_eq!(&bytes[16..20], &SNAPLEN.to_le_bytes());
        assert_eq!(&bytes[20..24], &[1, 0, 0, 0]);
        assert!(pcap.is_empty());
    }

    #[test]
    fn test_record_header() {
        let mut pcap = PcapWriter::default();
        pcap.packet(Duration::from_micros(1_500_250), &[0xAA; 42]);

        let record = &pcap.as_bytes()[GLOBAL_HEADER_LEN..];
        assert_eq!(record.len(), RECORD_HEADER_LEN + 42);
        assert_eq!(&record[0..4], &1u32.to_le_bytes());
        assert_eq!(&record[4..8], &500_250u32.to_le_bytes());
        assert_eq!(&record[8..12], &42u32.to_le_bytes());
        assert_eq!(&record[12..16], &42u32.to_le_bytes());
        assert_eq!(pcap.packet_count(), 1);
    }

    #[test]
    fn test_oversized_frame_is_truncated() {
        let mut pcap = PcapWriter::default();
        pcap.packet(Duration::ZERO, &vec![0x55; 70_000]);

        let record = &pcap.as_bytes()[GLOBAL_HEADER_LEN..];
        assert_eq!(&record[8..12], &SNAPLEN.to_le_bytes());
        assert_eq!(&record[12..16], &70_000u32.to_le_bytes());
        assert_eq!(record.len(), RECORD_HEADER_LEN + SNAPLEN as usize);
    }

    #[test]
    fn test_far_future_timestamp_is_clamped() {
        let mut pcap = PcapWriter::default();
        pcap.packet(Duration::MAX, &[0xAA; 4]);

        let record = &pcap.as_bytes()[GLOBAL_HEADER_LEN..];
        assert_eq!(&record[0..4], &u32::MAX.to_le_bytes());
        assert_eq!(&record[4..8], &Duration::MAX.subsec_micros().to_le_bytes());
    }
}
