//! Link/IP/UDP framing for synthesized datagrams.
//!
//! Frames are built in memory with `etherparse`: Ethernet II, a 20-byte IPv4
//! header and a UDP header, each with its checksum filled in.

pub mod pcap;

use bytes::Bytes;
use etherparse::{Ethernet2Header, Ipv4Header, PacketBuilder, UdpHeader};
use std::net::Ipv4Addr;
use thiserror::Error;

pub const ETHERNET_HEADER_LEN: usize = Ethernet2Header::LEN;
pub const IPV4_HEADER_LEN: usize = Ipv4Header::MIN_LEN;
pub const UDP_HEADER_LEN: usize = UdpHeader::LEN;

const DEFAULT_TTL: u8 = 64;

/// Largest UDP payload that fits a single IPv4 datagram.
pub const MAX_UDP_PAYLOAD: usize = u16::MAX as usize - IPV4_HEADER_LEN - UDP_HEADER_LEN;

pub const BROADCAST_MAC: [u8; 6] = [0xff; 6];

/// Defines all possible errors for frame construction.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FrameError {
    #[error("UDP payload of {len} bytes does not fit an IPv4 datagram")]
    PayloadTooLarge { len: usize },

    #[error("Failed to build frame: {0}")]
    Build(String),
}

/// One side of a UDP flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub mac: [u8; 6],
    pub ip: Ipv4Addr,
    pub port: u16,
}

impl Endpoint {
    pub fn new(mac: [u8; 6], ip: Ipv4Addr, port: u16) -> Self {
        Self { mac, ip, port }
    }

    /// Link and network broadcast on `port`.
    pub fn broadcast(port: u16) -> Self {
        Self::new(BROADCAST_MAC, Ipv4Addr::BROADCAST, port)
    }
}

/// Wraps `payload` in UDP, IPv4 and Ethernet headers.
pub fn udp_frame(src: &Endpoint, dst: &Endpoint, payload: &[u8]) -> Result<Bytes, FrameError> {
    if payload.len() > MAX_UDP_PAYLOAD {
        return Err(FrameError::PayloadTooLarge { len: payload.len() });
    }

    let builder = PacketBuilder::ethernet2(src.mac, dst.mac)
        .ipv4(src.ip.octets(), dst.ip.octets(), DEFAULT_TTL)
        .udp(src.port, dst.port);
    let mut frame = Vec::with_capacity(builder.size(payload.len()));
    builder
        .write(&mut frame, payload)
        .map_err(|e| FrameError::Build(e.to_string()))?;
    Ok(Bytes::from(frame))
}

#[cfg(test)]
mod tests {
    use super::*;
    use etherparse::{NetSlice, SlicedPacket, TransportSlice};

    fn client() -> Endpoint {
        Endpoint::new([0x00, 0x0c, 0x29, 0xa8, 0x92, 0xf4], Ipv4Addr::UNSPECIFIED, 68)
    }

    /// RFC 1071 sum; zero when the covered data includes a valid checksum.
    fn ones_complement(chunks: &[&[u8]]) -> u16 {
        let bytes: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
        let mut sum: u32 = bytes
            .chunks(2)
            .map(|w| u32::from(u16::from_be_bytes([w[0], *w.get(1).unwrap_or(&0)])))
            .sum();
        while sum > 0xFFFF {
            sum = (sum & 0xFFFF) + (sum >> 16);
        }
        !(sum as u16)
    }

    #[test]
    fn test_frame_layout() {
        let payload = [0xAB; 11];
        let frame = udp_frame(&client(), &Endpoint::broadcast(67), &payload).unwrap();

        assert_eq!(frame.len(), 14 + 20 + 8 + 11);
        assert_eq!(&frame[0..6], &BROADCAST_MAC);
        assert_eq!(&frame[6..12], &client().mac);
        assert_eq!(&frame[12..14], &[0x08, 0x00]);

        let ip = &frame[14..34];
        assert_eq!(ip[0], 0x45);
        assert_eq!(u16::from_be_bytes([ip[2], ip[3]]), 20 + 8 + 11);
        assert_eq!(ip[8], DEFAULT_TTL);
        assert_eq!(ip[9], 17);
        assert_eq!(&ip[12..16], &[0, 0, 0, 0]);
        assert_eq!(&ip[16..20], &[255, 255, 255, 255]);

        let udp = &frame[34..42];
        assert_eq!(u16::from_be_bytes([udp[0], udp[1]]), 68);
        assert_eq!(u16::from_be_bytes([udp[2], udp[3]]), 67);
        assert_eq!(u16::from_be_bytes([udp[4], udp[5]]), 8 + 11);
        assert_eq!(&frame[42..], &payload);
    }

    #[test]
    fn test_frame_parses_back() {
        let frame = udp_frame(&client(), &Endpoint::broadcast(67), b"dhcp").unwrap();
        let sliced = SlicedPacket::from_ethernet(&frame).unwrap();

        match sliced.net {
            Some(NetSlice::Ipv4(ipv4)) => {
                assert_eq!(ipv4.header().source_addr(), Ipv4Addr::UNSPECIFIED);
                assert_eq!(ipv4.header().destination_addr(), Ipv4Addr::BROADCAST);
            }
            other => panic!("Expected IPv4, got {:?}", other),
        }
        match sliced.transport {
            Some(TransportSlice::Udp(udp)) => {
                assert_eq!(udp.source_port(), 68);
                assert_eq!(udp.destination_port(), 67);
                assert_eq!(udp.payload(), b"dhcp");
            }
            other => panic!("Expected UDP, got {:?}", other),
        }
    }

    #[test]
    fn test_checksums_verify() {
        let frame = udp_frame(&client(), &Endpoint::broadcast(67), b"odd length!").unwrap();

        // a header that includes its own checksum sums to zero
        assert_eq!(ones_complement(&[&frame[14..34]]), 0);

        let mut pseudo = Vec::new();
        pseudo.extend_from_slice(&frame[26..34]);
        pseudo.extend_from_slice(&[0, 17]);
        pseudo.extend_from_slice(&frame[38..40]);
        assert_ne!(&frame[40..42], &[0, 0]);
        assert_eq!(ones_complement(&[&pseudo[..], &frame[34..]]), 0);
    }

    #[test]
    fn test_oversized_payload_is_rejected() {
        let payload = vec![0; MAX_UDP_PAYLOAD + 1];
        assert_eq!(
            udp_frame(&client(), &Endpoint::broadcast(67), &payload),
            Err(FrameError::PayloadTooLarge {
                len: MAX_UDP_PAYLOAD + 1
            })
        );
    }
}
