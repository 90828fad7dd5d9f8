use crate::{error::SynthError, network::Endpoint, v4::transaction::DEFAULT_SEED};
use clap::Parser;
use std::{net::Ipv4Addr, num::ParseIntError, path::PathBuf, time::Duration};

pub const DHCP_CLIENT_PORT: u16 = 68;
pub const DHCP_SERVER_PORT: u16 = 67;
pub const DEFAULT_SERVER_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 1);
pub const DEFAULT_CLIENT_MAC: [u8; 6] = [0x00, 0x0c, 0x29, 0xa8, 0x92, 0xf4];
pub const DEFAULT_SERVER_MAC: [u8; 6] = [0x00, 0x0c, 0x29, 0x00, 0x00, 0x01];
/// 2010-01-01T00:00:00Z
pub const DEFAULT_START_SECS: u64 = 1_262_304_000;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Where to write the capture
    #[arg(short, long, default_value = "sample.pcap")]
    pub output: PathBuf,

    /// Seed for transaction ids (decimal or 0x-prefixed hex)
    #[arg(long, default_value = "0xcafe", value_parser = parse_seed)]
    pub seed: u64,

    /// Client hardware address (e.g., '00:0c:29:a8:92:f4')
    #[arg(long, default_value = "00:0c:29:a8:92:f4", value_parser = parse_mac_address)]
    pub client_mac: [u8; 6],

    /// Server hardware address
    #[arg(long, default_value = "00:0c:29:00:00:01", value_parser = parse_mac_address)]
    pub server_mac: [u8; 6],

    /// Server address, also used as the DHCP server identifier
    #[arg(long, default_value_t = DEFAULT_SERVER_IP)]
    pub server_ip: Ipv4Addr,

    /// Capture start time in UNIX seconds
    #[arg(long, default_value_t = DEFAULT_START_SECS)]
    pub start: u64,
}

impl Args {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            seed: self.seed,
            start: Duration::from_secs(self.start),
            ..SessionConfig::default()
        }
    }

    pub fn connection_config(&self) -> ConnectionConfig {
        let mut conn = ConnectionConfig::new(self.client_mac);
        conn.server_mac = self.server_mac;
        conn.server_ip = self.server_ip;
        conn
    }
}

/// Parses a seed given either in decimal or as `0x`-prefixed hex.
pub fn parse_seed(s: &str) -> Result<u64, ParseIntError> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    }
}

/// Parses a MAC address string (e.g., "0a:1b:2c:3d:4e:5f") into six bytes.
pub fn parse_mac_address(mac_str: &str) -> Result<[u8; 6], SynthError> {
    let mut mac = [0u8; 6];
    let mut parts = mac_str.trim().split(':');
    for byte in mac.iter_mut() {
        let part = parts
            .next()
            .ok_or_else(|| SynthError::MacParse(format!("'{mac_str}' has fewer than 6 octets")))?;
        *byte = u8::from_str_radix(part, 16)
            .map_err(|e| SynthError::MacParse(format!("'{mac_str}': {e}")))?;
    }
    if parts.next().is_some() {
        return Err(SynthError::MacParse(format!(
            "'{mac_str}' has more than 6 octets"
        )));
    }
    Ok(mac)
}

/// Addressing of one client/server pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub client_mac: [u8; 6],
    pub client_ip: Ipv4Addr,
    pub client_port: u16,
    pub server_mac: [u8; 6],
    pub server_ip: Ipv4Addr,
    pub server_port: u16,
}

impl ConnectionConfig {
    pub fn new(client_mac: [u8; 6]) -> Self {
        Self {
            client_mac,
            client_ip: Ipv4Addr::UNSPECIFIED,
            client_port: DHCP_CLIENT_PORT,
            server_mac: DEFAULT_SERVER_MAC,
            server_ip: DEFAULT_SERVER_IP,
            server_port: DHCP_SERVER_PORT,
        }
    }

    pub fn client(&self) -> Endpoint {
        Endpoint::new(self.client_mac, self.client_ip, self.client_port)
    }

    pub fn server(&self) -> Endpoint {
        Endpoint::new(self.server_mac, self.server_ip, self.server_port)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CLIENT_MAC)
    }
}

/// Session-wide settings: id seed and simulated clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub seed: u64,
    pub start: Duration,
    /// Simulated time added after every emitted packet.
    pub packet_gap: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            start: Duration::from_secs(DEFAULT_START_SECS),
            packet_gap: Duration::from_millis(10),
        }
    }
}
