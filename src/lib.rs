//! # PseudoDHCP - Synthetic DHCPv4 Traces
//!
//! PseudoDHCP builds well-formed DHCP/BOOTP messages (RFC 951, RFC 1497,
//! RFC 2131 subset) and records them into a pcap capture without touching a
//! live network. It covers the DORA (Discover, Offer, Request, Acknowledge)
//! exchange plus NAK.
//!
//! ## Features
//!
//! - Byte-exact BOOTP header and DHCP option encoding
//! - Deterministic, seeded transaction ids for reproducible fixtures
//! - Simulated clock driving the `secs` field and capture timestamps
//! - Ethernet/IPv4/UDP framing and a libpcap writer
//!
//! ## Example
//!
//! ```rust,no_run
//! use pseudodhcp::{ConnectionConfig, ExtraOptions, Session, SessionConfig};
//! use std::net::Ipv4Addr;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = Session::new(&SessionConfig::default());
//!     let offered = Ipv4Addr::new(192, 168, 0, 151);
//!
//!     let mut tx = session.transaction(ConnectionConfig::default());
//!     tx.discover(&ExtraOptions::default())?;
//!     tx.offer(offered, 84600, &ExtraOptions::default())?;
//!
//!     session.save("exchange.pcap").await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod network;
pub mod scenario;
pub mod session;
pub mod v4;

pub use config::{Args, ConnectionConfig, SessionConfig};
pub use error::SynthError;
pub use session::{DhcpTransaction, Session};
pub use v4::{encode_message, ExtraOptions, MessageFields};
