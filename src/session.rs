//! Capture session and transaction sequencing
//!
//! This module drives the codec the way a live exchange would:
//! - A `Session` owns the transaction id generator, the simulated clock and
//!   the capture buffer
//! - A `DhcpTransaction` issues discover/offer/request/ack/nak messages that
//!   share one xid and report elapsed time from the transaction's start

use crate::{
    config::{ConnectionConfig, SessionConfig},
    error::SynthError,
    network::{self, pcap::PcapWriter, Endpoint},
    v4::{self, ExtraOptions, MessageContext, MessageFields, Transaction, TransactionIdGenerator},
};
use bytes::Bytes;
use std::{net::Ipv4Addr, path::Path, time::Duration};

/// Which side of the exchange emits a message.
///
/// Every message is addressed to 255.255.255.255. Only a discover also goes
/// to the link broadcast address; other messages go to the peer's MAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ClientToServer,
    ServerToClient,
}

pub struct Session {
    ids: TransactionIdGenerator,
    clock: Duration,
    packet_gap: Duration,
    capture: PcapWriter,
}

impl Session {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            ids: TransactionIdGenerator::new(config.seed),
            clock: config.start,
            packet_gap: config.packet_gap,
            capture: PcapWriter::default(),
        }
    }

    /// Current simulated time since the UNIX epoch.
    pub fn now(&self) -> Duration {
        self.clock
    }

    /// Moves the simulated clock forward, saturating at `Duration::MAX`.
    pub fn advance(&mut self, by: Duration) {
        self.clock = self.clock.saturating_add(by);
    }

    /// Opens a transaction, drawing its xid from the session's generator.
    pub fn transaction(&mut self, conn: ConnectionConfig) -> DhcpTransaction<'_> {
        let transaction = Transaction::begin(&mut self.ids, self.clock);
        tracing::info!(
            "Transaction {:08x} started for client {}",
            transaction.id(),
            format_mac(&conn.client_mac)
        );
        DhcpTransaction {
            session: self,
            transaction,
            conn,
        }
    }

    /// Frames `payload` and appends it to the capture at the current time.
    pub fn write_datagram(
        &mut self,
        src: &Endpoint,
        dst: &Endpoint,
        payload: &[u8],
    ) -> Result<(), SynthError> {
        let frame = network::udp_frame(src, dst, payload)?;
        self.capture.packet(self.clock, &frame);
        self.advance(self.packet_gap);
        Ok(())
    }

    pub fn packet_count(&self) -> usize {
        self.capture.packet_count()
    }

    pub fn capture(&self) -> &[u8] {
        self.capture.as_bytes()
    }

    pub fn into_capture(self) -> Bytes {
        self.capture.into_bytes()
    }

    /// Writes the capture to `path`.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), SynthError> {
        let path = path.as_ref();
        tokio::fs::write(path, self.capture.as_bytes()).await?;
        tracing::info!(
            "Wrote {} packets ({} bytes) to {}",
            self.capture.packet_count(),
            self.capture.len(),
            path.display()
        );
        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

fn format_mac(mac: &[u8; 6]) -> String {
    mac.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// One DHCP exchange within a session.
///
/// Borrows the session mutably for its lifetime, so messages from different
/// transactions are never interleaved.
pub struct DhcpTransaction<'a> {
    session: &'a mut Session,
    transaction: Transaction,
    conn: ConnectionConfig,
}

impl DhcpTransaction<'_> {
    pub fn id(&self) -> u32 {
        self.transaction.id()
    }

    /// Seconds since the transaction started, as carried in `secs`.
    pub fn current_time(&self) -> u16 {
        self.transaction.elapsed_seconds(self.session.now())
    }

    /// Lets simulated time pass without emitting anything.
    pub fn insert_delay(&mut self, secs: u64) {
        tracing::debug!("Transaction {:08x}: delay {}s", self.id(), secs);
        self.session.advance(Duration::from_secs(secs));
    }

    fn context(&self) -> MessageContext {
        MessageContext {
            xid: self.transaction.id(),
            secs: self.current_time(),
            chaddr: Bytes::copy_from_slice(&self.conn.client_mac),
            server: self.conn.server_ip,
        }
    }

    fn emit(
        &mut self,
        fields: MessageFields,
        direction: Direction,
        link_broadcast: bool,
    ) -> Result<(), SynthError> {
        let payload = v4::encode_message(&fields).map_err(|e| {
            tracing::error!(
                "Transaction {:08x}: {:?} rejected: {}",
                self.id(),
                fields.message_type(),
                e
            );
            e
        })?;

        let (src, mut dst) = match direction {
            Direction::ClientToServer => (
                self.conn.client(),
                Endpoint::broadcast(self.conn.server_port),
            ),
            Direction::ServerToClient => (
                self.conn.server(),
                Endpoint::broadcast(self.conn.client_port),
            ),
        };
        if !link_broadcast {
            dst.mac = match direction {
                Direction::ClientToServer => self.conn.server_mac,
                Direction::ServerToClient => self.conn.client_mac,
            };
        }
        tracing::info!(
            "Transaction {:08x}: {:?} secs={} {} -> {}",
            self.id(),
            fields.message_type(),
            fields.secs,
            src.ip,
            dst.ip
        );
        self.session.write_datagram(&src, &dst, &payload)
    }

    /// DHCPDISCOVER
    pub fn discover(&mut self, extra: &ExtraOptions) -> Result<(), SynthError> {
        let fields = v4::build_dhcp_discover(&self.context(), extra);
        self.emit(fields, Direction::ClientToServer, true)
    }

    /// DHCPOFFER
    pub fn offer(
        &mut self,
        offered: Ipv4Addr,
        lease_time: u32,
        extra: &ExtraOptions,
    ) -> Result<(), SynthError> {
        let fields = v4::build_dhcp_offer(&self.context(), offered, lease_time, extra);
        self.emit(fields, Direction::ServerToClient, false)
    }

    /// DHCPREQUEST
    pub fn request(&mut self, requested: Ipv4Addr, extra: &ExtraOptions) -> Result<(), SynthError> {
        let fields = v4::build_dhcp_request(&self.context(), requested, extra);
        self.emit(fields, Direction::ClientToServer, false)
    }

    /// DHCPACK
    pub fn ack(
        &mut self,
        accepted: Ipv4Addr,
        lease_time: u32,
        extra: &ExtraOptions,
    ) -> Result<(), SynthError> {
        let fields = v4::build_dhcp_ack(&self.context(), accepted, lease_time, extra);
        self.emit(fields, Direction::ServerToClient, false)
    }

    /// DHCPNAK
    pub fn nak(&mut self, extra: &ExtraOptions) -> Result<(), SynthError> {
        let fields = v4::build_dhcp_nak(&self.context(), extra);
        self.emit(fields, Direction::ServerToClient, false)
    }
}
