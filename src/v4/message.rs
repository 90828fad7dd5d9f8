//! BOOTP/DHCP message assembly.
//!
//! A message is the fixed 236-byte BOOTP header, the 4-byte magic cookie,
//! the option stream in insertion order and a single `0xFF` end marker.

use super::{
    field,
    option::{DhcpOption, DhcpOptions, MessageType, OptionCode},
    CodecError,
};
use bytes::{BufMut as _, Bytes, BytesMut};
use std::net::Ipv4Addr;

pub const CHADDR_LEN: usize = 16;
pub const SNAME_LEN: usize = 64;
pub const FILE_LEN: usize = 128;

/// BOOTP header up to and including `file`.
pub const BOOTP_HEADER_LEN: usize = 236;
/// BOOTP header plus the magic cookie.
pub const FIXED_LEN: usize = BOOTP_HEADER_LEN + 4;

pub const MAGIC_COOKIE: u32 = 0x6382_5363;
pub const HLEN_ETHERNET: u8 = 6;
pub const FLAG_BROADCAST: u16 = 0x8000;
pub const END: u8 = 0xFF;

/// BOOTP opcodes (RFC 951).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    BootRequest = 1,
    BootReply = 2,
}

/// Hardware types (RFC 1700).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum HardwareType {
    #[default]
    Ethernet = 1,
    ExperimentalEthernet = 2,
    AmateurRadio = 3,
    TokenRing = 4,
    Chaos = 5,
    Ieee802 = 6,
    Arcnet = 7,
    HyperChannel = 8,
    Lanstar = 9,
}

/// One encode request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFields {
    pub op: Opcode,
    pub htype: HardwareType,
    pub hops: u8,
    pub xid: u32,
    pub secs: u16,
    pub broadcast: bool,
    pub ciaddr: Ipv4Addr,
    pub yiaddr: Ipv4Addr,
    pub siaddr: Ipv4Addr,
    pub giaddr: Ipv4Addr,
    pub chaddr: Bytes,
    pub options: DhcpOptions,
}

impl MessageFields {
    /// A message with every address null and no options.
    pub fn new(op: Opcode, xid: u32, chaddr: Bytes) -> Self {
        Self {
            op,
            htype: HardwareType::Ethernet,
            hops: 0,
            xid,
            secs: 0,
            broadcast: false,
            ciaddr: Ipv4Addr::UNSPECIFIED,
            yiaddr: Ipv4Addr::UNSPECIFIED,
            siaddr: Ipv4Addr::UNSPECIFIED,
            giaddr: Ipv4Addr::UNSPECIFIED,
            chaddr,
            options: DhcpOptions::new(),
        }
    }

    pub fn message_type(&self) -> Option<MessageType> {
        match self.options.get(OptionCode::MessageType) {
            Some(DhcpOption::MessageType(kind)) => Some(*kind),
            _ => None,
        }
    }

    /// Exact length of the encoded message.
    pub fn encoded_len(&self) -> usize {
        FIXED_LEN + self.options.encoded_len() + 1
    }

    /// Checks every fixed-width and length constraint.
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.chaddr.len() > CHADDR_LEN {
            return Err(CodecError::HardwareAddressTooLong {
                len: self.chaddr.len(),
            });
        }
        self.options.iter().try_for_each(DhcpOption::validate)
    }
}

/// Encodes a full message.
///
/// All preconditions are checked before the first byte is written, so an
/// error never leaves a partially built message behind.
pub fn encode_message(fields: &MessageFields) -> Result<Bytes, CodecError> {
    fields.validate()?;

    let mut buf = BytesMut::with_capacity(fields.encoded_len());
    buf.put_u8(fields.op as u8);
    buf.put_u8(fields.htype as u8);
    buf.put_u8(HLEN_ETHERNET);
    buf.put_u8(fields.hops);
    buf.put_slice(&field::be32(fields.xid));
    buf.put_slice(&field::be16(fields.secs));
    let flags = if fields.broadcast { FLAG_BROADCAST } else { 0 };
    buf.put_slice(&field::be16(flags));
    buf.put_slice(&fields.ciaddr.octets());
    buf.put_slice(&fields.yiaddr.octets());
    buf.put_slice(&fields.siaddr.octets());
    buf.put_slice(&fields.giaddr.octets());
    field::put_fixed_bytes(&mut buf, &fields.chaddr, CHADDR_LEN)?;
    buf.put_bytes(0, SNAME_LEN);
    buf.put_bytes(0, FILE_LEN);
    buf.put_slice(&field::be32(MAGIC_COOKIE));

    for option in fields.options.iter() {
        option.encode_into(&mut buf)?;
    }
    buf.put_u8(END);

    tracing::debug!(
        "Encoded {:?} xid={:08x} secs={} ({} options, {} bytes)",
        fields.message_type(),
        fields.xid,
        fields.secs,
        fields.options.len(),
        buf.len()
    );
    Ok(buf.freeze())
}

/// Optional options and header overrides accepted by every builder.
///
/// Options present here are merged after the message's own options: a kind
/// already present is replaced in place, new kinds are appended in field
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraOptions {
    pub hops: Option<u8>,
    pub subnet_mask: Option<Ipv4Addr>,
    pub router: Option<Vec<Ipv4Addr>>,
    pub domain_name_server: Option<Vec<Ipv4Addr>>,
    pub parameter_request_list: Option<Vec<OptionCode>>,
}

impl ExtraOptions {
    fn apply(&self, fields: &mut MessageFields) {
        if let Some(hops) = self.hops {
            fields.hops = hops;
        }
        if let Some(mask) = self.subnet_mask {
            fields.options.insert(DhcpOption::SubnetMask(mask));
        }
        if let Some(routers) = &self.router {
            fields.options.insert(DhcpOption::Router(routers.clone()));
        }
        if let Some(servers) = &self.domain_name_server {
            fields.options.insert(DhcpOption::DomainNameServer(servers.clone()));
        }
        if let Some(codes) = &self.parameter_request_list {
            fields.options.insert(DhcpOption::ParameterRequestList(codes.clone()));
        }
    }
}

/// Transaction-scoped values shared by every message of one exchange.
#[derive(Debug, Clone)]
pub struct MessageContext {
    pub xid: u32,
    pub secs: u16,
    pub chaddr: Bytes,
    pub server: Ipv4Addr,
}

fn base(ctx: &MessageContext, op: Opcode, kind: MessageType) -> MessageFields {
    let mut fields = MessageFields::new(op, ctx.xid, ctx.chaddr.clone());
    fields.secs = ctx.secs;
    fields.options.insert(DhcpOption::MessageType(kind));
    fields
}

/// Constructs a DHCP Discover message.
pub fn build_dhcp_discover(ctx: &MessageContext, extra: &ExtraOptions) -> MessageFields {
    let mut fields = base(ctx, Opcode::BootRequest, MessageType::Discover);
    fields.broadcast = true;
    extra.apply(&mut fields);
    fields
}

/// Constructs a DHCP Offer of `offered` for `lease_time` seconds.
pub fn build_dhcp_offer(
    ctx: &MessageContext,
    offered: Ipv4Addr,
    lease_time: u32,
    extra: &ExtraOptions,
) -> MessageFields {
    let mut fields = base(ctx, Opcode::BootReply, MessageType::Offer);
    fields.yiaddr = offered;
    fields.siaddr = ctx.server;
    fields.options.insert(DhcpOption::IpAddressLeaseTime(lease_time));
    fields.options.insert(DhcpOption::ServerIdentifier(ctx.server));
    extra.apply(&mut fields);
    fields
}

/// Constructs a DHCP Request for `requested`.
pub fn build_dhcp_request(
    ctx: &MessageContext,
    requested: Ipv4Addr,
    extra: &ExtraOptions,
) -> MessageFields {
    let mut fields = base(ctx, Opcode::BootRequest, MessageType::Request);
    fields.siaddr = ctx.server;
    fields.options.insert(DhcpOption::RequestedIpAddress(requested));
    fields.options.insert(DhcpOption::ServerIdentifier(ctx.server));
    extra.apply(&mut fields);
    fields
}

/// Constructs a DHCP Ack binding `accepted` for `lease_time` seconds.
pub fn build_dhcp_ack(
    ctx: &MessageContext,
    accepted: Ipv4Addr,
    lease_time: u32,
    extra: &ExtraOptions,
) -> MessageFields {
    let mut fields = base(ctx, Opcode::BootReply, MessageType::Ack);
    fields.yiaddr = accepted;
    fields.siaddr = ctx.server;
    fields.options.insert(DhcpOption::IpAddressLeaseTime(lease_time));
    fields.options.insert(DhcpOption::ServerIdentifier(ctx.server));
    extra.apply(&mut fields);
    fields
}

/// Constructs a DHCP Nak.
///
/// `extra` is applied like for every other builder, so a NAK may carry
/// hops or network options when the caller asks for them.
pub fn build_dhcp_nak(ctx: &MessageContext, extra: &ExtraOptions) -> MessageFields {
    let mut fields = base(ctx, Opcode::BootReply, MessageType::Nak);
    fields.siaddr = ctx.server;
    extra.apply(&mut fields);
    fields
}
