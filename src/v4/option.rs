//! DHCP option encoding (RFC 1497 / RFC 2132 subset).
//!
//! Each option is emitted as `[code][length][payload]`. Only the kinds
//! listed in [`OptionCode`] are supported; the payload shape is fixed by
//! the [`DhcpOption`] variant.

use super::{field, CodecError};
use bytes::BufMut;
use std::{fmt, net::Ipv4Addr, str::FromStr};

/// Largest payload a one-byte length prefix can describe.
pub const MAX_OPTION_LEN: usize = u8::MAX as usize;

/// Codes of the supported options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OptionCode {
    SubnetMask = 1,
    Router = 3,
    DomainNameServer = 6,
    RequestedIpAddress = 50,
    IpAddressLeaseTime = 51,
    MessageType = 53,
    ServerIdentifier = 54,
    ParameterRequestList = 55,
}

impl OptionCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionCode::SubnetMask => "subnet_mask",
            OptionCode::Router => "router",
            OptionCode::DomainNameServer => "domain_name_server",
            OptionCode::RequestedIpAddress => "requested_ip_address",
            OptionCode::IpAddressLeaseTime => "ip_address_lease_time",
            OptionCode::MessageType => "dhcp_message_type",
            OptionCode::ServerIdentifier => "dhcp_server",
            OptionCode::ParameterRequestList => "parameter_request_list",
        }
    }
}

impl From<OptionCode> for u8 {
    fn from(code: OptionCode) -> u8 {
        code as u8
    }
}

impl fmt::Display for OptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.as_str(), *self as u8)
    }
}

impl FromStr for OptionCode {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subnet_mask" => Ok(OptionCode::SubnetMask),
            "router" => Ok(OptionCode::Router),
            "domain_name_server" => Ok(OptionCode::DomainNameServer),
            "requested_ip_address" => Ok(OptionCode::RequestedIpAddress),
            "ip_address_lease_time" => Ok(OptionCode::IpAddressLeaseTime),
            "dhcp_message_type" => Ok(OptionCode::MessageType),
            "dhcp_server" => Ok(OptionCode::ServerIdentifier),
            "parameter_request_list" => Ok(OptionCode::ParameterRequestList),
            other => Err(CodecError::UnknownOption(other.to_string())),
        }
    }
}

/// Values of the DHCP message type option (53).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    Discover = 1,
    Offer = 2,
    Request = 3,
    Decline = 4,
    Ack = 5,
    Nak = 6,
    Release = 7,
    Inform = 8,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Discover => "discover",
            MessageType::Offer => "offer",
            MessageType::Request => "request",
            MessageType::Decline => "decline",
            MessageType::Ack => "ack",
            MessageType::Nak => "nak",
            MessageType::Release => "release",
            MessageType::Inform => "inform",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discover" => Ok(MessageType::Discover),
            "offer" => Ok(MessageType::Offer),
            "request" => Ok(MessageType::Request),
            "decline" => Ok(MessageType::Decline),
            "ack" => Ok(MessageType::Ack),
            "nak" => Ok(MessageType::Nak),
            "release" => Ok(MessageType::Release),
            "inform" => Ok(MessageType::Inform),
            other => Err(CodecError::UnknownMessageType(other.to_string())),
        }
    }
}

/// A single option with its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DhcpOption {
    SubnetMask(Ipv4Addr),
    Router(Vec<Ipv4Addr>),
    DomainNameServer(Vec<Ipv4Addr>),
    RequestedIpAddress(Ipv4Addr),
    IpAddressLeaseTime(u32),
    MessageType(MessageType),
    ServerIdentifier(Ipv4Addr),
    ParameterRequestList(Vec<OptionCode>),
}

impl DhcpOption {
    pub fn code(&self) -> OptionCode {
        match self {
            DhcpOption::SubnetMask(_) => OptionCode::SubnetMask,
            DhcpOption::Router(_) => OptionCode::Router,
            DhcpOption::DomainNameServer(_) => OptionCode::DomainNameServer,
            DhcpOption::RequestedIpAddress(_) => OptionCode::RequestedIpAddress,
            DhcpOption::IpAddressLeaseTime(_) => OptionCode::IpAddressLeaseTime,
            DhcpOption::MessageType(_) => OptionCode::MessageType,
            DhcpOption::ServerIdentifier(_) => OptionCode::ServerIdentifier,
            DhcpOption::ParameterRequestList(_) => OptionCode::ParameterRequestList,
        }
    }

    /// Number of payload bytes, excluding the code and length prefix.
    pub fn payload_len(&self) -> usize {
        match self {
            DhcpOption::SubnetMask(_)
            | DhcpOption::RequestedIpAddress(_)
            | DhcpOption::ServerIdentifier(_)
            | DhcpOption::IpAddressLeaseTime(_) => 4,
            DhcpOption::Router(addrs) | DhcpOption::DomainNameServer(addrs) => 4 * addrs.len(),
            DhcpOption::MessageType(_) => 1,
            DhcpOption::ParameterRequestList(codes) => codes.len(),
        }
    }

    /// Bytes this option occupies in the option stream.
    pub fn encoded_len(&self) -> usize {
        2 + self.payload_len()
    }

    /// Checks that the payload fits a one-byte length prefix.
    pub fn validate(&self) -> Result<(), CodecError> {
        let len = self.payload_len();
        if len > MAX_OPTION_LEN {
            return Err(CodecError::OptionTooLong {
                code: self.code(),
                len,
            });
        }
        Ok(())
    }

    /// Writes the option into `buf`. Nothing is written if validation fails.
    pub fn encode_into<B: BufMut>(&self, buf: &mut B) -> Result<(), CodecError> {
        self.validate()?;
        // validated above, the cast cannot truncate
        let len = self.payload_len() as u8;

        buf.put_u8(self.code().into());
        buf.put_u8(len);
        match self {
            DhcpOption::SubnetMask(addr)
            | DhcpOption::RequestedIpAddress(addr)
            | DhcpOption::ServerIdentifier(addr) => buf.put_slice(&addr.octets()),
            DhcpOption::Router(addrs) | DhcpOption::DomainNameServer(addrs) => {
                for addr in addrs {
                    buf.put_slice(&addr.octets());
                }
            }
            DhcpOption::IpAddressLeaseTime(secs) => buf.put_slice(&field::be32(*secs)),
            DhcpOption::MessageType(kind) => buf.put_u8(*kind as u8),
            DhcpOption::ParameterRequestList(codes) => {
                for code in codes {
                    buf.put_u8((*code).into());
                }
            }
        }
        Ok(())
    }
}

/// Encodes one option as `[code][length][payload]`.
pub fn encode_option(option: &DhcpOption) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::with_capacity(option.encoded_len());
    option.encode_into(&mut out)?;
    Ok(out)
}

/// Ordered option map.
///
/// Iteration order is insertion order. Inserting a kind that is already
/// present replaces its value and keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DhcpOptions(Vec<DhcpOption>);

impl DhcpOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, option: DhcpOption) -> Option<DhcpOption> {
        let code = option.code();
        match self.0.iter_mut().find(|o| o.code() == code) {
            Some(slot) => Some(std::mem::replace(slot, option)),
            None => {
                self.0.push(option);
                None
            }
        }
    }

    pub fn get(&self, code: OptionCode) -> Option<&DhcpOption> {
        self.0.iter().find(|o| o.code() == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DhcpOption> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total bytes of the encoded option stream, terminator excluded.
    pub fn encoded_len(&self) -> usize {
        self.0.iter().map(DhcpOption::encoded_len).sum()
    }
}

impl FromIterator<DhcpOption> for DhcpOptions {
    fn from_iter<I: IntoIterator<Item = DhcpOption>>(iter: I) -> Self {
        let mut opts = DhcpOptions::new();
        for option in iter {
            opts.insert(option);
        }
        opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_option_bytes() {
        let opt = DhcpOption::Router(vec![Ipv4Addr::new(192, 168, 1, 1)]);
        assert_eq!(
            encode_option(&opt).unwrap(),
            vec![0x03, 0x04, 0xC0, 0xA8, 0x01, 0x01]
        );
    }

    #[test]
    fn test_length_prefix_matches_payload() {
        let cases = vec![
            DhcpOption::SubnetMask(Ipv4Addr::new(255, 255, 255, 0)),
            DhcpOption::DomainNameServer(vec![
                Ipv4Addr::new(209, 18, 47, 61),
                Ipv4Addr::new(209, 18, 47, 62),
            ]),
            DhcpOption::IpAddressLeaseTime(169200),
            DhcpOption::MessageType(MessageType::Ack),
            DhcpOption::ParameterRequestList(vec![
                OptionCode::SubnetMask,
                OptionCode::Router,
                OptionCode::DomainNameServer,
            ]),
        ];

        for opt in cases {
            let bytes = encode_option(&opt).unwrap();
            assert_eq!(bytes[0], u8::from(opt.code()));
            assert_eq!(bytes[1] as usize, bytes.len() - 2, "{}", opt.code());
        }
    }

    #[test]
    fn test_parameter_request_list_encodes_codes() {
        let opt = DhcpOption::ParameterRequestList(vec![
            OptionCode::SubnetMask,
            OptionCode::Router,
            OptionCode::DomainNameServer,
        ]);
        assert_eq!(encode_option(&opt).unwrap(), vec![55, 3, 1, 3, 6]);
    }

    #[test]
    fn test_oversized_address_list_is_rejected() {
        let opt = DhcpOption::DomainNameServer(vec![Ipv4Addr::LOCALHOST; 64]);
        let err = encode_option(&opt).unwrap_err();
        assert!(matches!(
            err,
            CodecError::OptionTooLong {
                code: OptionCode::DomainNameServer,
                len: 256
            }
        ));

        // 63 addresses is the most a single option can carry
        let opt = DhcpOption::Router(vec![Ipv4Addr::LOCALHOST; 63]);
        assert_eq!(encode_option(&opt).unwrap()[1], 252);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut opts = DhcpOptions::new();
        opts.insert(DhcpOption::MessageType(MessageType::Discover));
        opts.insert(DhcpOption::IpAddressLeaseTime(60));
        let old = opts.insert(DhcpOption::MessageType(MessageType::Request));

        assert_eq!(old, Some(DhcpOption::MessageType(MessageType::Discover)));
        assert_eq!(opts.len(), 2);
        let codes: Vec<_> = opts.iter().map(DhcpOption::code).collect();
        assert_eq!(
            codes,
            vec![OptionCode::MessageType, OptionCode::IpAddressLeaseTime]
        );
        assert_eq!(
            opts.get(OptionCode::MessageType),
            Some(&DhcpOption::MessageType(MessageType::Request))
        );
    }

    #[test]
    fn test_symbol_parsing() {
        assert_eq!("router".parse::<OptionCode>().unwrap(), OptionCode::Router);
        assert_eq!("nak".parse::<MessageType>().unwrap(), MessageType::Nak);
        assert!(matches!(
            "hostname".parse::<OptionCode>(),
            Err(CodecError::UnknownOption(_))
        ));
        assert!(matches!(
            "renew".parse::<MessageType>(),
            Err(CodecError::UnknownMessageType(_))
        ));
    }
}
