//! DHCPv4 message codec
//!
//! This module contains the DHCPv4-specific implementation including:
//! - Fixed-width field encoders
//! - Option (TLV) encoding
//! - BOOTP header and full message assembly
//! - Transaction identity generation

pub mod field;
pub mod message;
pub mod option;
pub mod transaction;


use thiserror::Error;

pub use message::{
    build_dhcp_ack, build_dhcp_discover, build_dhcp_nak, build_dhcp_offer, build_dhcp_request,
    encode_message, ExtraOptions, HardwareType, MessageContext, MessageFields, Opcode,
};
pub use option::{encode_option, DhcpOption, DhcpOptions, MessageType, OptionCode};
pub use transaction::{elapsed_seconds, Transaction, TransactionIdGenerator};

/// Structural violations rejected before any byte is emitted.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    #[error("Hardware address is {len} bytes, at most 16 fit in chaddr")]
    HardwareAddressTooLong { len: usize },

    #[error("{len} bytes do not fit a {width}-byte field")]
    FieldTooWide { len: usize, width: usize },

    #[error("Option {code} payload is {len} bytes, at most 255 allowed")]
    OptionTooLong { code: OptionCode, len: usize },

    #[error("Unknown DHCP message type '{0}'")]
    UnknownMessageType(String),

    #[error("Unknown DHCP option '{0}'")]
    UnknownOption(String),
}
