use crate::{network::FrameError, v4::CodecError};
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SynthError {
    #[error("DHCP message rejected")]
    Codec(#[from] CodecError),

    #[error("Frame construction failed")]
    Frame(#[from] FrameError),

    #[error("I/O error")]
    Io(#[from] io::Error),

    #[error("Failed to parse MAC address: {0}")]
    MacParse(String),
}
