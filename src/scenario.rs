//! The canned capture produced by the binary.

use crate::{
    config::ConnectionConfig,
    error::SynthError,
    session::Session,
    v4::{ExtraOptions, OptionCode},
};
use std::net::Ipv4Addr;

/// Network parameters handed out in the third exchange.
fn lease_parameters() -> ExtraOptions {
    ExtraOptions {
        subnet_mask: Some(Ipv4Addr::new(255, 255, 255, 0)),
        router: Some(vec![Ipv4Addr::new(192, 168, 1, 1)]),
        domain_name_server: Some(vec![
            Ipv4Addr::new(209, 18, 47, 61),
            Ipv4Addr::new(209, 18, 47, 62),
        ]),
        ..Default::default()
    }
}

/// Records three exchanges:
/// 1. a full acquisition with a two second pause before the ack
/// 2. a request the server refuses with a nak
/// 3. an acquisition where the client asks for, and gets, network parameters
pub fn sample(session: &mut Session, conn: &ConnectionConfig) -> Result<(), SynthError> {
    let none = ExtraOptions::default();

    let addr = Ipv4Addr::new(192, 168, 0, 151);
    let mut tx = session.transaction(conn.clone());
    tx.discover(&none)?;
    tx.offer(addr, 84600, &none)?;
    tx.request(addr, &none)?;
    tx.insert_delay(2);
    tx.ack(addr, 84600, &none)?;

    let addr = Ipv4Addr::new(192, 168, 0, 114);
    let mut tx = session.transaction(conn.clone());
    tx.discover(&none)?;
    tx.offer(addr, 48300, &none)?;
    tx.request(addr, &none)?;
    tx.nak(&none)?;

    let addr = Ipv4Addr::new(192, 168, 0, 111);
    let wanted = ExtraOptions {
        parameter_request_list: Some(vec![
            OptionCode::SubnetMask,
            OptionCode::Router,
            OptionCode::DomainNameServer,
        ]),
        ..Default::default()
    };
    let mut tx = session.transaction(conn.clone());
    tx.discover(&wanted)?;
    tx.offer(addr, 169200, &lease_parameters())?;
    tx.request(addr, &none)?;
    tx.ack(addr, 169200, &lease_parameters())?;

    tracing::info!("Sample scenario recorded {} packets", session.packet_count());
    Ok(())
}
