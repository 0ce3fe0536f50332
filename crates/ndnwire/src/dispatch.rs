//! Decoding a buffer that holds either packet type.

use bytes::Bytes;
use std::fmt;

use ndnwire_core::{tlv, Block};
use ndnwire_name::Name;
use ndnwire_packet::{Data, Interest};
use ndnwire_security::{verify_data, verify_interest, Verifier};

use crate::error::{NdnError, Result};

/// An Interest or a Data, as read off the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Interest(Interest),
    Data(Data),
}

impl Packet {
    /// Decode one packet, dispatching on the outer TLV-TYPE.
    pub fn decode(wire: Bytes) -> Result<Self> {
        let block = Block::decode(wire)?;
        match block.tlv_type() {
            tlv::INTEREST => Ok(Self::Interest(Interest::wire_decode(&block)?)),
            tlv::DATA => Ok(Self::Data(Data::wire_decode(&block)?)),
            other => {
                tracing::debug!(tlv_type = other, "buffer does not hold a packet");
                Err(NdnError::NotAPacket(other))
            }
        }
    }

    pub fn name(&self) -> &Name {
        match self {
            Self::Interest(interest) => interest.name(),
            Self::Data(data) => data.name(),
        }
    }

    pub fn is_interest(&self) -> bool {
        matches!(self, Self::Interest(_))
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data(_))
    }

    /// Verify the packet's signature.
    pub fn verify<V: Verifier>(&self, verifier: &V) -> Result<bool> {
        Ok(match self {
            Self::Interest(interest) => verify_interest(interest, verifier)?,
            Self::Data(data) => verify_data(data, verifier)?,
        })
    }
}

impl From<Interest> for Packet {
    fn from(interest: Interest) -> Self {
        Self::Interest(interest)
    }
}

impl From<Data> for Packet {
    fn from(data: Data) -> Self {
        Self::Data(data)
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interest(interest) => write!(f, "Interest {interest}"),
            Self::Data(data) => write!(f, "Data {}", data.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndnwire_packet::Nonce;
    use ndnwire_security::{sign_data, DigestSha256};

    #[test]
    fn test_dispatch() {
        let mut interest = Interest::new("/a".parse().unwrap()).unwrap();
        interest.set_nonce(Some(Nonce::from(1u32)));
        let packet = Packet::decode(interest.wire_encode().unwrap()).unwrap();
        assert!(packet.is_interest());
        assert_eq!(packet, Packet::from(interest));
        assert_eq!(packet.to_string(), "Interest /a?Nonce=00000001");

        let mut data = Data::new("/d".parse().unwrap());
        let wire = sign_data(&mut data, &DigestSha256).unwrap();
        let packet = Packet::decode(wire).unwrap();
        assert!(packet.is_data());
        assert_eq!(packet.name(), &"/d".parse::<Name>().unwrap());
        assert!(packet.verify(&DigestSha256).unwrap());
    }

    #[test]
    fn test_not_a_packet() {
        let err = Packet::decode(Bytes::from_static(&[0x07, 0x00])).unwrap_err();
        assert!(matches!(err, NdnError::NotAPacket(7)));
        assert!(err.is_decode());

        let err = Packet::decode(Bytes::from_static(&[0x05, 0x05, 0x07])).unwrap_err();
        assert!(err.is_decode());
    }
}
