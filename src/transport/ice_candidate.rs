use std::fmt;

use crate::error::{Error, Result};

/// The transport protocol of an ICE candidate.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCIceProtocol {
    #[default]
    Unspecified = 0,
    Udp,
    Tcp,
}

const ICE_PROTOCOL_NAMES: &[(RTCIceProtocol, &str)] =
    &[(RTCIceProtocol::Udp, "udp"), (RTCIceProtocol::Tcp, "tcp")];

impl From<&str> for RTCIceProtocol {
    fn from(raw: &str) -> Self {
        // candidate attributes are matched case-insensitively (RFC 5245)
        crate::enum_from_name(
            ICE_PROTOCOL_NAMES,
            raw.to_ascii_lowercase().as_str(),
            RTCIceProtocol::Unspecified,
        )
    }
}

impl fmt::Display for RTCIceProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(crate::enum_name(ICE_PROTOCOL_NAMES, *self))
    }
}

/// The type of an ICE candidate.
///
/// See [RFC 8445 Section 5.1.1](https://tools.ietf.org/html/rfc8445#section-5.1.1).
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCIceCandidateType {
    Unspecified = 0,

    /// A candidate obtained by binding to a local interface address.
    #[default]
    Host,

    /// A candidate observed by a STUN server: the public-side address of a
    /// NAT binding.
    Srflx,

    /// A candidate learned from a STUN Binding request arriving on an
    /// existing binding.
    Prflx,

    /// A candidate obtained from a TURN relay.
    Relay,
}

const ICE_CANDIDATE_TYPE_NAMES: &[(RTCIceCandidateType, &str)] = &[
    (RTCIceCandidateType::Host, "host"),
    (RTCIceCandidateType::Srflx, "srflx"),
    (RTCIceCandidateType::Prflx, "prflx"),
    (RTCIceCandidateType::Relay, "relay"),
];

impl From<&str> for RTCIceCandidateType {
    fn from(raw: &str) -> Self {
        crate::enum_from_name(
            ICE_CANDIDATE_TYPE_NAMES,
            raw,
            RTCIceCandidateType::Unspecified,
        )
    }
}

impl fmt::Display for RTCIceCandidateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(crate::enum_name(ICE_CANDIDATE_TYPE_NAMES, *self))
    }
}

/// A single ICE candidate: the parsed form of one `a=candidate` attribute.
///
/// The attribute grammar is RFC 5245 Section 15.1.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RTCIceCandidate {
    pub foundation: String,
    pub component: u16,
    pub protocol: RTCIceProtocol,
    pub priority: u32,
    pub address: String,
    pub port: u16,
    pub typ: RTCIceCandidateType,
    pub related_address: String,
    pub related_port: u16,
}

impl RTCIceCandidate {
    /// Parses the value of a candidate attribute: the text after
    /// `candidate:`. A leading `candidate:` prefix is tolerated.
    pub fn unmarshal(raw: &str) -> Result<RTCIceCandidate> {
        let raw = raw.trim().trim_start_matches("candidate:");

        let split: Vec<&str> = raw.split_whitespace().collect();
        if split.len() < 8 {
            return Err(Error::ErrAttributeTooShortIceCandidate);
        }

        let foundation = split[0].to_owned();
        let component: u16 = split[1]
            .parse()
            .map_err(|_| Error::ErrAttributeTooShortIceCandidate)?;
        let protocol = RTCIceProtocol::from(split[2]);
        if protocol == RTCIceProtocol::Unspecified {
            return Err(Error::ErrAttributeTooShortIceCandidate);
        }
        let priority: u32 = split[3]
            .parse()
            .map_err(|_| Error::ErrAttributeTooShortIceCandidate)?;
        let address = split[4].to_owned();
        let port: u16 = split[5].parse().map_err(|_| Error::ErrInvalidPortNumber)?;

        if split[6] != "typ" {
            return Err(Error::ErrParseTyp);
        }
        let typ = RTCIceCandidateType::from(split[7]);
        if typ == RTCIceCandidateType::Unspecified {
            return Err(Error::ErrUnknownCandidateType);
        }

        let mut related_address = String::new();
        let mut related_port = 0;

        if split.len() > 8 {
            let split2 = &split[8..];
            if split2[0] == "raddr" {
                if split2.len() < 4 || split2[2] != "rport" {
                    return Err(Error::ErrParseRelatedAddr);
                }
                related_address = split2[1].to_owned();
                related_port = split2[3].parse().map_err(|_| Error::ErrParseRelatedAddr)?;
            }
        }

        Ok(RTCIceCandidate {
            foundation,
            component,
            protocol,
            priority,
            address,
            port,
            typ,
            related_address,
            related_port,
        })
    }

    /// Renders the candidate as the value of an `a=candidate` attribute for
    /// the given component.
    pub fn marshal_with_component(&self, component: u16) -> String {
        let mut value = format!(
            "{} {} {} {} {} {} typ {}",
            self.foundation, component, self.protocol, self.priority, self.address, self.port,
            self.typ
        );
        if !self.related_address.is_empty() {
            value += &format!(" raddr {} rport {}", self.related_address, self.related_port);
        }
        value
    }

    /// Renders the candidate with its own component.
    pub fn marshal(&self) -> String {
        self.marshal_with_component(self.component)
    }
}

impl fmt::Display for RTCIceCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}:{}",
            self.protocol, self.typ, self.address, self.port
        )
    }
}
