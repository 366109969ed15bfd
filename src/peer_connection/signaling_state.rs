use std::fmt;

use crate::error::{Error, Result};
use crate::peer_connection::sdp::sdp_type::RTCSdpType;

#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub(crate) enum StateChangeOp {
    #[default]
    SetLocal,
    SetRemote,
}

impl fmt::Display for StateChangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            StateChangeOp::SetLocal => f.write_str("SetLocal"),
            StateChangeOp::SetRemote => f.write_str("SetRemote"),
        }
    }
}

/// Indicates where the connection is in the offer/answer exchange of
/// RFC 3264.
///
/// ## Specifications
///
/// * [W3C](https://w3c.github.io/webrtc-pc/#dom-peerconnection-signaling-state)
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RTCSignalingState {
    Unspecified = 0,

    /// No exchange is in progress: either nothing has been negotiated yet,
    /// or a complete offer/answer round has been applied on both sides.
    #[default]
    Stable,

    /// An offer was generated here and applied locally; the remote answer
    /// is outstanding.
    HaveLocalOffer,

    /// The remote peer's offer has been applied; a local answer is due.
    HaveRemoteOffer,

    /// A local provisional answer is in effect on top of a remote offer.
    HaveLocalPranswer,

    /// A remote provisional answer is in effect on top of a local offer.
    HaveRemotePranswer,

    /// The connection was closed; no further transitions happen.
    Closed,
}

const SIGNALING_STATE_NAMES: &[(RTCSignalingState, &str)] = &[
    (RTCSignalingState::Stable, "stable"),
    (RTCSignalingState::HaveLocalOffer, "have-local-offer"),
    (RTCSignalingState::HaveRemoteOffer, "have-remote-offer"),
    (RTCSignalingState::HaveLocalPranswer, "have-local-pranswer"),
    (RTCSignalingState::HaveRemotePranswer, "have-remote-pranswer"),
    (RTCSignalingState::Closed, "closed"),
];

impl From<&str> for RTCSignalingState {
    fn from(raw: &str) -> Self {
        crate::enum_from_name(SIGNALING_STATE_NAMES, raw, RTCSignalingState::Unspecified)
    }
}

impl fmt::Display for RTCSignalingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(crate::enum_name(SIGNALING_STATE_NAMES, *self))
    }
}

/// The legal moves of the JSEP 4.3.1 state graph, one row per
/// (current state, operation, description type) with the state it leads to.
/// Everything not listed is a protocol violation.
const SIGNALING_TRANSITIONS: &[(
    RTCSignalingState,
    StateChangeOp,
    RTCSdpType,
    RTCSignalingState,
)] = &[
    // initial offer, either direction; a local offer may also be replaced
    (
        RTCSignalingState::Stable,
        StateChangeOp::SetLocal,
        RTCSdpType::Offer,
        RTCSignalingState::HaveLocalOffer,
    ),
    (
        RTCSignalingState::Stable,
        StateChangeOp::SetRemote,
        RTCSdpType::Offer,
        RTCSignalingState::HaveRemoteOffer,
    ),
    (
        RTCSignalingState::HaveLocalOffer,
        StateChangeOp::SetLocal,
        RTCSdpType::Offer,
        RTCSignalingState::HaveLocalOffer,
    ),
    // answers close the round
    (
        RTCSignalingState::HaveLocalOffer,
        StateChangeOp::SetRemote,
        RTCSdpType::Answer,
        RTCSignalingState::Stable,
    ),
    (
        RTCSignalingState::HaveRemoteOffer,
        StateChangeOp::SetLocal,
        RTCSdpType::Answer,
        RTCSignalingState::Stable,
    ),
    // provisional answers interpose, then the final answer lands
    (
        RTCSignalingState::HaveLocalOffer,
        StateChangeOp::SetRemote,
        RTCSdpType::Pranswer,
        RTCSignalingState::HaveRemotePranswer,
    ),
    (
        RTCSignalingState::HaveRemoteOffer,
        StateChangeOp::SetLocal,
        RTCSdpType::Pranswer,
        RTCSignalingState::HaveLocalPranswer,
    ),
    (
        RTCSignalingState::HaveRemotePranswer,
        StateChangeOp::SetRemote,
        RTCSdpType::Answer,
        RTCSignalingState::Stable,
    ),
    (
        RTCSignalingState::HaveLocalPranswer,
        StateChangeOp::SetLocal,
        RTCSdpType::Answer,
        RTCSignalingState::Stable,
    ),
];

/// Validates one proposed signaling move against the transition table.
/// Returns the entered state on success and mutates nothing.
pub(crate) fn check_next_signaling_state(
    cur: RTCSignalingState,
    next: RTCSignalingState,
    op: StateChangeOp,
    sdp_type: RTCSdpType,
) -> Result<RTCSignalingState> {
    if sdp_type == RTCSdpType::Rollback && cur == RTCSignalingState::Stable {
        return Err(Error::ErrSignalingStateCannotRollback);
    }

    let permitted = SIGNALING_TRANSITIONS
        .iter()
        .any(|(from, o, t, to)| *from == cur && *o == op && *t == sdp_type && *to == next);

    if permitted {
        Ok(next)
    } else {
        Err(Error::ErrSignalingStateProposedTransitionInvalid(format!(
            "{op}({sdp_type}) not allowed in {cur}"
        )))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn check(
        cur: RTCSignalingState,
        next: RTCSignalingState,
        op: StateChangeOp,
        sdp_type: RTCSdpType,
    ) -> Result<RTCSignalingState> {
        check_next_signaling_state(cur, next, op, sdp_type)
    }

    #[test]
    fn test_signaling_state_names_round_trip() {
        for (state, name) in SIGNALING_STATE_NAMES {
            assert_eq!(state.to_string(), *name);
            assert_eq!(RTCSignalingState::from(*name), *state);
        }
        assert_eq!(
            RTCSignalingState::from("half-open"),
            RTCSignalingState::Unspecified
        );
        assert_eq!(RTCSignalingState::Unspecified.to_string(), "Unspecified");
    }

    #[test]
    fn test_offerer_side_walk() {
        let after_offer = check(
            RTCSignalingState::Stable,
            RTCSignalingState::HaveLocalOffer,
            StateChangeOp::SetLocal,
            RTCSdpType::Offer,
        )
        .expect("local offer from stable");

        // regenerating the offer keeps the state
        assert!(check(
            after_offer,
            RTCSignalingState::HaveLocalOffer,
            StateChangeOp::SetLocal,
            RTCSdpType::Offer,
        )
        .is_ok());

        // a provisional remote answer, then the final one
        let after_pranswer = check(
            after_offer,
            RTCSignalingState::HaveRemotePranswer,
            StateChangeOp::SetRemote,
            RTCSdpType::Pranswer,
        )
        .expect("remote pranswer");
        assert_eq!(
            check(
                after_pranswer,
                RTCSignalingState::Stable,
                StateChangeOp::SetRemote,
                RTCSdpType::Answer,
            )
            .ok(),
            Some(RTCSignalingState::Stable)
        );
    }

    #[test]
    fn test_answerer_side_walk() {
        let after_offer = check(
            RTCSignalingState::Stable,
            RTCSignalingState::HaveRemoteOffer,
            StateChangeOp::SetRemote,
            RTCSdpType::Offer,
        )
        .expect("remote offer from stable");

        let after_pranswer = check(
            after_offer,
            RTCSignalingState::HaveLocalPranswer,
            StateChangeOp::SetLocal,
            RTCSdpType::Pranswer,
        )
        .expect("local pranswer");
        assert_eq!(
            check(
                after_pranswer,
                RTCSignalingState::Stable,
                StateChangeOp::SetLocal,
                RTCSdpType::Answer,
            )
            .ok(),
            Some(RTCSignalingState::Stable)
        );
    }

    #[test]
    fn test_protocol_violations_are_rejected() {
        // rollback has nothing to roll back to
        assert!(matches!(
            check(
                RTCSignalingState::Stable,
                RTCSignalingState::Stable,
                StateChangeOp::SetRemote,
                RTCSdpType::Rollback,
            ),
            Err(Error::ErrSignalingStateCannotRollback)
        ));

        // an answer out of nowhere
        assert!(check(
            RTCSignalingState::Stable,
            RTCSignalingState::Stable,
            StateChangeOp::SetRemote,
            RTCSdpType::Answer,
        )
        .is_err());

        // a second remote offer while the first is still pending
        assert!(check(
            RTCSignalingState::HaveRemoteOffer,
            RTCSignalingState::HaveRemoteOffer,
            StateChangeOp::SetRemote,
            RTCSdpType::Offer,
        )
        .is_err());

        // crossing the sides: answering our own offer
        assert!(check(
            RTCSignalingState::HaveLocalOffer,
            RTCSignalingState::Stable,
            StateChangeOp::SetLocal,
            RTCSdpType::Answer,
        )
        .is_err());

        // nothing leaves the closed state
        assert!(check(
            RTCSignalingState::Closed,
            RTCSignalingState::HaveLocalOffer,
            StateChangeOp::SetLocal,
            RTCSdpType::Offer,
        )
        .is_err());
    }
}
