use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// The broad W3C error categories an [`Error`] maps onto.
///
/// Every error raised by this crate belongs to exactly one of these kinds;
/// use [`Error::kind`] to branch on the category instead of the concrete
/// variant.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation attempted in a state that forbids it (closed connection,
    /// invalid signaling transition).
    InvalidState,
    /// Configuration change violates an immutability rule.
    InvalidModification,
    /// A supplied resource cannot be used (expired certificate, duplicate
    /// track).
    InvalidAccess,
    /// Option or argument shape violation.
    TypeError,
    /// Resource exhaustion.
    OperationError,
    /// Anything wrapping a lower-level failure.
    Unknown,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// ErrConnectionClosed indicates an operation executed after connection
    /// has already been closed.
    #[error("connection closed")]
    ErrConnectionClosed,

    /// ErrDataChannelNotOpen indicates an operation executed when the data
    /// channel is not (yet) open.
    #[error("data channel not open")]
    ErrDataChannelNotOpen,

    /// ErrDataChannelClosed indicates an operation executed after the data
    /// channel has been closed.
    #[error("data channel closed")]
    ErrDataChannelClosed,

    /// ErrCertificateExpired indicates that an x509 certificate has expired.
    #[error("x509Cert expired")]
    ErrCertificateExpired,

    /// ErrNoTurnCredentials indicates that a TURN server URL was provided
    /// without required credentials.
    #[error("turn server credentials required")]
    ErrNoTurnCredentials,

    /// ErrExistingTrack indicates that a track with the same identifier is
    /// already bound to a sender.
    #[error("track already exists")]
    ErrExistingTrack,

    /// ErrPrivateKeyType indicates that a particular private key encryption
    /// chosen to generate a certificate is not supported.
    #[error("private key type not supported")]
    ErrPrivateKeyType,

    /// ErrModifyingPeerIdentity indicates that an attempt to modify
    /// PeerIdentity was made after PeerConnection has been initialized.
    #[error("peerIdentity cannot be modified")]
    ErrModifyingPeerIdentity,

    /// ErrModifyingCertificates indicates that an attempt to modify
    /// Certificates was made after PeerConnection has been initialized.
    #[error("certificates cannot be modified")]
    ErrModifyingCertificates,

    /// ErrModifyingBundlePolicy indicates that an attempt to modify
    /// BundlePolicy was made after PeerConnection has been initialized.
    #[error("bundle policy cannot be modified")]
    ErrModifyingBundlePolicy,

    /// ErrModifyingRTCPMuxPolicy indicates that an attempt to modify
    /// RTCPMuxPolicy was made after PeerConnection has been initialized.
    #[error("rtcp mux policy cannot be modified")]
    ErrModifyingRTCPMuxPolicy,

    /// ErrModifyingICECandidatePoolSize indicates that an attempt to modify
    /// ICECandidatePoolSize was made after a local description has been
    /// generated.
    #[error("ice candidate pool size cannot be modified")]
    ErrModifyingICECandidatePoolSize,

    /// ErrStringSizeLimit indicates that the character size limit of string is
    /// exceeded. The limit is hardcoded to 65535 according to specifications.
    #[error("data channel label exceeds size limit")]
    ErrStringSizeLimit,

    /// ErrNegotiatedWithoutID indicates that an attempt to create a data
    /// channel was made while setting the negotiated option to true without
    /// providing the negotiated channel ID.
    #[error("negotiated set without channel id")]
    ErrNegotiatedWithoutID,

    /// ErrRetransmitsOrPacketLifeTime indicates that an attempt to create a
    /// data channel was made with both options max_packet_life_time and
    /// max_retransmits set together. Such configuration is not supported by
    /// the specification and is mutually exclusive.
    #[error("both max_packet_life_time and max_retransmits was set")]
    ErrRetransmitsOrPacketLifeTime,

    /// ErrMaxDataChannelID indicates that the requested or allocated stream
    /// identifier exceeds what the SCTP transport allows.
    #[error("maximum number of datachannel ids in use")]
    ErrMaxDataChannelID,

    /// ErrDataChannelIDInUse indicates that a negotiated channel was created
    /// with a stream identifier already taken by another channel.
    #[error("data channel id is already in use")]
    ErrDataChannelIDInUse,

    /// ErrCodecNotFound is returned when a codec search to the Media Engine
    /// fails.
    #[error("codec not found")]
    ErrCodecNotFound,

    /// ErrNoRemoteDescription indicates that an operation was rejected because
    /// the remote description is not set.
    #[error("remote description is not set")]
    ErrNoRemoteDescription,

    #[error("identity provider is not implemented")]
    ErrIdentityProviderNotImplemented,

    /// ErrOfferOptionsNotSupported indicates that offer options were supplied
    /// to create_offer; the options surface is reserved.
    #[error("offer options are not supported")]
    ErrOfferOptionsNotSupported,

    /// ErrAnswerOptionsNotSupported indicates that answer options were
    /// supplied to create_answer; the options surface is reserved.
    #[error("answer options are not supported")]
    ErrAnswerOptionsNotSupported,

    #[error("can't rollback from stable state")]
    ErrSignalingStateCannotRollback,

    #[error("invalid proposed signaling state transition: {0}")]
    ErrSignalingStateProposedTransitionInvalid(String),

    #[error("remoteDescription contained media section without mid value")]
    ErrPeerConnRemoteDescriptionWithoutMidValue,

    /// ErrSSRCRequired indicates that a raw RTP track was requested with a
    /// zero SSRC.
    #[error("ssrc must be non-zero for a raw RTP track")]
    ErrSSRCRequired,

    /// ErrIncorrectTrackMode indicates that a write was attempted on a track
    /// channel the track does not carry.
    #[error("track does not carry this stream mode")]
    ErrIncorrectTrackMode,

    #[error("attribute not long enough to be ICE candidate")]
    ErrAttributeTooShortIceCandidate,

    #[error("could not parse related addresses")]
    ErrParseRelatedAddr,

    #[error("could not parse type")]
    ErrParseTyp,

    #[error("unknown candidate type")]
    ErrUnknownCandidateType,

    #[error("invalid port number")]
    ErrInvalidPortNumber,

    #[error("invalid scheme type")]
    ErrSchemeType,

    #[error("invalid hostname")]
    ErrHost,

    /// ErrNoNetworkManagerFactory indicates that a peer connection was
    /// requested from an API that was built without a network manager
    /// factory.
    #[error("no network manager factory configured")]
    ErrNoNetworkManagerFactory,

    /// ErrNetworkManagerGone indicates that the network manager handle was
    /// dropped while a collaborator still referenced it.
    #[error("network manager is gone")]
    ErrNetworkManagerGone,

    #[error(
        "DataChannel message is not long enough to determine type: (expected: {expected}, actual: {actual})"
    )]
    UnexpectedEndOfBuffer { expected: usize, actual: usize },

    #[error("unknown DataChannel message type {0}")]
    InvalidMessageType(u8),

    #[error("unknown DataChannel channel type {0}")]
    InvalidChannelType(u8),

    #[error("IoError: {0}")]
    ErrIoError(#[from] std::io::Error),

    #[error("SdpError: {0}")]
    ErrSdpError(#[from] sdp::Error),

    #[error("UtilError: {0}")]
    ErrUtilError(#[from] util::Error),

    #[error("RtcpError: {0}")]
    ErrRtcpError(#[from] rtcp::Error),

    #[error("RtpError: {0}")]
    ErrRtpError(#[from] rtp::Error),

    #[error("RcgenError: {0}")]
    ErrRcgenError(#[from] rcgen::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ErrConnectionClosed
            | Error::ErrDataChannelNotOpen
            | Error::ErrDataChannelClosed
            | Error::ErrNoRemoteDescription
            | Error::ErrSignalingStateCannotRollback
            | Error::ErrSignalingStateProposedTransitionInvalid(_) => ErrorKind::InvalidState,

            Error::ErrModifyingPeerIdentity
            | Error::ErrModifyingCertificates
            | Error::ErrModifyingBundlePolicy
            | Error::ErrModifyingRTCPMuxPolicy
            | Error::ErrModifyingICECandidatePoolSize => ErrorKind::InvalidModification,

            Error::ErrCertificateExpired | Error::ErrExistingTrack => ErrorKind::InvalidAccess,

            Error::ErrStringSizeLimit
            | Error::ErrNegotiatedWithoutID
            | Error::ErrRetransmitsOrPacketLifeTime
            | Error::ErrSSRCRequired
            | Error::ErrIncorrectTrackMode
            | Error::ErrOfferOptionsNotSupported
            | Error::ErrAnswerOptionsNotSupported
            | Error::ErrNoTurnCredentials
            | Error::ErrSchemeType
            | Error::ErrHost
            | Error::ErrInvalidPortNumber => ErrorKind::TypeError,

            Error::ErrMaxDataChannelID | Error::ErrDataChannelIDInUse => {
                ErrorKind::OperationError
            }

            _ => ErrorKind::Unknown,
        }
    }
}
