//! Generation of offer/answer descriptions and the walk applying a remote
//! description's transport details.

pub(crate) mod sdp_type;
pub(crate) mod session_description;

use log::warn;
use crate::sdp::description::media::MediaDescription;
use crate::sdp::description::session::{
    Origin, SessionDescription, ATTR_KEY_CONNECTION_SETUP, ATTR_KEY_GROUP, ATTR_KEY_MID,
    ATTR_KEY_RTCPMUX, ATTR_KEY_RTCPRSIZE,
};
use crate::sdp::util::ConnectionRole;

use crate::api::media_engine::MediaEngine;
use crate::error::Result;
use crate::media_stream::MediaStreamTrack;
use crate::rtp_transceiver::direction::RTCRtpTransceiverDirection;
use crate::rtp_transceiver::rtp_codec::RtpCodecKind;
use crate::transport::RTCIceCandidate;

pub use sdp_type::RTCSdpType;
pub use session_description::RTCSessionDescription;

pub(crate) const MEDIA_SECTION_APPLICATION: &str = "application";

const ATTR_FINGERPRINT: &str = "fingerprint";
const ATTR_CANDIDATE: &str = "candidate";
const ATTR_END_OF_CANDIDATES: &str = "end-of-candidates";
const ATTR_ICE_UFRAG: &str = "ice-ufrag";
const ATTR_ICE_PWD: &str = "ice-pwd";
const ATTR_SCTPMAP: &str = "sctpmap";

const SCTPMAP_VALUE: &str = "5000 webrtc-datachannel 1024";

/// One media section the builder will emit, in emission order.
pub(crate) struct MediaSection {
    pub(crate) mid: String,
    pub(crate) kind: RtpCodecKind,
    pub(crate) data: bool,
    pub(crate) direction: RTCRtpTransceiverDirection,
    pub(crate) sending_tracks: Vec<MediaStreamTrack>,
}

/// Everything the builder reads besides the section list.
pub(crate) struct PopulateSdpParams<'a> {
    pub(crate) media_engine: &'a MediaEngine,
    pub(crate) fingerprint: &'a str,
    pub(crate) ice_ufrag: &'a str,
    pub(crate) ice_pwd: &'a str,
    pub(crate) candidates: &'a [RTCIceCandidate],
    pub(crate) connection_role: ConnectionRole,
}

/// Emits a JSEP session description: session-level fingerprint, the given
/// media sections in order, and a session-level BUNDLE group listing the
/// mids of the sections actually emitted.
///
/// A non-data section is omitted when the media engine carries no codecs of
/// its kind.
pub(crate) fn populate_sdp(
    media_sections: &[MediaSection],
    params: PopulateSdpParams<'_>,
) -> Result<SessionDescription> {
    let mut d = SessionDescription::new_jsep_session_description(false).with_value_attribute(
        ATTR_FINGERPRINT.to_owned(),
        format!("sha-256 {}", params.fingerprint),
    );

    let mut bundle_value = "BUNDLE".to_owned();

    for section in media_sections {
        if section.data {
            d = d.with_media(data_media_description(section, &params));
        } else {
            match transceiver_media_description(section, &params) {
                Some(media) => d = d.with_media(media),
                None => continue,
            }
        }
        bundle_value += &format!(" {}", section.mid);
    }

    Ok(d.with_value_attribute(ATTR_KEY_GROUP.to_owned(), bundle_value))
}

fn transceiver_media_description(
    section: &MediaSection,
    params: &PopulateSdpParams<'_>,
) -> Option<MediaDescription> {
    let codecs = params.media_engine.codecs_by_kind(section.kind);
    if codecs.is_empty() {
        return None;
    }

    let mut media = MediaDescription::new_jsep_media_description(section.kind.to_string(), vec![])
        .with_value_attribute(
            ATTR_KEY_CONNECTION_SETUP.to_owned(),
            params.connection_role.to_string(),
        )
        .with_value_attribute(ATTR_KEY_MID.to_owned(), section.mid.clone())
        .with_ice_credentials(params.ice_ufrag.to_owned(), params.ice_pwd.to_owned())
        .with_property_attribute(ATTR_KEY_RTCPMUX.to_owned())
        .with_property_attribute(ATTR_KEY_RTCPRSIZE.to_owned());

    for codec in codecs {
        media = media.with_codec(
            codec.payload_type,
            codec.codec.name.clone(),
            codec.codec.clock_rate,
            codec.codec.channels,
            codec.codec.sdp_fmtp_line.clone(),
        );
    }

    for track in &section.sending_tracks {
        media = media.with_media_source(
            track.ssrc(),
            track.label().to_owned(),
            track.label().to_owned(),
            track.id().to_owned(),
        );
    }

    media = media.with_property_attribute(section.direction.to_string());

    Some(append_candidates(media, params.candidates))
}

fn data_media_description(
    section: &MediaSection,
    params: &PopulateSdpParams<'_>,
) -> MediaDescription {
    let mut media =
        MediaDescription::new_jsep_media_description(MEDIA_SECTION_APPLICATION.to_owned(), vec![]);
    media.media_name.protos = vec!["DTLS".to_owned(), "SCTP".to_owned()];
    media.media_name.formats = vec!["5000".to_owned()];

    let media = media
        .with_value_attribute(ATTR_SCTPMAP.to_owned(), SCTPMAP_VALUE.to_owned())
        .with_value_attribute(
            ATTR_KEY_CONNECTION_SETUP.to_owned(),
            params.connection_role.to_string(),
        )
        .with_value_attribute(ATTR_KEY_MID.to_owned(), section.mid.clone())
        .with_ice_credentials(params.ice_ufrag.to_owned(), params.ice_pwd.to_owned());

    append_candidates(media, params.candidates)
}

fn append_candidates(
    mut media: MediaDescription,
    candidates: &[RTCIceCandidate],
) -> MediaDescription {
    for candidate in candidates {
        media = media
            .with_candidate(candidate.marshal_with_component(1))
            .with_candidate(candidate.marshal_with_component(2));
    }
    media.with_property_attribute(ATTR_END_OF_CANDIDATES.to_owned())
}

/// Bumps the origin for a fresh description of the same connection
/// (RFC 3264 requires the version to increase between descriptions).
pub(crate) fn update_sdp_origin(origin: &mut Origin, d: &mut SessionDescription) {
    if origin.session_version == 0 {
        origin.session_id = rand::random::<u64>() >> 2;
        origin.session_version = 2;
    } else {
        origin.session_version += 1;
    }
    d.origin.session_id = origin.session_id;
    d.origin.session_version = origin.session_version;
}

/// The direction rule used when answering: what we emit as our direction
/// given whether we have something to send and what the peer declared.
pub(crate) fn resolve_direction(
    we_send: bool,
    peer_direction: RTCRtpTransceiverDirection,
) -> RTCRtpTransceiverDirection {
    let peer_sends = match peer_direction {
        // an absent direction attribute means sendrecv
        RTCRtpTransceiverDirection::Unspecified => true,
        other => other.has_send(),
    };

    match (we_send, peer_sends) {
        (true, true) => RTCRtpTransceiverDirection::Sendrecv,
        (true, false) => RTCRtpTransceiverDirection::Sendonly,
        (false, true) => RTCRtpTransceiverDirection::Recvonly,
        (false, false) => RTCRtpTransceiverDirection::Inactive,
    }
}

pub(crate) fn get_mid_value(media: &MediaDescription) -> Option<&str> {
    for attr in &media.attributes {
        if attr.key == ATTR_KEY_MID {
            return attr.value.as_deref();
        }
    }
    None
}

/// The direction the remote peer declared on a media section.
pub(crate) fn get_peer_direction(media: &MediaDescription) -> RTCRtpTransceiverDirection {
    for attr in &media.attributes {
        let direction = RTCRtpTransceiverDirection::from(attr.key.as_str());
        if direction != RTCRtpTransceiverDirection::Unspecified {
            return direction;
        }
    }
    RTCRtpTransceiverDirection::Unspecified
}

/// Transport details pulled from a remote description: every parseable ICE
/// candidate plus the remote ICE credentials.
#[derive(Default, Debug)]
pub(crate) struct RemoteIceDetails {
    pub(crate) candidates: Vec<RTCIceCandidate>,
    pub(crate) ufrag: String,
    pub(crate) pwd: String,
}

/// Walks a parsed remote description collecting candidate attributes and
/// ICE credentials. An unparseable candidate line is logged and skipped; it
/// never fails the walk.
pub(crate) fn extract_ice_details(parsed: &SessionDescription) -> RemoteIceDetails {
    let mut details = RemoteIceDetails::default();

    for attr in &parsed.attributes {
        match attr.key.as_str() {
            ATTR_ICE_UFRAG => details.ufrag = attr.value.clone().unwrap_or_default(),
            ATTR_ICE_PWD => details.pwd = attr.value.clone().unwrap_or_default(),
            _ => {}
        }
    }

    for media in &parsed.media_descriptions {
        for attr in &media.attributes {
            match attr.key.as_str() {
                ATTR_ICE_UFRAG => details.ufrag = attr.value.clone().unwrap_or_default(),
                ATTR_ICE_PWD => details.pwd = attr.value.clone().unwrap_or_default(),
                ATTR_CANDIDATE => {
                    let raw = attr.value.as_deref().unwrap_or_default();
                    match RTCIceCandidate::unmarshal(raw) {
                        Ok(candidate) => details.candidates.push(candidate),
                        Err(err) => warn!("discarding invalid remote candidate {raw:?}: {err}"),
                    }
                }
                _ => {}
            }
        }
    }

    details
}
