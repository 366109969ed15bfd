/// Options to control offer generation. The surface is reserved: supplying
/// options to create_offer is rejected until ICE restarts are implemented.
#[derive(Default, Debug, Copy, Clone)]
pub struct RTCOfferOptions {
    pub ice_restart: bool,
}

/// Options to control answer generation. The surface is reserved.
#[derive(Default, Debug, Copy, Clone)]
pub struct RTCAnswerOptions;
