/// The only payload the channel carries.
pub const ACTIVATION_MESSAGE: &[u8] = b"ACTIVATE";

/// A recognized inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationMessage {
    Activate,
}

impl ActivationMessage {
    /// Exact byte-for-byte match; anything else is unrecognized.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        (bytes == ACTIVATION_MESSAGE).then_some(ActivationMessage::Activate)
    }

    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            ActivationMessage::Activate => ACTIVATION_MESSAGE,
        }
    }
}
