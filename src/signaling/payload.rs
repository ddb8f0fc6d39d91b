//! Offer/answer signaling payloads
//!
//! The JSON bodies exchanged over `POST /offer`: `{type, sdp}` in both
//! directions.

use serde::{Deserialize, Serialize};
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

use super::error::SignalingError;

/// Incoming session-description payload
#[derive(Debug, Clone, Deserialize)]
pub struct OfferPayload {
    /// Description type; must be "offer"
    #[serde(rename = "type")]
    pub kind: String,

    /// SDP text
    pub sdp: String,
}

impl OfferPayload {
    /// Validate the payload shape
    ///
    /// The description must be an offer with a non-empty body. SDP syntax
    /// itself is validated by the transport engine when the description is
    /// parsed.
    pub fn validate(&self) -> Result<(), SignalingError> {
        if self.kind != "offer" {
            return Err(SignalingError::InvalidOffer(format!(
                "expected type \"offer\", got \"{}\"",
                self.kind
            )));
        }
        if self.sdp.trim().is_empty() {
            return Err(SignalingError::InvalidOffer("empty sdp".into()));
        }
        Ok(())
    }
}

/// Outgoing answer payload
#[derive(Debug, Clone, Serialize)]
pub struct AnswerPayload {
    /// Always "answer"
    #[serde(rename = "type")]
    pub kind: String,

    /// SDP text
    pub sdp: String,
}

impl From<RTCSessionDescription> for AnswerPayload {
    fn from(desc: RTCSessionDescription) -> Self {
        Self {
            kind: desc.sdp_type.to_string(),
            sdp: desc.sdp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_offer() {
        let payload = OfferPayload {
            kind: "offer".into(),
            sdp: "v=0\r\n".into(),
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_wrong_type_rejected() {
        let payload = OfferPayload {
            kind: "answer".into(),
            sdp: "v=0\r\n".into(),
        };
        assert!(matches!(
            payload.validate(),
            Err(SignalingError::InvalidOffer(_))
        ));
    }

    #[test]
    fn test_empty_sdp_rejected() {
        let payload = OfferPayload {
            kind: "offer".into(),
            sdp: "   ".into(),
        };
        assert!(matches!(
            payload.validate(),
            Err(SignalingError::InvalidOffer(_))
        ));
    }

    #[test]
    fn test_payload_json_field_names() {
        let payload: OfferPayload =
            serde_json::from_str(r#"{"type":"offer","sdp":"v=0"}"#).unwrap();
        assert_eq!(payload.kind, "offer");

        let answer = AnswerPayload {
            kind: "answer".into(),
            sdp: "v=0".into(),
        };
        let json = serde_json::to_string(&answer).unwrap();
        assert!(json.contains(r#""type":"answer""#));
    }

    #[test]
    fn test_missing_field_fails_deserialization() {
        // Missing "sdp" is rejected at the JSON layer
        assert!(serde_json::from_str::<OfferPayload>(r#"{"type":"offer"}"#).is_err());
    }
}
