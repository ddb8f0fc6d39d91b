//! Codec preference policy
//!
//! Server-side restriction of which codec may be negotiated for an outbound
//! track. This is a narrowing filter over the engine's capability set: it
//! never adds codecs the engine does not already offer.

use std::sync::Arc;

use webrtc::peer_connection::RTCPeerConnection;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecParameters;
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;

use super::error::SignalingError;

/// Retain only codec entries matching the given MIME type
///
/// MIME comparison is ASCII-case-insensitive. A MIME type absent from the
/// capability set yields an empty list.
pub(crate) fn filter_codecs(
    codecs: Vec<RTCRtpCodecParameters>,
    mime_type: &str,
) -> Vec<RTCRtpCodecParameters> {
    codecs
        .into_iter()
        .filter(|codec| codec.capability.mime_type.eq_ignore_ascii_case(mime_type))
        .collect()
}

/// Restrict a sender's transceiver to codecs matching `mime_type`
///
/// The sender must already be attached to a transceiver on `pc`; otherwise
/// this fails with [`SignalingError::SenderNotFound`]. Applied before
/// negotiation completes so the restriction shapes the generated answer.
pub async fn restrict_codec(
    pc: &RTCPeerConnection,
    sender: &Arc<RTCRtpSender>,
    mime_type: &str,
) -> Result<(), SignalingError> {
    let mut transceiver = None;
    for candidate in pc.get_transceivers().await {
        if Arc::ptr_eq(&candidate.sender().await, sender) {
            transceiver = Some(candidate);
            break;
        }
    }
    let transceiver = transceiver.ok_or(SignalingError::SenderNotFound)?;

    let capabilities = sender.get_parameters().await.rtp_parameters.codecs;
    let preferred = filter_codecs(capabilities, mime_type);

    tracing::debug!(
        mime_type,
        codecs = preferred.len(),
        "Applying codec preferences"
    );

    transceiver.set_codec_preferences(preferred).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;

    use super::*;

    fn codec(mime_type: &str, payload_type: u8) -> RTCRtpCodecParameters {
        RTCRtpCodecParameters {
            capability: RTCRtpCodecCapability {
                mime_type: mime_type.to_owned(),
                clock_rate: 90000,
                ..Default::default()
            },
            payload_type,
            ..Default::default()
        }
    }

    #[test]
    fn test_filter_keeps_only_matching_mime() {
        let codecs = vec![
            codec("video/VP8", 96),
            codec("video/H264", 102),
            codec("video/H264", 104),
            codec("video/VP9", 98),
        ];

        let filtered = filter_codecs(codecs, "video/H264");
        assert_eq!(filtered.len(), 2);
        assert!(filtered
            .iter()
            .all(|c| c.capability.mime_type == "video/H264"));
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let codecs = vec![codec("video/H264", 102)];
        let filtered = filter_codecs(codecs, "video/h264");
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_absent_mime_yields_empty_list() {
        let codecs = vec![codec("video/VP8", 96), codec("video/VP9", 98)];
        let filtered = filter_codecs(codecs, "video/AV1");
        assert!(filtered.is_empty());
    }
}
