//! Offer/answer signaling
//!
//! The negotiation protocol between browser clients and the server: one
//! `POST /offer` exchange per session, producing an answer description and a
//! registered, relay-subscribed [`Session`](crate::session::Session).

pub mod codec;
pub mod error;
pub mod payload;
pub mod service;

pub use codec::restrict_codec;
pub use error::SignalingError;
pub use payload::{AnswerPayload, OfferPayload};
pub use service::{build_api, SignalingService};
