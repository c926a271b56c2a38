//! Wire types for the openwith HTTP endpoint.
//!
//! These are the JSON bodies exchanged on `POST /`. They carry no behavior
//! beyond serialization; request handling lives in `openwith-cli`.

pub mod open;

pub use open::*;
