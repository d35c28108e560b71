//! Domain building blocks shared by every Mingle crate.
//!
//! Nothing in here performs I/O: identifiers, error taxonomy, channel-key
//! parsing, participant-set canonicalisation, room naming and message
//! validation rules.

pub mod channel_key;
pub mod error;
pub mod messaging;
pub mod rooms;
pub mod types;
