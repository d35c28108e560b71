//! Request extractors.
//!
//! - [`caller::CallerId`] -- The user id asserted by the upstream auth layer.

pub mod caller;
