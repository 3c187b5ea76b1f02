//! Utility and helper functions needed for:
//! - Access control checks
//! - Error handling
//! - Fixed point and type casting helpers

pub(crate) mod common;
pub(crate) mod error;
