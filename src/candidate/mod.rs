//! Candidate selection and pruning utilities.
//!
//! Includes Top-K collection and distance-based suppression.

pub(crate) mod nms;
pub(crate) mod topk;
