//! Sub-pixel refinement of response peaks.

pub(crate) mod quad2d;
