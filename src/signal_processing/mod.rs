//! DSP primitives shared by the embedder and the extractor.
//!
//! Everything the transmit side applies to the watermark (band-pass,
//! pre-emphasis) the receive side must apply identically to its correlation
//! references, so these functions live in one place.

pub mod correlation;
pub mod envelope;
pub mod filters;
pub mod spectrum;

// Re-export commonly used items
pub use correlation::{correlate_valid, peak, resample_linear};
pub use envelope::{masking_envelope, zscore_normalize};
pub use filters::{preemphasis, BandpassFilter};
pub use spectrum::shape_spectrum;
