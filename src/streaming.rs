//! Chunked embedding for streaming capture pipelines.

use tracing::debug;

use crate::config::WatermarkConfig;
use crate::errors::{Result, WatermarkError};
use crate::protocol::MAX_ID;
use crate::watermarker::Watermarker;

/// Buffers an incoming chunk stream and watermarks it frame by frame.
///
/// Whenever the buffer holds a full frame (`102 * chip_rate` samples) it is
/// embedded with the configured ID and handed downstream, so every emitted
/// frame is independently recoverable by the offline extractor. Outputs
/// preserve input order and total sample count; residue at end of stream is
/// passed through unmodified.
pub struct StreamEmbedder {
    watermarker: Watermarker,
    id: u32,
    buffer: Vec<f32>,
    frame_len: usize,
}

impl StreamEmbedder {
    pub fn new(config: WatermarkConfig, id: u32) -> Result<Self> {
        if id >= MAX_ID {
            return Err(WatermarkError::InvalidId { id });
        }
        let watermarker = Watermarker::new(config)?;
        let frame_len = watermarker.frame_len();
        Ok(Self {
            watermarker,
            id,
            buffer: Vec::with_capacity(frame_len),
            frame_len,
        })
    }

    /// Worst-case buffering latency in seconds: one frame must accumulate
    /// before anything is emitted.
    pub fn latency_seconds(&self) -> f64 {
        self.frame_len as f64 / self.watermarker.config().sample_rate as f64
    }

    /// Feed a chunk; returns watermarked samples ready for output (possibly
    /// empty while the buffer fills).
    pub fn process_chunk(&mut self, chunk: &[f32]) -> Result<Vec<f32>> {
        self.buffer.extend_from_slice(chunk);
        let mut ready = Vec::new();
        while self.buffer.len() >= self.frame_len {
            let frame: Vec<f32> = self.buffer.drain(..self.frame_len).collect();
            ready.extend(self.watermarker.embed(&frame, self.id)?);
            debug!(frame_len = self.frame_len, "embedded streaming frame");
        }
        Ok(ready)
    }

    /// End of stream: any residual samples are emitted as-is.
    pub fn flush(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WatermarkConfig {
        WatermarkConfig {
            chip_rate: 16,
            ..Default::default()
        }
    }

    #[test]
    fn rejects_oversized_id() {
        assert!(matches!(
            StreamEmbedder::new(config(), 1 << 28),
            Err(WatermarkError::InvalidId { .. })
        ));
    }

    #[test]
    fn stream_preserves_total_length_and_order() {
        let mut embedder = StreamEmbedder::new(config(), 77).unwrap();
        let frame_len = 102 * 16;
        let input: Vec<f32> = (0..3 * frame_len + 431)
            .map(|i| (i as f32 * 0.02).sin() * 0.4)
            .collect();

        let mut output = Vec::new();
        for chunk in input.chunks(700) {
            output.extend(embedder.process_chunk(chunk).unwrap());
        }
        output.extend(embedder.flush());

        assert_eq!(output.len(), input.len());
        // The residue past the last whole frame is untouched.
        assert_eq!(output[3 * frame_len..], input[3 * frame_len..]);
        // Each full frame was modified.
        for frame in 0..3 {
            let range = frame * frame_len..(frame + 1) * frame_len;
            assert_ne!(output[range.clone()], input[range]);
        }
    }

    #[test]
    fn nothing_is_emitted_until_a_frame_accumulates() {
        let mut embedder = StreamEmbedder::new(config(), 5).unwrap();
        let out = embedder.process_chunk(&vec![0.1f32; 100]).unwrap();
        assert!(out.is_empty());
        let residue = embedder.flush();
        assert_eq!(residue.len(), 100);
    }

    #[test]
    fn latency_is_one_frame() {
        let embedder = StreamEmbedder::new(config(), 5).unwrap();
        let expected = (102.0 * 16.0) / 44_100.0;
        assert!((embedder.latency_seconds() - expected).abs() < 1e-9);
    }
}
