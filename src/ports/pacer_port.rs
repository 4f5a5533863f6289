//! Pacing policy port.
//!
//! Remote rate limits are respected with fixed pauses only; making the
//! policy a port keeps the pauses out of tests and leaves room for real
//! backoff later.

pub trait Pacer {
    /// Pause between consecutive fetch chunks.
    fn chunk_pause(&self);

    /// Pause after every block of products within a chunk.
    fn product_pause(&self);
}
