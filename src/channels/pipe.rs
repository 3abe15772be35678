//! # Pipe: move items between channels, obeying downstream backpressure.
//!
//! [`Channel::pipe_to`] is the canonical pump loop: receive from self, write
//! into the destination, pause whenever the destination reports backpressure
//! and resume on its drained signal, close the destination at end-of-stream.
//!
//! ## Failure semantics
//! A write error stops the pipe and surfaces to the caller **without closing
//! the source**: linked conduits fail partially, and the source may still be
//! drained by another consumer. The item whose write failed was already
//! consumed from the source and is dropped with the error.

use crate::channels::channel::{Channel, ReadOutcome};
use crate::error::ChannelError;

impl<T> Channel<T> {
    /// Moves items from this channel into `dest` until end-of-stream.
    ///
    /// - Pauses whenever a write into `dest` reports backpressure, resuming
    ///   on `dest`'s drained signal.
    /// - Closes `dest` (and returns the total moved) once this channel
    ///   reaches end-of-stream.
    /// - On a write error, stops and returns the error; this channel is
    ///   **not** closed (see module docs).
    ///
    /// ## Example
    /// ```
    /// use coflow::{Channel, ChannelConfig};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let src: Channel<u32> = Channel::new();
    /// let dst: Channel<u32> = Channel::new();
    ///
    /// for n in 1..=3 {
    ///     src.write(n).unwrap();
    /// }
    /// src.close();
    ///
    /// let moved = src.pipe_to(&dst).await.unwrap();
    /// assert_eq!(moved, 3);
    /// assert_eq!(dst.read(8).into_items(), vec![1, 2, 3]);
    /// assert!(dst.read(8).is_end_of_stream(), "dest closed at end-of-stream");
    /// # }
    /// ```
    pub async fn pipe_to(&self, dest: &Channel<T>) -> Result<u64, ChannelError> {
        let mut moved: u64 = 0;
        loop {
            match self.recv(1).await {
                ReadOutcome::EndOfStream => {
                    dest.close();
                    return Ok(moved);
                }
                ReadOutcome::Items(items) => {
                    for item in items {
                        let outcome = dest.write(item)?;
                        moved += 1;
                        if outcome.backpressure {
                            dest.drained().await;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::config::ChannelConfig;

    #[tokio::test]
    async fn test_pipe_moves_everything_and_closes_dest() {
        let src: Channel<u32> = Channel::new();
        let dst: Channel<u32> = Channel::new();
        for n in 0..10 {
            src.write(n).expect("write");
        }
        src.close();

        let moved = src.pipe_to(&dst).await.expect("pipe");
        assert_eq!(moved, 10);
        assert_eq!(dst.read(32).into_items(), (0..10).collect::<Vec<_>>());
        assert!(dst.read(1).is_end_of_stream());
        assert!(src.read(1).is_end_of_stream());
    }

    #[tokio::test]
    async fn test_pipe_pauses_on_dest_backpressure() {
        let src: Channel<u32> = Channel::new();
        let dst: Channel<u32> =
            Channel::with_config(ChannelConfig::with_capacity(2));
        for n in 0..6 {
            src.write(n).expect("write");
        }
        src.close();

        // Drain the small destination concurrently so the pipe can finish.
        let reader = dst.clone();
        let consumer = tokio::spawn(async move {
            let mut seen = Vec::new();
            loop {
                match reader.recv(1).await {
                    ReadOutcome::EndOfStream => return seen,
                    ReadOutcome::Items(items) => seen.extend(items),
                }
            }
        });

        let moved = src.pipe_to(&dst).await.expect("pipe");
        assert_eq!(moved, 6);
        assert_eq!(consumer.await.expect("consumer"), vec![0, 1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_pipe_error_surfaces_without_closing_source() {
        let src: Channel<u32> = Channel::new();
        let dst: Channel<u32> = Channel::new();
        for n in 0..3 {
            src.write(n).expect("write");
        }
        dst.close();

        let err = src.pipe_to(&dst).await.expect_err("write into closed dest");
        assert_eq!(err, ChannelError::Closed);

        // Source stays open and drainable; only the in-flight item was lost.
        assert!(!src.is_closed());
        assert_eq!(src.read(8).into_items(), vec![1, 2]);
    }
}
