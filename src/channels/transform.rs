//! # Transform: a mapped channel stage, composed rather than subclassed.
//!
//! [`Channel::transform`] returns a new channel fed by an internal pump that
//! applies the mapping to each item passing through. Backpressure propagates
//! in both directions:
//!
//! ```text
//! producer ──► source ──[pump: f]──► output ──► consumer
//!
//! consumer stalls ─► output blocks ─► pump pauses ─► source fills
//!                 ─► producer sees backpressure on its next write
//! ```
//!
//! The output stage inherits the source's [`ChannelConfig`], so both stages
//! block at the same thresholds.

use crate::channels::channel::{Channel, ReadOutcome};

impl<T: Send + 'static> Channel<T> {
    /// Returns a new channel that lazily applies `f` to each item passing
    /// through, preserving backpressure propagation in both directions.
    ///
    /// The pump runs on the ambient tokio runtime (this method must be called
    /// within one). When this channel reaches end-of-stream the output is
    /// closed; if the output is closed early by its consumer, the pump stops.
    ///
    /// ## Example
    /// ```
    /// use coflow::Channel;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let src: Channel<u32> = Channel::new();
    /// let doubled = src.transform(|n| n * 2);
    ///
    /// src.write(21).unwrap();
    /// src.close();
    ///
    /// assert_eq!(doubled.recv(1).await.into_items(), vec![42]);
    /// assert!(doubled.recv(1).await.is_end_of_stream());
    /// # }
    /// ```
    pub fn transform<U, F>(&self, f: F) -> Channel<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + 'static,
    {
        let output = Channel::with_config(self.config());
        let source = self.clone();
        let sink = output.clone();
        tokio::spawn(pump(source, sink, f));
        output
    }
}

/// Internal pipe loop with a mapping stage; mirrors
/// [`Channel::pipe_to`](crate::Channel::pipe_to) semantics.
async fn pump<T, U, F>(source: Channel<T>, sink: Channel<U>, f: F)
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> U + Send + 'static,
{
    loop {
        match source.recv(1).await {
            ReadOutcome::EndOfStream => {
                sink.close();
                return;
            }
            ReadOutcome::Items(items) => {
                for item in items {
                    match sink.write(f(item)) {
                        Ok(outcome) => {
                            if outcome.backpressure {
                                sink.drained().await;
                            }
                        }
                        // Output closed by its consumer: nothing left to feed.
                        Err(_) => return,
                    }
                }
            }
        }
    }
}
