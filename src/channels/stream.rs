//! # Bridge into the `futures` ecosystem.
//!
//! [`Channel::into_stream`] adapts a channel's read side into a
//! [`futures::Stream`], so downstream code can use combinators
//! (`map`, `collect`, `for_each`, ...) instead of a hand-rolled recv loop.
//! The stream ends when the channel reaches end-of-stream.

use futures::Stream;

use crate::channels::channel::{Channel, ReadOutcome};

impl<T: Send + 'static> Channel<T> {
    /// Consumes this handle and yields buffered items as a [`Stream`].
    ///
    /// Each polled item drains one buffered element; the stream terminates at
    /// end-of-stream. Other clones of the channel remain usable — this only
    /// turns one handle into a stream-shaped consumer.
    ///
    /// ## Example
    /// ```
    /// use futures::StreamExt;
    /// use coflow::Channel;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let chan: Channel<u32> = Channel::new();
    /// for n in 1..=3 {
    ///     chan.write(n).unwrap();
    /// }
    /// chan.close();
    ///
    /// let collected: Vec<u32> = chan.into_stream().collect().await;
    /// assert_eq!(collected, vec![1, 2, 3]);
    /// # }
    /// ```
    pub fn into_stream(self) -> impl Stream<Item = T> + Send {
        futures::stream::unfold(self, |chan| async move {
            loop {
                match chan.recv(1).await {
                    ReadOutcome::EndOfStream => return None,
                    ReadOutcome::Items(mut items) => {
                        if let Some(item) = items.pop() {
                            return Some((item, chan));
                        }
                    }
                }
            }
        })
    }
}
