use futures_core::stream::Stream;
use pin_project::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Stream utilities for observation loops over state and status signals.
pub trait CaseStreamExt: Stream {
    /// Ends the stream after yielding the first item matching `test`.
    ///
    /// Signal streams never terminate on their own; this is how a consumer
    /// watches a store or tracker until some terminal condition (an exit
    /// flag, a finished status) and then falls out of its loop. The item
    /// that matched is still yielded, so the loop body sees the final state.
    ///
    /// The returned stream is fused: once the matching item has been
    /// yielded, further polls return `None` without touching the inner
    /// stream.
    fn stop_after<F>(self, test: F) -> StopAfter<Self, F>
    where
        F: FnMut(&Self::Item) -> bool,
        Self: Sized,
    {
        StopAfter {
            stream: self,
            done: false,
            test,
        }
    }

    /// Resolves with the first item matching `test`, discarding everything
    /// before it.
    ///
    /// For the common "park until the tracker settles" pattern this reads
    /// better than a `stop_after` loop with an empty body. Resolves with
    /// `None` if the stream ends without a match.
    fn wait_for<F>(self, test: F) -> WaitFor<Self, F>
    where
        F: FnMut(&Self::Item) -> bool,
        Self: Sized,
    {
        WaitFor { stream: self, test }
    }
}

impl<T: ?Sized> CaseStreamExt for T where T: Stream {}

/// Stream returned by [`CaseStreamExt::stop_after`].
#[pin_project(project = StopAfterProj)]
#[derive(Debug)]
#[must_use = "Streams do nothing unless polled"]
pub struct StopAfter<S, F> {
    #[pin]
    stream: S,
    done: bool,
    test: F,
}

impl<S, F> Stream for StopAfter<S, F>
where
    S: Stream,
    F: FnMut(&S::Item) -> bool,
{
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let StopAfterProj { stream, done, test } = self.project();

        // Fused: after the terminal yield the inner stream is never polled
        // again, even though a signal stream would happily keep producing.
        if *done {
            return Poll::Ready(None);
        }

        match stream.poll_next(cx) {
            Poll::Ready(Some(item)) => {
                *done = test(&item);
                Poll::Ready(Some(item))
            }
            Poll::Ready(None) => {
                *done = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Future returned by [`CaseStreamExt::wait_for`].
#[pin_project]
#[must_use = "Futures do nothing unless polled"]
pub struct WaitFor<S, F> {
    #[pin]
    stream: S,
    test: F,
}

impl<S, F> Future for WaitFor<S, F>
where
    S: Stream,
    F: FnMut(&S::Item) -> bool,
{
    type Output = Option<S::Item>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();
        loop {
            match this.stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(item)) => {
                    if (this.test)(&item) {
                        return Poll::Ready(Some(item));
                    }
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream::{self, StreamExt};

    #[tokio::test]
    async fn test_stop_after_yields_matching_item_then_ends() {
        let items: Vec<i32> = stream::iter(vec![1, 2, 3, 4, 5])
            .stop_after(|&n| n == 3)
            .collect()
            .await;
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_stop_after_passes_through_when_never_matching() {
        let items: Vec<i32> = stream::iter(vec![1, 2])
            .stop_after(|&n| n == 9)
            .collect()
            .await;
        assert_eq!(items, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_wait_for_resolves_with_first_match() {
        let found = stream::iter(vec![1, 2, 3, 4]).wait_for(|&n| n > 2).await;
        assert_eq!(found, Some(3));
    }

    #[tokio::test]
    async fn test_wait_for_resolves_none_when_stream_ends() {
        let found = stream::iter(vec![1, 2]).wait_for(|&n| n == 9).await;
        assert_eq!(found, None);
    }
}
