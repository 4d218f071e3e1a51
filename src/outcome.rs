//! Lifting raw feeds into tagged outcome streams.
//!
//! A raw feed yields `Result<T, E>` items and ends after its first error.
//! [`lift`] turns it into a stream of [`Outcome`]s that always starts with
//! `Loading`, relays every value as `Success`, and converts a failure into a
//! single final `Error` instead of passing the error on.

use std::fmt::Display;

use futures::stream::{self, BoxStream, Stream, StreamExt};
use tracing::warn;

/// Status of one feed as seen by the state layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Nothing received yet.
    Loading,
    /// The latest value the feed produced.
    Success(T),
    /// The feed failed.  Whatever it delivered before is discarded.
    Error,
}

/// Lift a raw feed into an outcome stream.
///
/// The lifted stream ends right after `Error`, or when the raw feed ends.
/// No retries, buffering or de-duplication happen here.
pub fn lift<S, T, E>(feed: S) -> impl Stream<Item = Outcome<T>>
where
    S: Stream<Item = Result<T, E>> + Unpin,
    E: Display,
{
    let relayed = stream::unfold(Some(feed), |state| async move {
        let mut feed = state?;
        match feed.next().await? {
            Ok(value) => Some((Outcome::Success(value), Some(feed))),
            Err(err) => {
                warn!(error = %err, "feed failed");
                Some((Outcome::Error, None))
            }
        }
    });
    stream::once(async { Outcome::Loading }).chain(relayed)
}

/// Method form of [`lift`], boxed so the result can be stored and sent
/// between tasks.
pub trait LiftOutcomeExt<T, E>: Stream<Item = Result<T, E>> + Sized {
    fn lift_outcome(self) -> BoxStream<'static, Outcome<T>>;
}

impl<S, T, E> LiftOutcomeExt<T, E> for S
where
    S: Stream<Item = Result<T, E>> + Unpin + Send + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
{
    fn lift_outcome(self) -> BoxStream<'static, Outcome<T>> {
        lift(self).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;

    #[tokio::test]
    async fn first_emission_is_loading() {
        let lifted = lift(stream::empty::<Result<u32, String>>());
        let outcomes: Vec<_> = lifted.collect().await;
        assert_eq!(outcomes, vec![Outcome::Loading]);
    }

    #[tokio::test]
    async fn every_value_is_relayed_as_success() {
        let feed = stream::iter(vec![Ok::<_, String>(1), Ok(2), Ok(2)]);
        let outcomes: Vec<_> = feed.lift_outcome().collect().await;
        assert_eq!(
            outcomes,
            vec![
                Outcome::Loading,
                Outcome::Success(1),
                Outcome::Success(2),
                Outcome::Success(2),
            ],
            "values are relayed as-is, repeats included"
        );
    }

    #[tokio::test]
    async fn failure_becomes_a_terminal_error() {
        let feed = stream::iter(vec![Ok(1), Err("boom".to_string()), Ok(3)]);
        let outcomes: Vec<_> = lift(feed).collect().await;
        assert_eq!(
            outcomes,
            vec![Outcome::Loading, Outcome::Success(1), Outcome::Error]
        );
    }

    #[tokio::test]
    async fn raw_feed_is_not_polled_after_failure() {
        let (tx, rx) = mpsc::unbounded::<Result<u32, String>>();
        let mut lifted = Box::pin(lift(rx));

        tx.unbounded_send(Err("down".into())).unwrap();
        assert_eq!(lifted.next().await, Some(Outcome::Loading));
        assert_eq!(lifted.next().await, Some(Outcome::Error));
        assert_eq!(lifted.next().await, None);
        assert!(tx.is_closed(), "raw feed is released once the error is relayed");
    }
}
