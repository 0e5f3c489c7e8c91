//! Navigation guard
//!
//! Before a view is left, the router asks the guard whether navigation may
//! proceed. The view may answer synchronously, with a future, or with a
//! stream; the guard turns every answer into a stream yielding exactly one
//! boolean.

use futures::future::{self, BoxFuture};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use futures::FutureExt;
use std::fmt;
use std::future::Future;

/// Answer of a view's deactivation check
pub enum Deactivation {
    /// Known right away
    Immediate(bool),
    /// Resolved later, e.g. after a confirmation dialog
    Deferred(BoxFuture<'static, bool>),
    /// First emitted value decides; an empty stream denies
    Stream(BoxStream<'static, bool>),
}

impl Deactivation {
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = bool> + Send + 'static,
    {
        Self::Deferred(future.boxed())
    }

    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = bool> + Send + 'static,
    {
        Self::Stream(stream.boxed())
    }

    /// Normalize into a stream yielding exactly one value
    pub fn into_stream(self) -> BoxStream<'static, bool> {
        match self {
            Self::Immediate(allowed) => stream::once(future::ready(allowed)).boxed(),
            Self::Deferred(pending) => stream::once(pending).boxed(),
            Self::Stream(mut answers) => {
                stream::once(async move { answers.next().await.unwrap_or(false) }).boxed()
            }
        }
    }
}

impl From<bool> for Deactivation {
    fn from(allowed: bool) -> Self {
        Self::Immediate(allowed)
    }
}

impl fmt::Debug for Deactivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate(allowed) => f.debug_tuple("Immediate").field(allowed).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// A view that may veto navigation away from it
pub trait CanComponentDeactivate {
    /// Deactivation check; `None` means the view has none
    fn can_deactivate(&self) -> Option<Deactivation> {
        None
    }
}

/// Decision handed back to the router
pub enum GuardDecision {
    /// Navigation allowed without waiting
    Allow,
    /// Decision pending; the stream yields it exactly once
    Pending(BoxStream<'static, bool>),
}

impl GuardDecision {
    /// Wait for the decision
    pub async fn resolve(self) -> bool {
        match self {
            Self::Allow => true,
            Self::Pending(mut decision) => decision.next().await.unwrap_or(false),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

impl fmt::Debug for GuardDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => f.write_str("Allow"),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Router-facing guard seam
pub trait NavigationGuard<C: ?Sized> {
    fn can_deactivate(&self, component: &C) -> GuardDecision;
}

/// Guard that defers to the view's own deactivation check
#[derive(Debug, Default, Clone, Copy)]
pub struct CanDeactivateGuard;

impl<C: CanComponentDeactivate + ?Sized> NavigationGuard<C> for CanDeactivateGuard {
    fn can_deactivate(&self, component: &C) -> GuardDecision {
        match component.can_deactivate() {
            Some(answer) => {
                tracing::trace!("Deactivation check returned {:?}", answer);
                GuardDecision::Pending(answer.into_stream())
            }
            None => GuardDecision::Allow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tokio::sync::oneshot;

    struct PlainView;

    impl CanComponentDeactivate for PlainView {}

    /// View whose check is built by a closure, counting invocations
    struct CheckedView<F: Fn() -> Deactivation> {
        check: F,
        calls: Cell<u32>,
    }

    impl<F: Fn() -> Deactivation> CheckedView<F> {
        fn new(check: F) -> Self {
            Self {
                check,
                calls: Cell::new(0),
            }
        }
    }

    impl<F: Fn() -> Deactivation> CanComponentDeactivate for CheckedView<F> {
        fn can_deactivate(&self) -> Option<Deactivation> {
            self.calls.set(self.calls.get() + 1);
            Some((self.check)())
        }
    }

    fn collect(decision: GuardDecision) -> Vec<bool> {
        match decision {
            GuardDecision::Allow => vec![true],
            GuardDecision::Pending(stream) => tokio_test::block_on(stream.collect()),
        }
    }

    #[test]
    fn test_view_without_check_is_allowed_immediately() {
        let decision = CanDeactivateGuard.can_deactivate(&PlainView);
        assert!(!decision.is_pending());
        assert!(tokio_test::block_on(decision.resolve()));
    }

    #[test]
    fn test_plain_boolean_is_wrapped_once() {
        for answer in [true, false] {
            let view = CheckedView::new(move || answer.into());
            let decision = CanDeactivateGuard.can_deactivate(&view);
            assert!(decision.is_pending());
            assert_eq!(collect(decision), vec![answer]);
            assert_eq!(view.calls.get(), 1);
        }
    }

    #[test]
    fn test_deferred_answer_is_preserved() {
        let view = CheckedView::new(|| Deactivation::deferred(async { false }));
        assert_eq!(collect(CanDeactivateGuard.can_deactivate(&view)), vec![false]);

        let view = CheckedView::new(|| Deactivation::deferred(async { true }));
        assert_eq!(collect(CanDeactivateGuard.can_deactivate(&view)), vec![true]);
    }

    #[test]
    fn test_deferred_answer_waits_for_resolution() {
        let (tx, rx) = oneshot::channel::<bool>();
        let answer = Deactivation::deferred(async move { rx.await.unwrap_or(false) });

        tx.send(true).unwrap();
        assert_eq!(tokio_test::block_on(answer.into_stream().collect::<Vec<_>>()), vec![true]);
    }

    #[test]
    fn test_stream_answer_yields_first_value_once() {
        let view = CheckedView::new(|| Deactivation::stream(stream::iter(vec![false, true, true])));
        assert_eq!(collect(CanDeactivateGuard.can_deactivate(&view)), vec![false]);
        assert_eq!(view.calls.get(), 1);
    }

    #[test]
    fn test_empty_stream_denies() {
        let view = CheckedView::new(|| Deactivation::stream(stream::empty()));
        let decision = CanDeactivateGuard.can_deactivate(&view);
        assert!(!tokio_test::block_on(decision.resolve()));
    }

    #[test]
    fn test_each_navigation_invokes_check_again() {
        let view = CheckedView::new(|| true.into());
        for _ in 0..3 {
            assert!(tokio_test::block_on(CanDeactivateGuard.can_deactivate(&view).resolve()));
        }
        assert_eq!(view.calls.get(), 3);
    }

    #[test]
    fn test_guard_works_through_trait_object() {
        let views: Vec<Box<dyn CanComponentDeactivate>> = vec![
            Box::new(PlainView),
            Box::new(CheckedView::new(|| false.into())),
        ];
        let results: Vec<bool> = views
            .iter()
            .map(|v| tokio_test::block_on(CanDeactivateGuard.can_deactivate(v.as_ref()).resolve()))
            .collect();
        assert_eq!(results, vec![true, false]);
    }
}
