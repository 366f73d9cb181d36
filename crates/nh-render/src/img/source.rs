//! Resource-fetch collaborator interface.
//!
//! Fetching is delegated to an [`ImageSource`], which reports back through a
//! one-shot listener. Sources may call the listener synchronously from
//! `subscribe` or at any later point on the UI thread.

use nh_core::RenderError;
use nh_layout::Size;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Loaded { natural: Size },
    Failed(RenderError),
}

pub type ImageListener = Box<dyn FnOnce(FetchOutcome)>;

pub trait ImageSource {
    /// Starts (or joins) a fetch of `uri`. Dropping the returned
    /// subscription signals that the result is no longer wanted; a source
    /// that still calls the listener afterwards is tolerated.
    fn subscribe(&self, uri: &str, listener: ImageListener) -> Subscription;
}

/// Interest in one pending fetch. Unsubscribes on drop.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to cancel.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[derive(Default)]
struct ManualState {
    next_id: u64,
    pending: BTreeMap<u64, (String, ImageListener)>,
    subscribed: Vec<String>,
    cancelled: Vec<String>,
    keep_cancelled: bool,
}

/// In-memory source whose fetches complete only when told to.
///
/// Handy for hosts that resolve images out of band and for tests.
#[derive(Clone, Default)]
pub struct ManualImageSource {
    state: Rc<RefCell<ManualState>>,
}

impl ManualImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source that keeps listeners after unsubscribe, delivering results
    /// for sources the subscriber already abandoned.
    pub fn ignoring_cancellation() -> Self {
        let source = Self::default();
        source.state.borrow_mut().keep_cancelled = true;
        source
    }

    /// Completes every pending fetch of `uri` with `natural`. Returns how
    /// many listeners were called.
    pub fn resolve(&self, uri: &str, natural: Size) -> usize {
        self.complete(uri, || FetchOutcome::Loaded { natural })
    }

    pub fn fail(&self, uri: &str, reason: &str) -> usize {
        self.complete(uri, || {
            FetchOutcome::Failed(RenderError::resource(
                "render.img.fetch_failed",
                uri,
                reason.to_owned(),
            ))
        })
    }

    pub fn pending(&self, uri: &str) -> usize {
        self.state
            .borrow()
            .pending
            .values()
            .filter(|(pending_uri, _)| pending_uri == uri)
            .count()
    }

    /// Every uri ever subscribed to, in order.
    pub fn subscribed(&self) -> Vec<String> {
        self.state.borrow().subscribed.clone()
    }

    pub fn cancelled(&self) -> Vec<String> {
        self.state.borrow().cancelled.clone()
    }

    fn complete(&self, uri: &str, outcome: impl Fn() -> FetchOutcome) -> usize {
        let listeners = {
            let mut state = self.state.borrow_mut();
            let ids = state
                .pending
                .iter()
                .filter(|(_, (pending_uri, _))| pending_uri == uri)
                .map(|(id, _)| *id)
                .collect::<Vec<_>>();
            ids.into_iter()
                .filter_map(|id| state.pending.remove(&id))
                .map(|(_, listener)| listener)
                .collect::<Vec<_>>()
        };

        let count = listeners.len();
        for listener in listeners {
            listener(outcome());
        }
        count
    }
}

impl ImageSource for ManualImageSource {
    fn subscribe(&self, uri: &str, listener: ImageListener) -> Subscription {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            state.subscribed.push(uri.to_owned());
            state.pending.insert(id, (uri.to_owned(), listener));
            id
        };

        let weak = Rc::downgrade(&self.state);
        let uri = uri.to_owned();
        Subscription::new(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let mut state = state.borrow_mut();
            if state.pending.contains_key(&id) {
                state.cancelled.push(uri);
                if !state.keep_cancelled {
                    state.pending.remove(&id);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::FetchOutcome;
    use super::ImageListener;
    use super::ImageSource;
    use super::ManualImageSource;
    use nh_layout::Size;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<FetchOutcome>>>, ImageListener) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, Box::new(move |outcome| sink.borrow_mut().push(outcome)))
    }

    #[test]
    fn resolve_calls_pending_listener_once() {
        let source = ManualImageSource::new();
        let (seen, listener) = recorder();
        let _subscription = source.subscribe("cat.png", listener);

        assert_eq!(source.pending("cat.png"), 1);
        assert_eq!(source.resolve("cat.png", Size::new(2.0, 1.0)), 1);
        assert_eq!(source.resolve("cat.png", Size::new(2.0, 1.0)), 0);
        assert_eq!(
            *seen.borrow(),
            vec![FetchOutcome::Loaded {
                natural: Size::new(2.0, 1.0)
            }]
        );
    }

    #[test]
    fn dropping_subscription_cancels() {
        let source = ManualImageSource::new();
        let (seen, listener) = recorder();
        drop(source.subscribe("dog.png", listener));

        assert_eq!(source.pending("dog.png"), 0);
        assert_eq!(source.fail("dog.png", "gone"), 0);
        assert!(seen.borrow().is_empty());
        assert_eq!(source.cancelled(), vec!["dog.png".to_owned()]);
    }

    #[test]
    fn ignoring_cancellation_still_delivers() {
        let source = ManualImageSource::ignoring_cancellation();
        let (seen, listener) = recorder();
        source.subscribe("late.png", listener).unsubscribe();

        assert_eq!(source.fail("late.png", "slow"), 1);
        assert!(matches!(seen.borrow().as_slice(), [FetchOutcome::Failed(_)]));
    }
}
