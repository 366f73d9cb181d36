//! Image instances of one render session.
//!
//! Instances are keyed by node path. Each owns its load state and at most
//! one outstanding subscription. Fetch results are queued in an inbox and
//! applied by [`ImageStore::pump`], tagged with the generation that
//! requested them so results for an abandoned source are dropped.

use crate::img::source::FetchOutcome;
use crate::img::source::ImageListener;
use crate::img::source::ImageSource;
use crate::img::source::Subscription;
use crate::img::state::ImageEvent;
use crate::img::state::ImageLoadState;
use crate::path::NodePath;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;
use tracing::trace;

struct Delivery {
    path: NodePath,
    generation: u64,
    outcome: FetchOutcome,
}

struct ImageInstance {
    uri: Option<String>,
    generation: u64,
    state: ImageLoadState,
    subscription: Option<Subscription>,
    mounted: bool,
}

pub struct ImageStore {
    source: Rc<dyn ImageSource>,
    instances: HashMap<NodePath, ImageInstance>,
    inbox: Rc<RefCell<Vec<Delivery>>>,
    next_generation: u64,
}

impl ImageStore {
    pub fn new(source: Rc<dyn ImageSource>) -> Self {
        Self {
            source,
            instances: HashMap::new(),
            inbox: Rc::default(),
            next_generation: 0,
        }
    }

    /// Mounts (or re-mounts) the instance at `path` for `uri` and returns its
    /// current state. A different `uri` than last time resets the instance.
    pub fn mount(&mut self, path: &NodePath, uri: Option<String>) -> &ImageLoadState {
        let generation = self.next_generation;
        let instance = match self.instances.entry(path.clone()) {
            std::collections::hash_map::Entry::Occupied(entry) => {
                let instance = entry.into_mut();
                instance.mounted = true;
                if instance.uri == uri {
                    return &instance.state;
                }

                debug!(
                    path = %path,
                    from = instance.uri.as_deref().unwrap_or_default(),
                    to = uri.as_deref().unwrap_or_default(),
                    state = instance.state.as_str(),
                    "image source changed"
                );
                if let Some(subscription) = instance.subscription.take() {
                    subscription.unsubscribe();
                }
                if let Some(idle) = instance.state.transition(ImageEvent::SourceChanged) {
                    instance.state = idle;
                }
                instance.uri = uri;
                instance
            }
            std::collections::hash_map::Entry::Vacant(entry) => entry.insert(ImageInstance {
                uri,
                generation,
                state: ImageLoadState::Idle,
                subscription: None,
                mounted: true,
            }),
        };

        self.next_generation += 1;
        start(self.source.as_ref(), &self.inbox, path, generation, instance);
        &instance.state
    }

    /// Applies queued fetch results. Returns the number of state changes;
    /// a non-zero count means the tree should be rendered again.
    pub fn pump(&mut self) -> usize {
        let deliveries = std::mem::take(&mut *self.inbox.borrow_mut());
        let mut applied = 0;

        for delivery in deliveries {
            let Some(instance) = self.instances.get_mut(&delivery.path) else {
                trace!(path = %delivery.path, "dropping result for unmounted image");
                continue;
            };
            if instance.generation != delivery.generation {
                trace!(
                    path = %delivery.path,
                    generation = delivery.generation,
                    current = instance.generation,
                    "dropping stale image result"
                );
                continue;
            }

            let event = match delivery.outcome {
                FetchOutcome::Loaded { natural } => ImageEvent::Loaded { natural },
                FetchOutcome::Failed(error) => ImageEvent::Failed {
                    reason: error.to_string(),
                },
            };
            let Some(next) = instance.state.transition(event) else {
                trace!(path = %delivery.path, state = instance.state.as_str(), "ignoring image result");
                continue;
            };

            debug!(
                path = %delivery.path,
                uri = instance.uri.as_deref().unwrap_or_default(),
                from = instance.state.as_str(),
                to = next.as_str(),
                "image state transition"
            );
            instance.state = next;
            instance.subscription = None;
            applied += 1;
        }

        applied
    }

    pub fn state(&self, path: &NodePath) -> Option<&ImageLoadState> {
        self.instances.get(path).map(|instance| &instance.state)
    }

    /// Paths of mounted instances in document order.
    pub fn paths(&self) -> Vec<NodePath> {
        let mut paths = self.instances.keys().cloned().collect::<Vec<_>>();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub(crate) fn begin_pass(&mut self) {
        for instance in self.instances.values_mut() {
            instance.mounted = false;
        }
    }

    /// Drops instances the last pass did not mount, cancelling their fetches.
    pub(crate) fn end_pass(&mut self) {
        self.instances.retain(|path, instance| {
            if !instance.mounted {
                debug!(path = %path, state = instance.state.as_str(), "image unmounted");
            }
            instance.mounted
        });
    }
}

fn start(
    source: &dyn ImageSource,
    inbox: &Rc<RefCell<Vec<Delivery>>>,
    path: &NodePath,
    generation: u64,
    instance: &mut ImageInstance,
) {
    instance.generation = generation;
    let Some(uri) = instance.uri.clone() else {
        return;
    };
    let Some(loading) = instance.state.transition(ImageEvent::Start) else {
        return;
    };
    debug!(path = %path, uri = %uri, generation, "image fetch started");
    instance.state = loading;

    let inbox = Rc::clone(inbox);
    let key = path.clone();
    let listener: ImageListener = Box::new(move |outcome| {
        inbox.borrow_mut().push(Delivery {
            path: key,
            generation,
            outcome,
        });
    });
    instance.subscription = Some(source.subscribe(&uri, listener));
}
