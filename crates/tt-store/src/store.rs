use std::sync::Arc;

use crate::{actions::Action, effect::Effect, reducer::reduce, state::{AppState, Selection}};

/// Callback receiving the (old, new) selection after it changed
pub type Subscriber = Arc<dyn Fn(&Selection, &Selection) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Redux-style Store that holds application state and dispatches actions
///
/// The Store follows the Redux pattern:
/// - Centralized state management
/// - Actions are dispatched to modify state
/// - Pure reducers handle state transitions
/// - State is immutable (replaced on each action)
///
/// On top of that, subscribers observe the selection triple as a unit: one
/// notification per dispatch that changed it, carrying both snapshots.
/// Changes are queued by `dispatch` and handed out by `take_notifications`,
/// so the owner can deliver them without holding a lock on the store.
pub struct Store {
    state: AppState,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    pending: Vec<(Selection, Selection)>,
}

/// Selection changes waiting to be delivered
pub struct Notifications {
    changes: Vec<(Selection, Selection)>,
    subscribers: Vec<Subscriber>,
}

impl Notifications {
    /// Call every subscriber for every change, oldest change first
    pub fn deliver(self) {
        for (previous, current) in &self.changes {
            for subscriber in &self.subscribers {
                subscriber(previous, current);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl Store {
    /// Create a new store with initial state
    pub fn new(initial_state: AppState) -> Self {
        Self {
            state: initial_state,
            subscribers: Vec::new(),
            next_subscription: 0,
            pending: Vec::new(),
        }
    }

    /// Get immutable reference to current state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Dispatch an action to update state
    ///
    /// The action is passed to the root reducer which delegates to the
    /// sub-reducers. A selection change is queued for the subscribers.
    /// Returns a vector of effects to be executed by the caller.
    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        let previous = self.state.tt.selection.clone();

        let (new_state, effects) = reduce(std::mem::take(&mut self.state), &action);
        self.state = new_state;

        if previous != self.state.tt.selection {
            self.pending.push((previous, self.state.tt.selection.clone()));
        }

        effects
    }

    /// Drain queued selection changes together with the current subscribers
    pub fn take_notifications(&mut self) -> Notifications {
        Notifications {
            changes: std::mem::take(&mut self.pending),
            subscribers: self
                .subscribers
                .iter()
                .map(|(_, subscriber)| subscriber.clone())
                .collect(),
        }
    }

    /// Register a selection observer
    pub fn subscribe(&mut self, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, subscriber));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Replace entire state (useful for initialization or testing)
    pub fn replace_state(&mut self, state: AppState) {
        self.state = state;
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}
