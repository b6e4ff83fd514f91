//! Broadcast registry
//!
//! The host owns a [`Broadcaster`] and registers receivers against intent
//! filters at startup. Delivery is synchronous on the calling thread; the
//! registry lock is only held while collecting the matching receivers, so a
//! receiver may register or unregister others from inside `on_receive`.

use common::Intent;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, trace};

/// A component that reacts to delivered intents
pub trait BroadcastReceiver: Send + Sync {
    /// Handle one delivery; must not block and must not panic
    fn on_receive(&self, intent: &Intent);
}

/// Set of action tags a receiver is interested in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntentFilter {
    actions: BTreeSet<String>,
}

impl IntentFilter {
    pub fn new(action: impl Into<String>) -> Self {
        Self::default().with_action(action)
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.actions.insert(action.into());
        self
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(String::as_str)
    }

    /// Intents without an action never match
    pub fn matches(&self, intent: &Intent) -> bool {
        intent
            .action()
            .is_some_and(|action| self.actions.contains(action))
    }
}

/// Handle returned by [`Broadcaster::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationId(pub u64);

struct Registration {
    id: RegistrationId,
    filter: IntentFilter,
    receiver: Arc<dyn BroadcastReceiver>,
}

/// Registry of receivers and their filters
#[derive(Default)]
pub struct Broadcaster {
    registrations: RwLock<Vec<Registration>>,
    next_id: AtomicU64,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a receiver; it stays registered until [`Self::unregister`]
    pub fn register(
        &self,
        filter: IntentFilter,
        receiver: Arc<dyn BroadcastReceiver>,
    ) -> RegistrationId {
        let id = RegistrationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        debug!(
            "Registering receiver {} for actions: {:?}",
            id.0,
            filter.actions().collect::<Vec<_>>()
        );

        let mut registrations = self
            .registrations
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        registrations.push(Registration {
            id,
            filter,
            receiver,
        });
        id
    }

    /// Remove a registration; returns false if it was not registered
    pub fn unregister(&self, id: RegistrationId) -> bool {
        let mut registrations = self
            .registrations
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = registrations.len();
        registrations.retain(|r| r.id != id);
        let removed = registrations.len() != before;
        if removed {
            debug!("Unregistered receiver {}", id.0);
        }
        removed
    }

    /// Deliver an intent to every receiver whose filter matches
    ///
    /// Returns the number of receivers the intent was delivered to.
    pub fn dispatch(&self, intent: &Intent) -> usize {
        let targets: Vec<Arc<dyn BroadcastReceiver>> = {
            let registrations = self
                .registrations
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            registrations
                .iter()
                .filter(|r| r.filter.matches(intent))
                .map(|r| Arc::clone(&r.receiver))
                .collect()
        };

        trace!(
            "Dispatching {:?} to {} receiver(s)",
            intent.action(),
            targets.len()
        );
        for receiver in &targets {
            receiver.on_receive(intent);
        }
        targets.len()
    }

    pub fn len(&self) -> usize {
        self.registrations
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
