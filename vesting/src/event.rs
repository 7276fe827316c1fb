//! Events emitted after each committed ledger mutation.

use vestlock_types::AccountId;

/// Ledger-level events that observers can subscribe to via the [`EventBus`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StakingEvent {
    /// Units were deposited by `payer` into `account`'s position `index`.
    Staked {
        account: AccountId,
        payer: AccountId,
        amount: u128,
        index: usize,
        merged: bool,
    },
    /// An extend deposit landed in `account`'s position `index`.
    Extended {
        account: AccountId,
        payer: AccountId,
        amount: u128,
        index: usize,
        merged: bool,
    },
    /// Vested units left `account`'s positions for `recipient`.
    Unstaked {
        account: AccountId,
        recipient: AccountId,
        amount: u128,
    },
    DelegateAdded {
        account: AccountId,
        delegate: AccountId,
    },
    DelegateRemoved {
        account: AccountId,
        delegate: AccountId,
    },
    BoundsUpdated {
        min: u64,
        max: u64,
        default: u64,
    },
    MetadataUpdated {
        name: String,
        symbol: String,
    },
}

/// Synchronous fan-out event bus.
///
/// Listeners are invoked inline after the mutation has been committed.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&StakingEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&StakingEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &StakingEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
