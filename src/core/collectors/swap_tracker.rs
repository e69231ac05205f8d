use std::collections::{BTreeSet, HashMap};

/// Counts LDM serials that appear on a receiver between polls.
///
/// A receiver's first poll (or a poll following one with no LDMs) only sets
/// the baseline. After that, every serial absent from the previous poll counts
/// as one swap. Removals alone never count, and the total never decreases.
#[derive(Debug, Default)]
pub struct LdmSwapTracker {
    previous: HashMap<String, BTreeSet<String>>,
    total: u64,
}

impl LdmSwapTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the serials seen on `receiver` this poll; returns the swaps found
    pub fn observe(&mut self, receiver: &str, serials: BTreeSet<String>) -> u64 {
        let mut swaps = 0;

        if let Some(previous) = self.previous.get(receiver).filter(|p| !p.is_empty()) {
            for serial in serials.difference(previous) {
                log::info!("LDM ({}) is new to {}", serial, receiver);
                swaps += 1;
            }
        }

        self.total += swaps;
        self.previous.insert(receiver.to_string(), serials);
        swaps
    }

    /// Swaps counted since the process started
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Serials last seen on `receiver`
    pub fn serials(&self, receiver: &str) -> Option<&BTreeSet<String>> {
        self.previous.get(receiver)
    }
}
