//! Vote-target whitelist maintenance.

use crate::keeper::Keeper;
use argus_core::Pair;
use std::collections::BTreeSet;

impl Keeper {
    pub fn is_whitelisted_pair(&self, pair: &Pair) -> bool {
        self.store.whitelisted_pairs.contains(pair)
    }

    /// The active vote-target set, sorted.
    pub fn get_whitelisted_pairs(&self) -> Vec<Pair> {
        self.store.whitelisted_pairs.iter().cloned().collect()
    }

    /// Reconcile the stored whitelist against the params whitelist at the
    /// end of a period. `current_whitelist` is the period's working set, so
    /// a pair the validity filter pruned this period forces a rewrite and
    /// gets re-admitted for the next one.
    pub fn refresh_whitelist(
        &mut self,
        next_whitelist: &[Pair],
        current_whitelist: &BTreeSet<Pair>,
    ) {
        let update_required = current_whitelist.len() != next_whitelist.len()
            || next_whitelist
                .iter()
                .any(|pair| !current_whitelist.contains(pair));

        if update_required {
            self.store.whitelisted_pairs = next_whitelist.iter().cloned().collect();
        }
    }
}
