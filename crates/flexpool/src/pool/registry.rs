use crate::WorkerId;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

/// Membership of a pool: which identities currently own a running worker, and
/// the token that stops each of them.
///
/// Not synchronized on its own; the pool keeps it behind a mutex and every
/// read or write goes through that lock.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    members: HashMap<WorkerId, CancellationToken>,
    last_id: u64,
}

impl Registry {
    /// Mints the next identity and registers a child of `root` under it.
    ///
    /// The returned token is the one the new worker must watch.
    pub(crate) fn admit(&mut self, root: &CancellationToken) -> (WorkerId, CancellationToken) {
        let worker_id = self.mint();
        let token = root.child_token();
        self.members.insert(worker_id, token.clone());
        (worker_id, token)
    }

    /// Mints the next identity without registering anything under it.
    pub(crate) fn mint(&mut self) -> WorkerId {
        self.last_id += 1;
        WorkerId::new(self.last_id)
    }

    /// Forgets `worker_id`, handing back its token if it was registered.
    pub(crate) fn evict(&mut self, worker_id: WorkerId) -> Option<CancellationToken> {
        self.members.remove(&worker_id)
    }

    /// Forgets every member and returns how many there were.
    ///
    /// Only used once the root token has fired, so the dropped tokens are
    /// already cancelled.
    pub(crate) fn drain(&mut self) -> usize {
        let count = self.members.len();
        self.members.clear();
        count
    }

    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }

    /// Registered identities in ascending order.
    pub(crate) fn ids(&self) -> Vec<WorkerId> {
        let mut ids: Vec<_> = self.members.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identities_start_at_one_and_increase() {
        let root = CancellationToken::new();
        let mut registry = Registry::default();

        let (a, _) = registry.admit(&root);
        let (b, _) = registry.admit(&root);

        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
        assert_eq!(registry.ids(), vec![a, b]);
    }

    #[test]
    fn evicted_identity_is_not_reused() {
        let root = CancellationToken::new();
        let mut registry = Registry::default();

        let (a, _) = registry.admit(&root);
        assert!(registry.evict(a).is_some());
        assert!(registry.evict(a).is_none());

        let (b, _) = registry.admit(&root);
        assert_ne!(a, b);
        assert_eq!(b.get(), 2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn cancelling_one_member_leaves_the_others_running() {
        let root = CancellationToken::new();
        let mut registry = Registry::default();

        let (a, token_a) = registry.admit(&root);
        let (_, token_b) = registry.admit(&root);

        if let Some(token) = registry.evict(a) {
            token.cancel();
        }

        assert!(token_a.is_cancelled());
        assert!(!token_b.is_cancelled());
        assert!(!root.is_cancelled());
    }

    #[test]
    fn root_cancellation_reaches_every_member() {
        let root = CancellationToken::new();
        let mut registry = Registry::default();

        let (_, token_a) = registry.admit(&root);
        let (_, token_b) = registry.admit(&root);
        root.cancel();

        assert!(token_a.is_cancelled());
        assert!(token_b.is_cancelled());

        // Members admitted after the root fired start out cancelled.
        let (_, late) = registry.admit(&root);
        assert!(late.is_cancelled());
        assert_eq!(registry.drain(), 3);
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn minted_identity_shares_the_counter_but_is_not_a_member() {
        let root = CancellationToken::new();
        let mut registry = Registry::default();

        let (a, _) = registry.admit(&root);
        let minted = registry.mint();
        let (b, _) = registry.admit(&root);

        assert_eq!(minted.get(), 2);
        assert_eq!(b.get(), 3);
        assert_eq!(registry.ids(), vec![a, b]);
    }
}
