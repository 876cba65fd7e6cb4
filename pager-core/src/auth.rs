//! Actor authorization filtering.

use std::collections::HashSet;

/// Identifier of the external entity supplying input to a session.
pub type ActorId = u64;

/// Decides which actors may interact with a session.
///
/// An empty set permits everyone; a non-empty set permits only its
/// members. Unauthorized input is discarded silently by the session
/// loop and never counts as progress toward its deadline.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationFilter {
    allowed: HashSet<ActorId>,
}

impl AuthorizationFilter {
    /// Build a filter permitting exactly the given actors.
    pub fn new(allowed: impl IntoIterator<Item = ActorId>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    /// Whether `actor` may trigger session actions.
    pub fn is_authorized(&self, actor: ActorId) -> bool {
        self.allowed.is_empty() || self.allowed.contains(&actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_permits_everyone() {
        let filter = AuthorizationFilter::default();
        assert!(filter.is_authorized(1));
        assert!(filter.is_authorized(u64::MAX));
    }

    #[test]
    fn non_empty_set_permits_only_members() {
        let filter = AuthorizationFilter::new([7, 9]);
        assert!(filter.is_authorized(7));
        assert!(filter.is_authorized(9));
        assert!(!filter.is_authorized(8));
    }
}
