use std::collections::HashSet;

use super::{CrossingDirection, TrackId};

/// Identities that have already produced an event, one set per direction.
///
/// Membership is permanent until the identity is explicitly forgotten.
#[derive(Debug, Clone, Default)]
pub struct CrossingRegistry {
    entered: HashSet<TrackId>,
    exited: HashSet<TrackId>,
}

impl CrossingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `(direction, id)`; true only the first time the pair is presented.
    pub fn try_register(&mut self, direction: CrossingDirection, id: TrackId) -> bool {
        self.set_mut(direction).insert(id)
    }

    pub fn contains(&self, direction: CrossingDirection, id: TrackId) -> bool {
        match direction {
            CrossingDirection::Enter => self.entered.contains(&id),
            CrossingDirection::Exit => self.exited.contains(&id),
        }
    }

    /// Remove `id` from both directions.
    pub fn forget(&mut self, id: TrackId) {
        self.entered.remove(&id);
        self.exited.remove(&id);
    }

    /// Number of distinct identities registered for `direction`.
    pub fn count(&self, direction: CrossingDirection) -> usize {
        match direction {
            CrossingDirection::Enter => self.entered.len(),
            CrossingDirection::Exit => self.exited.len(),
        }
    }

    fn set_mut(&mut self, direction: CrossingDirection) -> &mut HashSet<TrackId> {
        match direction {
            CrossingDirection::Enter => &mut self.entered,
            CrossingDirection::Exit => &mut self.exited,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_once() {
        let mut registry = CrossingRegistry::new();
        assert!(registry.try_register(CrossingDirection::Enter, 1));
        assert!(!registry.try_register(CrossingDirection::Enter, 1));
        assert!(registry.contains(CrossingDirection::Enter, 1));
    }

    #[test]
    fn test_directions_are_independent() {
        let mut registry = CrossingRegistry::new();
        assert!(registry.try_register(CrossingDirection::Enter, 4));
        assert!(registry.try_register(CrossingDirection::Exit, 4));
        assert!(!registry.try_register(CrossingDirection::Exit, 4));
        assert_eq!(registry.count(CrossingDirection::Enter), 1);
        assert_eq!(registry.count(CrossingDirection::Exit), 1);
    }

    #[test]
    fn test_forget_rearms() {
        let mut registry = CrossingRegistry::new();
        registry.try_register(CrossingDirection::Enter, 9);
        registry.forget(9);
        assert!(!registry.contains(CrossingDirection::Enter, 9));
        assert!(registry.try_register(CrossingDirection::Enter, 9));
    }
}
