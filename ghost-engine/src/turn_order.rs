use crate::error::{GameError, Result};
use crate::types::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Rotating clue order over the living players.
///
/// Seeded once in registration order, rotated once so the ghosts' pick
/// leads, and thinned out as players are eliminated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOrder {
    ring: VecDeque<PlayerId>,
}

impl TurnOrder {
    pub fn new<I>(players: I) -> Self
    where
        I: IntoIterator<Item = PlayerId>,
    {
        Self {
            ring: players.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn front(&self) -> Option<&PlayerId> {
        self.ring.front()
    }

    pub fn get(&self, index: usize) -> Option<&PlayerId> {
        self.ring.get(index)
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.ring.contains(id)
    }

    pub fn position(&self, id: &PlayerId) -> Option<usize> {
        self.ring.iter().position(|p| p == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerId> {
        self.ring.iter()
    }

    /// Rotate until `id` is at the front. Leaves the order untouched if `id`
    /// is not present.
    pub fn rotate_to(&mut self, id: &PlayerId) -> Result<()> {
        let pos = self
            .position(id)
            .ok_or_else(|| GameError::PlayerNotAlive(id.clone()))?;
        self.ring.rotate_left(pos);
        Ok(())
    }

    /// Drop `id`, keeping everyone else in their relative order. Returns
    /// whether anything was removed.
    pub fn remove(&mut self, id: &PlayerId) -> bool {
        match self.position(id) {
            Some(pos) => {
                self.ring.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn to_vec(&self) -> Vec<PlayerId> {
        self.ring.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(names: &[&str]) -> Vec<PlayerId> {
        names.iter().map(|n| PlayerId::new(n).unwrap()).collect()
    }

    #[test]
    fn test_rotate_to_target() {
        let mut order = TurnOrder::new(ids(&["a", "b", "c", "d"]));
        order.rotate_to(&PlayerId::new("c").unwrap()).unwrap();
        assert_eq!(order.to_vec(), ids(&["c", "d", "a", "b"]));
    }

    #[test]
    fn test_rotate_to_missing_is_error() {
        let mut order = TurnOrder::new(ids(&["a", "b"]));
        let missing = PlayerId::new("z").unwrap();
        assert_eq!(
            order.rotate_to(&missing),
            Err(GameError::PlayerNotAlive(missing))
        );
        assert_eq!(order.to_vec(), ids(&["a", "b"]));
    }

    #[test]
    fn test_remove_keeps_relative_order() {
        let mut order = TurnOrder::new(ids(&["a", "b", "c", "d"]));
        order.rotate_to(&PlayerId::new("c").unwrap()).unwrap();

        assert!(order.remove(&PlayerId::new("d").unwrap()));
        assert_eq!(order.to_vec(), ids(&["c", "a", "b"]));

        assert!(order.remove(&PlayerId::new("c").unwrap()));
        assert_eq!(order.front(), Some(&PlayerId::new("a").unwrap()));

        assert!(!order.remove(&PlayerId::new("c").unwrap()));
        assert_eq!(order.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_rotation_preserves_members(len in 1usize..=10, target in 0usize..10) {
            let players: Vec<PlayerId> = (0..len)
                .map(|i| PlayerId::new(format!("p{}", i)).unwrap())
                .collect();
            let target = players[target % len].clone();

            let mut order = TurnOrder::new(players.clone());
            order.rotate_to(&target).unwrap();

            prop_assert_eq!(order.front(), Some(&target));
            let mut rotated = order.to_vec();
            let mut original = players;
            rotated.sort();
            original.sort();
            prop_assert_eq!(rotated, original);
        }
    }
}
