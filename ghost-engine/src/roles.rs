//! Role allocation.
//!
//! Each supported player count maps to a fixed split of Town, Ghost and Fool
//! roles. The split is shuffled once per game and handed out in registration
//! order.

use crate::error::{GameError, Result};
use crate::types::Role;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const MIN_PLAYERS: usize = 3;
pub const MAX_PLAYERS: usize = 10;

/// Number of each role in a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCounts {
    pub town: usize,
    pub ghost: usize,
    pub fool: usize,
}

impl RoleCounts {
    const fn new(town: usize, ghost: usize, fool: usize) -> Self {
        Self { town, ghost, fool }
    }

    pub fn total(&self) -> usize {
        self.town + self.ghost + self.fool
    }

    pub fn get(&self, role: Role) -> usize {
        match role {
            Role::Town => self.town,
            Role::Ghost => self.ghost,
            Role::Fool => self.fool,
        }
    }
}

// indexed by player count - MIN_PLAYERS
const ROLE_TABLE: [RoleCounts; MAX_PLAYERS - MIN_PLAYERS + 1] = [
    RoleCounts::new(2, 1, 0),
    RoleCounts::new(2, 1, 1),
    RoleCounts::new(3, 1, 1),
    RoleCounts::new(3, 2, 1),
    RoleCounts::new(3, 2, 2),
    RoleCounts::new(4, 2, 2),
    RoleCounts::new(4, 3, 2),
    RoleCounts::new(4, 3, 3),
];

/// Look up the role split for `player_count` players.
pub fn role_counts(player_count: usize) -> Result<RoleCounts> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
        return Err(GameError::UnsupportedPlayerCount(player_count));
    }
    Ok(ROLE_TABLE[player_count - MIN_PLAYERS])
}

/// Every supported player count with its role split, smallest first.
pub fn role_table() -> impl Iterator<Item = (usize, RoleCounts)> {
    ROLE_TABLE
        .iter()
        .enumerate()
        .map(|(i, counts)| (i + MIN_PLAYERS, *counts))
}

/// Build the role multiset for `player_count` players and shuffle it.
pub fn allocate_roles<R: Rng + ?Sized>(player_count: usize, rng: &mut R) -> Result<Vec<Role>> {
    let counts = role_counts(player_count)?;

    let mut roles = Vec::with_capacity(counts.total());
    roles.extend(std::iter::repeat(Role::Town).take(counts.town));
    roles.extend(std::iter::repeat(Role::Ghost).take(counts.ghost));
    roles.extend(std::iter::repeat(Role::Fool).take(counts.fool));

    roles.shuffle(rng);
    Ok(roles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn count(roles: &[Role], role: Role) -> usize {
        roles.iter().filter(|r| **r == role).count()
    }

    #[test]
    fn test_table_sums_to_player_count() {
        for (players, counts) in role_table() {
            assert_eq!(counts.total(), players, "bad split for {} players", players);
            assert!(counts.ghost >= 1);
            assert!(counts.town > counts.ghost);
        }
        assert_eq!(role_table().count(), MAX_PLAYERS - MIN_PLAYERS + 1);
    }

    #[test]
    fn test_seven_players() {
        assert_eq!(role_counts(7).unwrap(), RoleCounts::new(3, 2, 2));
    }

    #[test]
    fn test_unsupported_counts() {
        assert_eq!(role_counts(2), Err(GameError::UnsupportedPlayerCount(2)));
        assert_eq!(role_counts(11), Err(GameError::UnsupportedPlayerCount(11)));

        let mut rng = StdRng::seed_from_u64(1);
        assert!(allocate_roles(0, &mut rng).is_err());
    }

    #[test]
    fn test_same_seed_same_allocation() {
        let a = allocate_roles(8, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = allocate_roles(8, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_allocation_matches_table(players in MIN_PLAYERS..=MAX_PLAYERS, seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let roles = allocate_roles(players, &mut rng).unwrap();
            let counts = role_counts(players).unwrap();

            prop_assert_eq!(roles.len(), players);
            prop_assert_eq!(count(&roles, Role::Town), counts.town);
            prop_assert_eq!(count(&roles, Role::Ghost), counts.ghost);
            prop_assert_eq!(count(&roles, Role::Fool), counts.fool);
        }
    }
}
