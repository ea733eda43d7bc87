use crate::error::{GameError, Result};
use crate::types::{PlayerId, Role};
use serde::{Deserialize, Serialize};

/// A registered player. The role is handed out once when the words are set
/// and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    role: Option<Role>,
    alive: bool,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            role: None,
            alive: true,
        }
    }

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_ghost(&self) -> bool {
        self.role == Some(Role::Ghost)
    }

    pub fn is_fool(&self) -> bool {
        self.role == Some(Role::Fool)
    }

    pub(crate) fn assign_role(&mut self, role: Role) -> Result<()> {
        if let Some(existing) = self.role {
            return Err(GameError::internal(format!(
                "Player {} already holds role {}",
                self.id, existing
            )));
        }
        self.role = Some(role);
        Ok(())
    }

    pub(crate) fn eliminate(&mut self) {
        self.alive = false;
        tracing::debug!("Player {} eliminated", self.id);
    }
}

/// Public view of a player, without the role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub alive: bool,
}

impl From<&Player> for PlayerInfo {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            alive: player.alive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_is_assigned_once() {
        let mut player = Player::new(PlayerId::new("bacon").unwrap());
        assert_eq!(player.role(), None);

        player.assign_role(Role::Ghost).unwrap();
        assert!(player.is_ghost());
        assert!(player.assign_role(Role::Town).is_err());
        assert_eq!(player.role(), Some(Role::Ghost));
    }

    #[test]
    fn test_eliminate() {
        let mut player = Player::new(PlayerId::new("tomato").unwrap());
        assert!(player.is_alive());
        player.eliminate();
        assert!(!player.is_alive());
        assert!(!PlayerInfo::from(&player).alive);
    }
}
