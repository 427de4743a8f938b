use super::board::Mark;
use std::fmt;

/// A participant in the game.
///
/// The winning reward is written to the board on this player's moves and is
/// the game value recorded when this player wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Player {
    id: String,
    winning_reward: Mark,
}

impl Player {
    pub fn new(id: impl Into<String>, winning_reward: Mark) -> Self {
        Self {
            id: id.into(),
            winning_reward,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The reward for winning, also the mark this player writes to the board.
    pub fn winning_reward(&self) -> Mark {
        self.winning_reward
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'({}) {}'", self.winning_reward, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_display() {
        let player = Player::new("Reward Player", -1);
        assert_eq!(player.to_string(), "'(-1) Reward Player'");
        assert_eq!(player.winning_reward(), -1);
        assert_eq!(player.id(), "Reward Player");
    }
}
