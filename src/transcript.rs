//! Plain-text game transcripts.
//!
//! A transcript starts with the policy build time, then each game as a
//! sequence of board snapshots separated by `============` lines, closed by the
//! outcome. Games are separated by a line of `#`.

use crate::error::{Error, Result};
use crate::game::{Game, Player};
use std::io::Write;
use std::time::Duration;

const GAME_SEPARATOR: &str = "#########################################";
const BOARD_SEPARATOR: &str = "============";

pub struct TranscriptWriter<W: Write> {
    writer: W,
}

impl<W: Write> TranscriptWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.writer, "{}", text).map_err(|e| Error::io("write transcript", e))
    }

    pub fn build_time(&mut self, elapsed: Duration) -> Result<()> {
        self.line(&format!(
            "Total time to build minimax best policy is: {:.6} seconds",
            elapsed.as_secs_f64()
        ))
    }

    pub fn begin_game(&mut self, index: usize) -> Result<()> {
        self.line(GAME_SEPARATOR)?;
        self.line(&format!("Start playing game {}", index))
    }

    pub fn board(&mut self, game: &Game) -> Result<()> {
        // Game's Display already ends with a newline
        write!(self.writer, "{}", game).map_err(|e| Error::io("write transcript", e))?;
        self.line(BOARD_SEPARATOR)
    }

    pub fn result(&mut self, winner: Option<&Player>) -> Result<()> {
        match winner {
            Some(player) => self.line(&format!("the winner is {}", player)),
            None => self.line("its a draw"),
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| Error::io("flush transcript", e))
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::BoardConfig;

    #[test]
    fn transcript_layout() {
        let mut game = Game::new(
            BoardConfig::new(1, 2, 2).unwrap(),
            vec![Player::new("Reward Player", 1), Player::new("Reward Player", -1)],
        )
        .unwrap();
        let mut transcript = TranscriptWriter::new(Vec::new());
        transcript.build_time(Duration::from_millis(1500)).unwrap();
        transcript.begin_game(0).unwrap();
        game.make_move(0).unwrap();
        transcript.board(&game).unwrap();
        game.make_move(1).unwrap();
        assert!(game.is_game_over());
        transcript.board(&game).unwrap();
        transcript.result(game.get_winner()).unwrap();

        let text = String::from_utf8(transcript.into_inner()).unwrap();
        assert_eq!(
            text,
            "Total time to build minimax best policy is: 1.500000 seconds\n\
             #########################################\n\
             Start playing game 0\n\
             game state: \n| 1 || 0 |\n\
             ============\n\
             game state: \n| 1 ||-1 |\n\
             ============\n\
             its a draw\n"
        );
    }

    #[test]
    fn winner_line() {
        let mut transcript = TranscriptWriter::new(Vec::new());
        transcript
            .result(Some(&Player::new("Reward Player", -1)))
            .unwrap();
        let text = String::from_utf8(transcript.into_inner()).unwrap();
        assert_eq!(text, "the winner is '(-1) Reward Player'\n");
    }
}
