//! Property-based tests for the board model.

use connectn::{BoardConfig, Game, Player};
use proptest::prelude::*;

fn players() -> Vec<Player> {
    vec![Player::new("X", 1), Player::new("O", -1)]
}

/// A board geometry with a connect length that fits it.
fn arb_config() -> impl Strategy<Value = BoardConfig> {
    (1usize..=5, 1usize..=5)
        .prop_flat_map(|(rows, cols)| (Just(rows), Just(cols), 1..=rows.max(cols)))
        .prop_map(|(rows, cols, connect)| BoardConfig::new(rows, cols, connect).unwrap())
}

/// A board, a row, the first column of a run of `connect` cells that fits in
/// that row, and the order (as offsets from that column) the run is filled in.
fn arb_horizontal_run() -> impl Strategy<Value = (BoardConfig, usize, usize, Vec<usize>)> {
    (2usize..=4, 2usize..=7)
        .prop_flat_map(|(rows, cols)| (Just(rows), Just(cols), 1..=cols))
        .prop_flat_map(|(rows, cols, connect)| {
            let offsets: Vec<usize> = (0..connect).collect();
            let reversed: Vec<usize> = offsets.iter().rev().copied().collect();
            let order = prop_oneof![
                Just(offsets.clone()),
                Just(reversed),
                Just(offsets).prop_shuffle(),
            ];
            (
                Just(BoardConfig::new(rows, cols, connect).unwrap()),
                0..rows,
                0..=cols - connect,
                order,
            )
        })
}

/// Plays move indices against the legal moves until the game ends or they run out.
fn play_indices(game: &mut Game, indices: &[usize]) -> Vec<usize> {
    let mut played = Vec::new();
    for &idx in indices {
        if game.is_game_over() {
            break;
        }
        let moves = game.available_positions();
        let position = moves[idx % moves.len()];
        game.make_move(position).unwrap();
        played.push(position);
    }
    played
}

proptest! {
    #[test]
    fn unmake_restores_every_prefix(
        config in arb_config(),
        indices in proptest::collection::vec(0usize..64, 0..25),
    ) {
        let mut game = Game::new(config, players()).unwrap();
        let mut snapshots = vec![game.clone()];
        for &idx in &indices {
            if game.is_game_over() {
                break;
            }
            let moves = game.available_positions();
            game.make_move(moves[idx % moves.len()]).unwrap();
            snapshots.push(game.clone());
        }

        let played = game.played_moves().to_vec();
        for &position in played.iter().rev() {
            snapshots.pop();
            game.unmake_move(position).unwrap();
            prop_assert_eq!(&game, snapshots.last().unwrap());
        }
        prop_assert_eq!(game.available_positions().len(), config.num_cells());
    }

    #[test]
    fn marks_stay_balanced(
        config in arb_config(),
        indices in proptest::collection::vec(0usize..64, 0..25),
    ) {
        let mut game = Game::new(config, players()).unwrap();
        let played = play_indices(&mut game, &indices);
        let sum: i32 = game.cells().iter().sum();
        prop_assert_eq!(sum, if played.len() % 2 == 1 { 1 } else { 0 });
        prop_assert_eq!(
            game.available_positions().len() + played.len(),
            config.num_cells()
        );
    }

    #[test]
    fn horizontal_run_wins_exactly_at_connect_length(
        (config, row, start, order) in arb_horizontal_run(),
    ) {
        let mut game = Game::new(config, players()).unwrap();

        // X fills the run in `order` while O answers in the same column one row down.
        let reply_row = (row + 1) % config.num_rows();
        for (filled, &offset) in order.iter().enumerate() {
            prop_assert!(!game.is_game_over());
            let col = start + offset;
            game.make_move(config.position(row, col).unwrap()).unwrap();
            if filled + 1 < order.len() {
                prop_assert!(
                    !game.is_game_over(),
                    "won after {} of {} cells",
                    filled + 1,
                    order.len()
                );
                game.make_move(config.position(reply_row, col).unwrap()).unwrap();
            }
        }
        prop_assert!(game.is_game_over());
        prop_assert_eq!(game.winner_mark(), Some(1));
    }
}
