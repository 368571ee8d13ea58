//! Tests for the four-in-a-row engine: turn order, terminal states and
//! rejected moves.

use dropfour_connect4::{Cell, Color, Game, GameState, MoveError, MoveErrorKind};
use serde_json::json;

/// A 7x6 game where "yellow" joined first and "red" joined second.
fn standard_game() -> Game {
    let mut game = Game::new(7, 6);
    game.add_player("yellow".to_string()).unwrap();
    game.add_player("red".to_string()).unwrap();
    game
}

/// Plays `columns` as alternating moves by whoever holds the turn.
fn play_all(game: &mut Game, columns: &[i64]) {
    for &col in columns {
        let color = game.turn();
        game.play(color, col)
            .unwrap_or_else(|e| panic!("move {col} by {color} failed: {e}"));
    }
}

/// A full 7x6 game in which no four is ever formed.
const DRAW_SEQUENCE: [i64; 42] = [
    0, 1, 2, 3, 4, 5, 6, 0, 1, 2, 3, 4, 5, 6, 0, 1, 2, 3, 4, 5, 6, //
    1, 0, 3, 2, 5, 4, 0, 6, 1, 2, 3, 4, 5, 6, 0, 1, 2, 3, 4, 5, 6,
];

#[test]
fn test_vertical_win_by_second_joiner() {
    let mut game = standard_game();
    for _ in 0..3 {
        game.make_move("red", &json!({"col": 3})).unwrap();
        game.make_move("yellow", &json!({"col": 4})).unwrap();
    }
    let cell = game.make_move("red", &json!({"col": 3})).unwrap();

    assert_eq!(cell, Cell::new(3, 3));
    assert_eq!(game.state(), GameState::Won);
    assert_eq!(game.winner(), Some(Color::Red));
    assert_eq!(
        game.winning_run(),
        &[
            Cell::new(3, 0),
            Cell::new(3, 1),
            Cell::new(3, 2),
            Cell::new(3, 3)
        ]
    );
}

#[test]
fn test_horizontal_win() {
    let mut game = standard_game();
    play_all(&mut game, &[0, 0, 1, 1, 2, 2, 3]);
    assert_eq!(game.state(), GameState::Won);
    assert_eq!(game.winner(), Some(Color::Red));
    assert_eq!(game.winning_run().len(), 4);
}

#[test]
fn test_rising_diagonal_win() {
    let mut game = standard_game();
    play_all(&mut game, &[0, 1, 1, 2, 2, 3, 2, 3, 3, 6, 3]);
    assert_eq!(game.state(), GameState::Won);
    assert_eq!(
        game.winning_run(),
        &[
            Cell::new(0, 0),
            Cell::new(1, 1),
            Cell::new(2, 2),
            Cell::new(3, 3)
        ]
    );
}

#[test]
fn test_no_moves_after_win() {
    let mut game = standard_game();
    play_all(&mut game, &[0, 0, 1, 1, 2, 2, 3]);
    let board = game.board().clone();

    for (player, col) in [("yellow", 5), ("red", 5), ("yellow", 0)] {
        let err = game.make_move(player, &json!({"col": col})).unwrap_err();
        assert_eq!(err, MoveError::GameOver);
        assert_eq!(err.kind(), MoveErrorKind::State);
    }
    assert_eq!(game.board(), &board);
}

#[test]
fn test_full_board_is_drawn() {
    let mut game = standard_game();
    play_all(&mut game, &DRAW_SEQUENCE[..41]);
    assert_eq!(game.state(), GameState::Running);

    play_all(&mut game, &DRAW_SEQUENCE[41..]);
    assert_eq!(game.state(), GameState::Drawn);
    assert!(game.board().is_full());
    assert_eq!(game.winner(), None);
}

#[test]
fn test_small_board_draw() {
    let mut game = Game::new(3, 3);
    game.add_player("a".to_string()).unwrap();
    game.add_player("b".to_string()).unwrap();
    play_all(&mut game, &[0, 0, 0, 1, 1, 1, 2, 2, 2]);
    assert_eq!(game.state(), GameState::Drawn);
}

#[test]
fn test_turns_alternate_while_running() {
    let mut game = standard_game();
    let mut expected = Color::Red;
    // Two pieces per column never fill it and never line up four.
    for col in [0, 1, 2, 3, 4, 5, 6, 0, 2, 4] {
        assert_eq!(game.turn(), expected);
        game.play(expected, col).unwrap();
        assert_eq!(game.state(), GameState::Running);
        expected = expected.next();
    }
    assert_eq!(game.turn(), expected);
}

#[test]
fn test_full_column_is_capacity_error() {
    let mut game = standard_game();
    play_all(&mut game, &[0, 0, 0, 0, 0, 0]);
    let board = game.board().clone();
    let turn = game.turn();

    let err = game.play(turn, 0).unwrap_err();
    assert_eq!(err, MoveError::ColumnFull(0));
    assert_eq!(err.kind(), MoveErrorKind::Capacity);
    assert_eq!(game.board(), &board);
    assert_eq!(game.turn(), turn);
    assert_eq!(game.state(), GameState::Running);
}

#[test]
fn test_out_of_turn_is_state_error() {
    let mut game = standard_game();
    let err = game.make_move("yellow", &json!({"col": 2})).unwrap_err();
    assert_eq!(err, MoveError::NotYourTurn);
    assert_eq!(err.kind(), MoveErrorKind::State);
    assert!(game.board().column(2).unwrap().iter().all(|c| c.is_empty()));
    assert_eq!(game.turn(), Color::Red);
}

#[test]
fn test_validation_errors() {
    let mut game = standard_game();
    for err in [
        game.make_move("red", &json!({"col": 9})).unwrap_err(),
        game.make_move("red", &json!({"column": 1})).unwrap_err(),
        game.make_move("nobody", &json!({"col": 1})).unwrap_err(),
    ] {
        assert_eq!(err.kind(), MoveErrorKind::Validation, "{err}");
    }
    assert_eq!(game.turn(), Color::Red);
}
