use log::{debug, error, info, trace};

use crate::board::{Board, Color, Piece};
use crate::check;
use crate::error::MoveError;
use crate::movegen::{self, Move};
use crate::position::{CastlingRights, Position};
use crate::rules::Rules;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Player {
    color: Color,
}

impl Player {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    pub fn color(&self) -> Color {
        self.color
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner(Color),
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    AwaitingMove,
    GameOver(Outcome),
}

/// The controller's state record. Every accepted move produces a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub position: Position,
    pub outcome: Option<Outcome>,
}

impl GameState {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            outcome: None,
        }
    }

    pub fn status(&self) -> Status {
        match self.outcome {
            Some(outcome) => Status::GameOver(outcome),
            None => Status::AwaitingMove,
        }
    }

    /// The state after moving the piece on `(from_x, from_y)` to `(to_x, to_y)`.
    pub fn advance(
        &self,
        from_x: i32,
        from_y: i32,
        to_x: i32,
        to_y: i32,
    ) -> Result<(GameState, Move), MoveError> {
        if self.outcome.is_some() {
            return Err(MoveError::GameOver);
        }

        let position = &self.position;
        let board = position.board();
        let piece = *board
            .piece_at(from_x, from_y)
            .ok_or(MoveError::EmptySquare {
                x: from_x,
                y: from_y,
            })?;
        if piece.color != position.to_move() {
            return Err(MoveError::NotYourPiece {
                x: from_x,
                y: from_y,
                owner: piece.color,
            });
        }

        // Unreachable through validated positions: the validator never lets
        // a king be captured.
        for color in [Color::White, Color::Black] {
            if board.king(color).is_none() {
                error!("{} king missing from the board at turn {}", color, position.turn());
                return Err(MoveError::MissingKing(color));
            }
        }

        let mv = movegen::legal_move(position, &piece, to_x, to_y).ok_or(MoveError::Illegal {
            from_x,
            from_y,
            to_x,
            to_y,
        })?;

        let next = position.apply(&mv);
        let side = next.to_move();
        let outcome = if check::is_stalemate(&next, side) {
            Some(Outcome::Draw)
        } else if check::is_checkmate(&next, side) {
            Some(Outcome::Winner(piece.color))
        } else {
            None
        };

        Ok((
            GameState {
                position: next,
                outcome,
            },
            mv,
        ))
    }
}

pub struct Game {
    white: Player,
    black: Player,
    state: GameState,
    history: Vec<GameState>,
    undone: Vec<GameState>,
}

impl Game {
    pub fn new() -> Self {
        Game::from_position(Position::new())
    }

    pub fn with_rules(rules: Rules) -> Self {
        Game::from_position(Position::with_rules(rules))
    }

    /// Starts from a position built with `Position::from_board`. A position
    /// that is already mate or stalemate yields a finished game.
    pub fn from_position(position: Position) -> Self {
        let side = position.to_move();
        let outcome = if check::is_stalemate(&position, side) {
            Some(Outcome::Draw)
        } else if check::is_checkmate(&position, side) {
            Some(Outcome::Winner(side.opposite()))
        } else {
            None
        };
        Self {
            white: Player::new(Color::White),
            black: Player::new(Color::Black),
            state: GameState { position, outcome },
            history: Vec::new(),
            undone: Vec::new(),
        }
    }

    /// Attempts a move. On error nothing changes.
    pub fn try_move(
        &mut self,
        from_x: i32,
        from_y: i32,
        to_x: i32,
        to_y: i32,
    ) -> Result<Move, MoveError> {
        let (next, mv) = match self.state.advance(from_x, from_y, to_x, to_y) {
            Ok(accepted) => accepted,
            Err(e) => {
                trace!("rejected ({}, {}) -> ({}, {}): {}", from_x, from_y, to_x, to_y, e);
                return Err(e);
            }
        };

        debug!(
            "turn {}: {} {:?} ({}, {}) {} ({}, {})",
            self.state.position.turn(),
            mv.piece.color,
            mv.piece.kind,
            from_x,
            from_y,
            if mv.is_capture() { "x" } else { "->" },
            to_x,
            to_y
        );
        match next.outcome {
            Some(Outcome::Winner(color)) => info!("checkmate, {} wins", color),
            Some(Outcome::Draw) => info!("stalemate, the game is drawn"),
            None => {}
        }

        self.history.push(std::mem::replace(&mut self.state, next));
        self.undone.clear();
        Ok(mv)
    }

    /// Like `try_move`, reporting only whether the move was accepted.
    pub fn move_piece(&mut self, from_x: i32, from_y: i32, to_x: i32, to_y: i32) -> bool {
        self.try_move(from_x, from_y, to_x, to_y).is_ok()
    }

    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.undone.push(std::mem::replace(&mut self.state, previous));
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.undone.pop() {
            Some(next) => {
                self.history.push(std::mem::replace(&mut self.state, next));
                true
            }
            None => false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn position(&self) -> &Position {
        &self.state.position
    }

    pub fn board(&self) -> &Board {
        self.state.position.board()
    }

    pub fn player(&self, color: Color) -> Player {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    pub fn current_player(&self) -> Player {
        self.player(self.to_move())
    }

    pub fn to_move(&self) -> Color {
        self.state.position.to_move()
    }

    pub fn turn(&self) -> u32 {
        self.state.position.turn()
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.state.position.castling()
    }

    pub fn status(&self) -> Status {
        self.state.status()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.state.outcome
    }

    pub fn is_game_over(&self) -> bool {
        self.state.outcome.is_some()
    }

    pub fn winner(&self) -> Option<Color> {
        match self.state.outcome {
            Some(Outcome::Winner(color)) => Some(color),
            _ => None,
        }
    }

    /// Whether the side to move is in check.
    pub fn is_in_check(&self) -> bool {
        self.is_king_in_check(self.to_move())
    }

    pub fn is_king_in_check(&self, color: Color) -> bool {
        check::is_king_in_check(color, self.board())
    }

    pub fn is_checkmate(&self, color: Color) -> bool {
        check::is_checkmate(self.position(), color)
    }

    pub fn is_stalemate(&self, color: Color) -> bool {
        check::is_stalemate(self.position(), color)
    }

    /// Pieces giving check to the side to move.
    pub fn checkers(&self) -> Vec<Piece> {
        check::checkers(self.to_move(), self.board())
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        movegen::legal_moves(self.position(), self.to_move())
    }

    pub fn legal_destinations(&self, x: i32, y: i32) -> Vec<(i32, i32)> {
        movegen::legal_destinations(self.position(), x, y)
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}
