pub mod board;
pub mod check;
pub mod console;
pub mod error;
pub mod game;
pub mod movegen;
pub mod position;
pub mod rules;

pub use board::{Board, Color, Piece, PieceKind};
pub use error::{MoveError, PositionError};
pub use game::{Game, Outcome, Player, Status};
pub use position::Position;
pub use rules::Rules;
