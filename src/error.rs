use thiserror::Error;

use crate::board::Color;

/// Why a move request was turned down. The game is unchanged in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("the game is already over")]
    GameOver,
    #[error("no piece on ({x}, {y})")]
    EmptySquare { x: i32, y: i32 },
    #[error("the piece on ({x}, {y}) belongs to {owner}")]
    NotYourPiece { x: i32, y: i32, owner: Color },
    #[error("illegal move from ({from_x}, {from_y}) to ({to_x}, {to_y})")]
    Illegal {
        from_x: i32,
        from_y: i32,
        to_x: i32,
        to_y: i32,
    },
    #[error("corrupt position: the {0} king is missing")]
    MissingKing(Color),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("piece outside the board at ({x}, {y})")]
    OutOfBounds { x: i32, y: i32 },
    #[error("more than one piece on ({x}, {y})")]
    Overlap { x: i32, y: i32 },
    #[error("the {0} king is missing")]
    MissingKing(Color),
    #[error("{0} has more than one king")]
    DuplicateKing(Color),
    #[error("en passant marker on ({x}, {y}) has no following turn")]
    InvalidEnPassant { x: i32, y: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoardParseError {
    #[error("expected 8 rows, found {0}")]
    RowCount(usize),
    #[error("row {row} has {found} squares instead of 8")]
    ColumnCount { row: usize, found: usize },
    #[error("unknown piece symbol '{symbol}' at ({x}, {y})")]
    UnknownSymbol { symbol: char, x: usize, y: usize },
}
