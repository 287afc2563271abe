use crate::board::{on_board, Board, Color, EnPassant, Piece, PieceKind};
use crate::error::PositionError;
use crate::movegen::{Move, MoveKind};
use crate::rules::Rules;

pub const KING_FILE: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    pub fn rook_file(&self) -> i32 {
        match self {
            CastleSide::Kingside => 7,
            CastleSide::Queenside => 0,
        }
    }

    pub fn king_target_file(&self) -> i32 {
        match self {
            CastleSide::Kingside => 6,
            CastleSide::Queenside => 2,
        }
    }

    /// The square the king crosses, which is also where the rook lands.
    pub fn rook_target_file(&self) -> i32 {
        match self {
            CastleSide::Kingside => 5,
            CastleSide::Queenside => 3,
        }
    }
}

/// Which castling pieces of one side have left (or been taken from) their home squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SideRights {
    pub king_moved: bool,
    pub kingside_rook_moved: bool,
    pub queenside_rook_moved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingRights {
    pub white: SideRights,
    pub black: SideRights,
}

impl CastlingRights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rights as far as they can be read off the board: a side keeps a right
    /// only while its king and that rook stand on their home squares.
    pub fn from_board(board: &Board) -> Self {
        let mut rights = CastlingRights::new();
        for color in [Color::White, Color::Black] {
            let rank = color.back_rank();
            let home = |x: i32, kind: PieceKind| {
                board
                    .piece_at(x, rank)
                    .map_or(false, |piece| piece.kind == kind && piece.color == color)
            };
            let side = rights.side_mut(color);
            side.king_moved = !home(KING_FILE, PieceKind::King);
            side.kingside_rook_moved = !home(CastleSide::Kingside.rook_file(), PieceKind::Rook);
            side.queenside_rook_moved = !home(CastleSide::Queenside.rook_file(), PieceKind::Rook);
        }
        rights
    }

    pub fn side(&self, color: Color) -> SideRights {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    fn side_mut(&mut self, color: Color) -> &mut SideRights {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    pub fn can_castle(&self, color: Color, side: CastleSide) -> bool {
        let rights = self.side(color);
        let rook_moved = match side {
            CastleSide::Kingside => rights.kingside_rook_moved,
            CastleSide::Queenside => rights.queenside_rook_moved,
        };
        !rights.king_moved && !rook_moved
    }

    /// Revokes whatever right depends on the piece that sat on `(x, y)`.
    /// Called for both ends of every move, so captures on a rook's home
    /// square count as that rook having moved.
    fn touch(&mut self, x: i32, y: i32) {
        for color in [Color::White, Color::Black] {
            if y != color.back_rank() {
                continue;
            }
            let side = self.side_mut(color);
            if x == KING_FILE {
                side.king_moved = true;
            } else if x == CastleSide::Kingside.rook_file() {
                side.kingside_rook_moved = true;
            } else if x == CastleSide::Queenside.rook_file() {
                side.queenside_rook_moved = true;
            }
        }
    }
}

/// Everything move legality depends on, as one immutable snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
    castling: CastlingRights,
    to_move: Color,
    turn: u32,
    rules: Rules,
}

impl Position {
    pub fn new() -> Self {
        Position::with_rules(Rules::default())
    }

    pub fn with_rules(rules: Rules) -> Self {
        Self {
            board: Board::new(),
            castling: CastlingRights::new(),
            to_move: Color::White,
            turn: 0,
            rules,
        }
    }

    /// Builds a position from an arbitrary board after checking that it is
    /// well formed. The turn counter continues from the board's en passant
    /// marker so that the marker stays usable for exactly one move.
    pub fn from_board(board: Board, to_move: Color, rules: Rules) -> Result<Self, PositionError> {
        for (i, piece) in board.pieces().iter().enumerate() {
            if !on_board(piece.x, piece.y) {
                return Err(PositionError::OutOfBounds {
                    x: piece.x,
                    y: piece.y,
                });
            }
            if board.pieces()[..i].iter().any(|other| other.x == piece.x && other.y == piece.y) {
                return Err(PositionError::Overlap {
                    x: piece.x,
                    y: piece.y,
                });
            }
        }
        for color in [Color::White, Color::Black] {
            let kings = board
                .pieces_of(color)
                .filter(|piece| piece.kind == PieceKind::King)
                .count();
            match kings {
                0 => return Err(PositionError::MissingKing(color)),
                1 => {}
                _ => return Err(PositionError::DuplicateKing(color)),
            }
        }

        let turn = match board.en_passant() {
            Some(marker) => marker
                .turn
                .checked_add(1)
                .ok_or(PositionError::InvalidEnPassant {
                    x: marker.x,
                    y: marker.y,
                })?,
            None => 0,
        };
        Ok(Self {
            castling: CastlingRights::from_board(&board),
            board,
            to_move,
            turn,
            rules,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    pub fn to_move(&self) -> Color {
        self.to_move
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    /// The position after `mv`. The move is trusted to have come from the
    /// validator; nothing is checked here.
    pub fn apply(&self, mv: &Move) -> Position {
        let mut board = self.board.clone();
        let mut castling = self.castling;
        let mover = mv.piece;
        let color = mover.color;

        board.remove_piece(mover.x, mover.y);
        if let Some(captured) = mv.captured {
            board.remove_piece(captured.x, captured.y);
        }

        if let MoveKind::Castle(side) = mv.kind {
            let rank = color.back_rank();
            if let Some(rook) = board.remove_piece(side.rook_file(), rank) {
                board.add_piece(rook.moved_to(side.rook_target_file(), rank));
            }
        }

        let landed = match mv.kind {
            MoveKind::Promotion => Piece::new(PieceKind::Queen, color, mv.to_x, mv.to_y),
            _ => mover.moved_to(mv.to_x, mv.to_y),
        };
        board.add_piece(landed);

        board.clear_en_passant();
        if mv.kind == MoveKind::DoublePush {
            board.set_en_passant(Some(EnPassant {
                x: mv.to_x,
                y: mv.to_y,
                color,
                turn: self.turn,
            }));
        }

        if mover.kind == PieceKind::King {
            castling.side_mut(color).king_moved = true;
        }
        castling.touch(mover.x, mover.y);
        castling.touch(mv.to_x, mv.to_y);

        Position {
            board,
            castling,
            to_move: color.opposite(),
            turn: self.turn.saturating_add(1),
            rules: self.rules,
        }
    }
}

#[cfg(test)]
impl Position {
    /// Skips validation so tests can build positions the engine never produces.
    pub(crate) fn from_board_unchecked(board: Board, to_move: Color) -> Self {
        Self {
            castling: CastlingRights::from_board(&board),
            board,
            to_move,
            turn: 0,
            rules: Rules::default(),
        }
    }

    /// Overrides the rights derived from the board.
    pub(crate) fn with_castling(self, castling: CastlingRights) -> Self {
        Self { castling, ..self }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new()
    }
}
