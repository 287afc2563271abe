use std::fmt;
use std::str::FromStr;

use crate::error::BoardParseError;

pub const BOARD_SIZE: i32 = 8;

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    fn symbol(&self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    fn from_symbol(symbol: char) -> Option<PieceKind> {
        match symbol.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a single pawn step. White plays up the screen.
    pub fn forward(&self) -> i32 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    pub fn back_rank(&self) -> i32 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    pub fn pawn_rank(&self) -> i32 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    pub fn promotion_rank(&self) -> i32 {
        self.opposite().back_rank()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color, x: i32, y: i32) -> Self {
        Self { kind, color, x, y }
    }

    /// The same piece standing on another square.
    pub fn moved_to(&self, x: i32, y: i32) -> Piece {
        Piece { x, y, ..*self }
    }

    pub fn symbol(&self) -> char {
        let symbol = self.kind.symbol();
        match self.color {
            Color::White => symbol.to_ascii_uppercase(),
            Color::Black => symbol,
        }
    }
}

pub fn on_board(x: i32, y: i32) -> bool {
    (0..BOARD_SIZE).contains(&x) && (0..BOARD_SIZE).contains(&y)
}

/// The pawn that just advanced two squares and the turn it did so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnPassant {
    pub x: i32,
    pub y: i32,
    pub color: Color,
    pub turn: u32,
}

/// Pieces on an 8x8 grid plus the en passant marker.
///
/// `add_piece` and `remove_piece` do not guard the one-piece-per-square
/// invariant; `Position::from_board` is where boards get validated.
#[derive(Debug, Clone)]
pub struct Board {
    pieces: Vec<Piece>,
    en_passant: Option<EnPassant>,
}

impl Board {
    pub fn new() -> Self {
        let mut board = Board::empty();
        for (x, &kind) in BACK_RANK.iter().enumerate() {
            let x = x as i32;
            board.add_piece(Piece::new(kind, Color::White, x, Color::White.back_rank()));
            board.add_piece(Piece::new(PieceKind::Pawn, Color::White, x, Color::White.pawn_rank()));
        }
        for (x, &kind) in BACK_RANK.iter().enumerate() {
            let x = x as i32;
            board.add_piece(Piece::new(kind, Color::Black, x, Color::Black.back_rank()));
            board.add_piece(Piece::new(PieceKind::Pawn, Color::Black, x, Color::Black.pawn_rank()));
        }
        board
    }

    pub fn empty() -> Self {
        Self {
            pieces: Vec::with_capacity(32),
            en_passant: None,
        }
    }

    pub fn piece_at(&self, x: i32, y: i32) -> Option<&Piece> {
        self.pieces.iter().find(|piece| piece.x == x && piece.y == y)
    }

    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.piece_at(x, y).is_some()
    }

    pub fn add_piece(&mut self, piece: Piece) {
        self.pieces.push(piece);
    }

    pub fn remove_piece(&mut self, x: i32, y: i32) -> Option<Piece> {
        let index = self.pieces.iter().position(|piece| piece.x == x && piece.y == y)?;
        Some(self.pieces.remove(index))
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces.iter().filter(move |piece| piece.color == color)
    }

    pub fn king(&self, color: Color) -> Option<&Piece> {
        self.pieces_of(color).find(|piece| piece.kind == PieceKind::King)
    }

    pub fn en_passant(&self) -> Option<EnPassant> {
        self.en_passant
    }

    pub fn set_en_passant(&mut self, en_passant: Option<EnPassant>) {
        self.en_passant = en_passant;
    }

    pub fn clear_en_passant(&mut self) {
        self.en_passant = None;
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

// Piece order in the list is irrelevant, only occupancy counts.
impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.en_passant == other.en_passant
            && self.pieces.len() == other.pieces.len()
            && self.pieces.iter().all(|piece| other.piece_at(piece.x, piece.y) == Some(piece))
    }
}

impl Eq for Board {}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut result = String::new();
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                result.push(self.piece_at(x, y).map_or('.', Piece::symbol));
                if x < BOARD_SIZE - 1 {
                    result.push(' ');
                }
            }
            result.push('\n');
        }
        write!(f, "{}", result)
    }
}

impl FromStr for Board {
    type Err = BoardParseError;

    /// Parses the diagram written by `Display`, top row first.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.lines().map(str::trim).filter(|line| !line.is_empty()).collect();
        if rows.len() != BOARD_SIZE as usize {
            return Err(BoardParseError::RowCount(rows.len()));
        }

        let mut board = Board::empty();
        for (y, row) in rows.iter().enumerate() {
            let squares: Vec<char> = row.chars().filter(|c| !c.is_whitespace()).collect();
            if squares.len() != BOARD_SIZE as usize {
                return Err(BoardParseError::ColumnCount {
                    row: y,
                    found: squares.len(),
                });
            }
            for (x, &symbol) in squares.iter().enumerate() {
                if symbol == '.' {
                    continue;
                }
                let kind = PieceKind::from_symbol(symbol)
                    .ok_or(BoardParseError::UnknownSymbol { symbol, x, y })?;
                let color = if symbol.is_ascii_uppercase() { Color::White } else { Color::Black };
                board.add_piece(Piece::new(kind, color, x as i32, y as i32));
            }
        }
        Ok(board)
    }
}
