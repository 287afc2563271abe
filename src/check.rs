use crate::board::{Board, Color, Piece, PieceKind};
use crate::movegen::{
    self, bishop_reaches, king_reaches, knight_reaches, queen_reaches, rook_reaches,
};
use crate::position::Position;

/// Whether `piece` attacks `(x, y)` on `board`.
///
/// Pure geometry: pawns only attack diagonally forward, kings only the
/// adjacent squares. Nothing here asks whether the attacker is pinned, so
/// check detection never recurses into the validator.
pub fn attacks(board: &Board, piece: &Piece, x: i32, y: i32) -> bool {
    if piece.x == x && piece.y == y {
        return false;
    }
    match piece.kind {
        PieceKind::Pawn => (x - piece.x).abs() == 1 && y - piece.y == piece.color.forward(),
        PieceKind::Knight => knight_reaches(piece, x, y),
        PieceKind::Bishop => bishop_reaches(board, piece, x, y),
        PieceKind::Rook => rook_reaches(board, piece, x, y),
        PieceKind::Queen => queen_reaches(board, piece, x, y),
        PieceKind::King => king_reaches(piece, x, y),
    }
}

pub fn is_square_attacked(board: &Board, x: i32, y: i32, by: Color) -> bool {
    board.pieces_of(by).any(|piece| attacks(board, piece, x, y))
}

/// A board without a king of `color` is never in check. Hypothetical boards
/// are allowed to be incomplete.
pub fn is_king_in_check(color: Color, board: &Board) -> bool {
    match board.king(color) {
        Some(king) => is_square_attacked(board, king.x, king.y, color.opposite()),
        None => false,
    }
}

/// Enemy pieces currently attacking the king of `color`.
pub fn checkers(color: Color, board: &Board) -> Vec<Piece> {
    let Some(king) = board.king(color) else {
        return Vec::new();
    };
    board
        .pieces_of(color.opposite())
        .filter(|piece| attacks(board, piece, king.x, king.y))
        .copied()
        .collect()
}

pub fn is_checkmate(position: &Position, color: Color) -> bool {
    is_king_in_check(color, position.board()) && !movegen::has_legal_move(position, color)
}

pub fn is_stalemate(position: &Position, color: Color) -> bool {
    !is_king_in_check(color, position.board()) && !movegen::has_legal_move(position, color)
}
