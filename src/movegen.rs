use crate::board::{on_board, Board, Color, Piece, PieceKind, BOARD_SIZE};
use crate::check;
use crate::position::{CastleSide, Position, KING_FILE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Normal,
    DoublePush,
    EnPassant,
    Castle(CastleSide),
    /// A pawn reaching the far rank. It always becomes a queen.
    Promotion,
}

/// A classified move. `piece` is the mover as it stood before the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub piece: Piece,
    pub to_x: i32,
    pub to_y: i32,
    pub captured: Option<Piece>,
    pub kind: MoveKind,
}

impl Move {
    pub fn new(
        piece: Piece,
        to_x: i32,
        to_y: i32,
        captured: Option<Piece>,
        kind: MoveKind,
    ) -> Self {
        Self {
            piece,
            to_x,
            to_y,
            captured,
            kind,
        }
    }

    pub fn from(&self) -> (i32, i32) {
        (self.piece.x, self.piece.y)
    }

    pub fn to(&self) -> (i32, i32) {
        (self.to_x, self.to_y)
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

/// Every square strictly between the endpoints must be empty. The endpoints
/// must share a row, a column or a diagonal.
fn ray_is_clear(board: &Board, from_x: i32, from_y: i32, to_x: i32, to_y: i32) -> bool {
    let step_x = (to_x - from_x).signum();
    let step_y = (to_y - from_y).signum();
    let mut x = from_x + step_x;
    let mut y = from_y + step_y;
    while x != to_x || y != to_y {
        if board.is_occupied(x, y) {
            return false;
        }
        x += step_x;
        y += step_y;
    }
    true
}

pub(crate) fn rook_reaches(board: &Board, piece: &Piece, x: i32, y: i32) -> bool {
    (piece.x == x || piece.y == y) && ray_is_clear(board, piece.x, piece.y, x, y)
}

pub(crate) fn bishop_reaches(board: &Board, piece: &Piece, x: i32, y: i32) -> bool {
    (x - piece.x).abs() == (y - piece.y).abs() && ray_is_clear(board, piece.x, piece.y, x, y)
}

pub(crate) fn queen_reaches(board: &Board, piece: &Piece, x: i32, y: i32) -> bool {
    rook_reaches(board, piece, x, y) || bishop_reaches(board, piece, x, y)
}

pub(crate) fn knight_reaches(piece: &Piece, x: i32, y: i32) -> bool {
    let dx = (x - piece.x).abs();
    let dy = (y - piece.y).abs();
    (dx == 2 && dy == 1) || (dx == 1 && dy == 2)
}

pub(crate) fn king_reaches(piece: &Piece, x: i32, y: i32) -> bool {
    (x - piece.x).abs() <= 1 && (y - piece.y).abs() <= 1
}

/// Shape legality: piece geometry, blockers, captures and the special pawn
/// and king moves, without asking whether the mover ends up in check.
pub fn pseudo_legal(position: &Position, piece: &Piece, to_x: i32, to_y: i32) -> Option<Move> {
    if !on_board(to_x, to_y) || (piece.x == to_x && piece.y == to_y) {
        return None;
    }

    let board = position.board();
    let target = board.piece_at(to_x, to_y).copied();
    if matches!(target, Some(other) if other.color == piece.color) {
        return None;
    }

    let reaches = match piece.kind {
        PieceKind::Pawn => return pawn_move(position, piece, to_x, to_y, target),
        PieceKind::Knight => knight_reaches(piece, to_x, to_y),
        PieceKind::Bishop => bishop_reaches(board, piece, to_x, to_y),
        PieceKind::Rook => rook_reaches(board, piece, to_x, to_y),
        PieceKind::Queen => queen_reaches(board, piece, to_x, to_y),
        PieceKind::King => {
            if !king_reaches(piece, to_x, to_y) {
                return castle_side(position, piece, to_x, to_y)
                    .map(|side| Move::new(*piece, to_x, to_y, None, MoveKind::Castle(side)));
            }
            true
        }
    };

    if reaches {
        Some(Move::new(*piece, to_x, to_y, target, MoveKind::Normal))
    } else {
        None
    }
}

fn pawn_move(
    position: &Position,
    piece: &Piece,
    to_x: i32,
    to_y: i32,
    target: Option<Piece>,
) -> Option<Move> {
    let board = position.board();
    let direction = piece.color.forward();
    let dx = to_x - piece.x;
    let dy = to_y - piece.y;
    let advance = if to_y == piece.color.promotion_rank() {
        MoveKind::Promotion
    } else {
        MoveKind::Normal
    };

    if dx == 0 {
        if target.is_some() {
            return None;
        }
        if dy == direction {
            return Some(Move::new(*piece, to_x, to_y, None, advance));
        }
        if dy == 2 * direction
            && piece.y == piece.color.pawn_rank()
            && !board.is_occupied(piece.x, piece.y + direction)
        {
            return Some(Move::new(*piece, to_x, to_y, None, MoveKind::DoublePush));
        }
        return None;
    }

    if dx.abs() == 1 && dy == direction {
        if let Some(victim) = target {
            return Some(Move::new(*piece, to_x, to_y, Some(victim), advance));
        }
        return en_passant_victim(position, piece, to_x, to_y)
            .map(|victim| Move::new(*piece, to_x, to_y, Some(victim), MoveKind::EnPassant));
    }

    None
}

/// The pawn an en passant capture onto `(to_x, to_y)` would take. Only a
/// marker set on the immediately preceding turn counts.
fn en_passant_victim(position: &Position, piece: &Piece, to_x: i32, to_y: i32) -> Option<Piece> {
    let marker = position.board().en_passant()?;
    if marker.color == piece.color || position.turn().checked_sub(1) != Some(marker.turn) {
        return None;
    }
    if piece.y != marker.y || to_x != marker.x || to_y != marker.y + piece.color.forward() {
        return None;
    }
    position
        .board()
        .piece_at(marker.x, marker.y)
        .copied()
        .filter(|victim| victim.kind == PieceKind::Pawn && victim.color == marker.color)
}

fn castle_side(position: &Position, king: &Piece, to_x: i32, to_y: i32) -> Option<CastleSide> {
    let color = king.color;
    let rank = color.back_rank();
    if king.x != KING_FILE || king.y != rank || to_y != rank {
        return None;
    }
    let side = match to_x {
        x if x == CastleSide::Kingside.king_target_file() => CastleSide::Kingside,
        x if x == CastleSide::Queenside.king_target_file() => CastleSide::Queenside,
        _ => return None,
    };
    if !position.castling().can_castle(color, side) {
        return None;
    }

    let board = position.board();
    let rook_x = side.rook_file();
    match board.piece_at(rook_x, rank) {
        Some(rook) if rook.kind == PieceKind::Rook && rook.color == color => {}
        _ => return None,
    }
    let (low, high) = (rook_x.min(KING_FILE) + 1, rook_x.max(KING_FILE));
    if (low..high).any(|x| board.is_occupied(x, rank)) {
        return None;
    }

    // The destination itself is covered by the self-check test.
    if position.rules().strict_castling {
        let enemy = color.opposite();
        let crossed = side.rook_target_file();
        if [KING_FILE, crossed]
            .iter()
            .any(|&x| check::is_square_attacked(board, x, rank, enemy))
        {
            return None;
        }
    }

    Some(side)
}

/// The fully legal move of `piece` to `(to_x, to_y)`, if there is one.
pub fn legal_move(position: &Position, piece: &Piece, to_x: i32, to_y: i32) -> Option<Move> {
    let mv = pseudo_legal(position, piece, to_x, to_y)?;
    let after = position.apply(&mv);
    if check::is_king_in_check(piece.color, after.board()) {
        return None;
    }
    Some(mv)
}

pub fn is_legal(position: &Position, piece: &Piece, to_x: i32, to_y: i32) -> bool {
    legal_move(position, piece, to_x, to_y).is_some()
}

fn squares() -> impl Iterator<Item = (i32, i32)> {
    (0..BOARD_SIZE).flat_map(|y| (0..BOARD_SIZE).map(move |x| (x, y)))
}

/// All legal moves of `color`: every piece tried against every square.
pub fn legal_moves(position: &Position, color: Color) -> Vec<Move> {
    let mut moves = Vec::new();
    for piece in position.board().pieces_of(color) {
        for (x, y) in squares() {
            if let Some(mv) = legal_move(position, piece, x, y) {
                moves.push(mv);
            }
        }
    }
    moves
}

pub fn has_legal_move(position: &Position, color: Color) -> bool {
    position
        .board()
        .pieces_of(color)
        .any(|piece| squares().any(|(x, y)| is_legal(position, piece, x, y)))
}

/// Squares the piece on `(x, y)` may legally move to. Empty when the square is empty.
pub fn legal_destinations(position: &Position, x: i32, y: i32) -> Vec<(i32, i32)> {
    match position.board().piece_at(x, y) {
        Some(piece) => squares()
            .filter(|&(to_x, to_y)| is_legal(position, piece, to_x, to_y))
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::CastlingRights;
    use crate::rules::Rules;

    fn setup(diagram: &str, to_move: Color) -> Position {
        setup_with(diagram, to_move, Rules::default())
    }

    fn setup_with(diagram: &str, to_move: Color, rules: Rules) -> Position {
        let board: Board = diagram.parse().unwrap();
        Position::from_board(board, to_move, rules).unwrap()
    }

    fn piece(position: &Position, x: i32, y: i32) -> Piece {
        *position.board().piece_at(x, y).unwrap()
    }

    #[test]
    fn test_initial_position() {
        let position = Position::new();
        let moves = legal_moves(&position, Color::White);
        // 16 pawn moves and 4 knight moves
        assert_eq!(moves.len(), 20);
        assert_eq!(legal_moves(&position, Color::Black).len(), 20);
        assert!(moves.iter().all(|mv| is_legal(&position, &mv.piece, mv.to_x, mv.to_y)));
    }

    #[test]
    fn test_off_board_and_same_square() {
        let position = Position::new();
        for piece in position.board().pieces() {
            assert!(!is_legal(&position, piece, piece.x, piece.y));
            assert!(!is_legal(&position, piece, -1, piece.y));
            assert!(!is_legal(&position, piece, piece.x, 8));
        }
    }

    #[test]
    fn test_pawn_pushes() {
        let position = Position::new();
        let pawn = piece(&position, 4, 6);
        assert_eq!(pseudo_legal(&position, &pawn, 4, 5).map(|mv| mv.kind), Some(MoveKind::Normal));
        assert_eq!(
            pseudo_legal(&position, &pawn, 4, 4).map(|mv| mv.kind),
            Some(MoveKind::DoublePush)
        );
        assert!(!is_legal(&position, &pawn, 4, 3));
        // backwards and sideways
        assert!(!is_legal(&position, &pawn, 4, 7));
        assert!(!is_legal(&position, &pawn, 5, 6));
        // diagonal onto an empty square
        assert!(!is_legal(&position, &pawn, 5, 5));
    }

    #[test]
    fn test_blocked_pawn() {
        let position = setup(
            "....k...
             ........
             ........
             ........
             ........
             ....n...
             ....P...
             ....K...",
            Color::White,
        );
        let pawn = piece(&position, 4, 6);
        assert!(!is_legal(&position, &pawn, 4, 5));
        assert!(!is_legal(&position, &pawn, 4, 4));

        let position = setup(
            "....k...
             ........
             ........
             ........
             ....n...
             ........
             ....P...
             ....K...",
            Color::White,
        );
        let pawn = piece(&position, 4, 6);
        assert!(is_legal(&position, &pawn, 4, 5));
        assert!(!is_legal(&position, &pawn, 4, 4));
    }

    #[test]
    fn test_double_push_only_from_start_rank() {
        let position = setup(
            "....k...
             ........
             ........
             ........
             ........
             ...P....
             ........
             ....K...",
            Color::White,
        );
        let pawn = piece(&position, 3, 5);
        assert!(is_legal(&position, &pawn, 3, 4));
        assert!(!is_legal(&position, &pawn, 3, 3));
    }

    #[test]
    fn test_pawn_capture_and_promotion() {
        let position = setup(
            ".r..k...
             P.......
             ........
             ........
             ........
             ........
             ........
             ....K...",
            Color::White,
        );
        let pawn = piece(&position, 0, 1);
        let push = legal_move(&position, &pawn, 0, 0).unwrap();
        assert_eq!(push.kind, MoveKind::Promotion);
        assert!(push.captured.is_none());

        let capture = legal_move(&position, &pawn, 1, 0).unwrap();
        assert_eq!(capture.kind, MoveKind::Promotion);
        assert_eq!(capture.captured.map(|p| p.kind), Some(PieceKind::Rook));

        let after = position.apply(&capture);
        assert_eq!(
            after.board().piece_at(1, 0),
            Some(&Piece::new(PieceKind::Queen, Color::White, 1, 0))
        );
        assert!(after.board().piece_at(0, 1).is_none());
    }

    #[test]
    fn test_own_piece_destination_rejected() {
        let position = Position::new();
        let rook = piece(&position, 0, 7);
        let knight = piece(&position, 1, 7);
        let queen = piece(&position, 3, 7);
        assert!(!is_legal(&position, &rook, 0, 6));
        assert!(!is_legal(&position, &knight, 3, 6));
        assert!(!is_legal(&position, &queen, 4, 7));
    }

    #[test]
    fn test_sliders_are_blocked() {
        let position = setup(
            "....k...
             ........
             ........
             ...p....
             ........
             .p......
             ........
             R..QK...",
            Color::White,
        );
        let rook = piece(&position, 0, 7);
        assert!(is_legal(&position, &rook, 0, 0));
        assert!(is_legal(&position, &rook, 2, 7));
        assert!(!is_legal(&position, &rook, 3, 7));
        assert!(!is_legal(&position, &rook, 1, 6));

        let queen = piece(&position, 3, 7);
        assert!(is_legal(&position, &queen, 3, 3));
        assert!(!is_legal(&position, &queen, 3, 2));
        assert!(is_legal(&position, &queen, 1, 5));
        assert!(!is_legal(&position, &queen, 0, 4));
        assert!(!is_legal(&position, &queen, 2, 4));
    }

    #[test]
    fn test_knight_jumps() {
        let position = Position::new();
        let knight = piece(&position, 6, 7);
        assert!(is_legal(&position, &knight, 5, 5));
        assert!(is_legal(&position, &knight, 7, 5));
        assert!(!is_legal(&position, &knight, 6, 5));
        assert_eq!(legal_destinations(&position, 6, 7), vec![(5, 5), (7, 5)]);
    }

    #[test]
    fn test_pinned_piece_cannot_move() {
        let position = setup(
            "....r..k
             ........
             ........
             ........
             ........
             ........
             ....B...
             ....K...",
            Color::White,
        );
        let bishop = piece(&position, 4, 6);
        assert!(pseudo_legal(&position, &bishop, 5, 5).is_some());
        assert!(!is_legal(&position, &bishop, 5, 5));
        assert!(legal_destinations(&position, 4, 6).is_empty());
    }

    #[test]
    fn test_king_cannot_step_into_check() {
        let position = setup(
            "....k...
             ........
             ........
             ........
             ........
             ........
             .....r..
             ....K...",
            Color::White,
        );
        let king = piece(&position, 4, 7);
        assert!(!is_legal(&position, &king, 3, 6));
        assert!(!is_legal(&position, &king, 5, 7));
        assert!(is_legal(&position, &king, 5, 6));
        assert!(is_legal(&position, &king, 3, 7));
    }

    #[test]
    fn test_castling() {
        let position = setup(
            "r...k..r
             ........
             ........
             ........
             ........
             ........
             ........
             R...K..R",
            Color::White,
        );
        let king = piece(&position, 4, 7);
        let kingside = legal_move(&position, &king, 6, 7).unwrap();
        assert_eq!(kingside.kind, MoveKind::Castle(CastleSide::Kingside));
        let queenside = legal_move(&position, &king, 2, 7).unwrap();
        assert_eq!(queenside.kind, MoveKind::Castle(CastleSide::Queenside));

        let after = position.apply(&kingside);
        assert_eq!(after.board().piece_at(6, 7).map(|p| p.kind), Some(PieceKind::King));
        assert_eq!(after.board().piece_at(5, 7).map(|p| p.kind), Some(PieceKind::Rook));
        assert!(after.board().piece_at(7, 7).is_none());
        assert!(!after.castling().can_castle(Color::White, CastleSide::Queenside));

        let after = position.apply(&queenside);
        assert_eq!(after.board().piece_at(2, 7).map(|p| p.kind), Some(PieceKind::King));
        assert_eq!(after.board().piece_at(3, 7).map(|p| p.kind), Some(PieceKind::Rook));
        assert!(after.board().piece_at(0, 7).is_none());

        let black_king = piece(&position, 4, 0);
        assert!(is_legal(&position, &black_king, 6, 0));
        assert!(!is_legal(&position, &black_king, 6, 7));
    }

    #[test]
    fn test_castling_needs_empty_path_and_rook() {
        let position = setup(
            "....k...
             ........
             ........
             ........
             ........
             ........
             ........
             RN..K...",
            Color::White,
        );
        let king = piece(&position, 4, 7);
        assert!(!is_legal(&position, &king, 2, 7));
        assert!(!is_legal(&position, &king, 6, 7));
    }

    #[test]
    fn test_castling_needs_rook_on_home_square() {
        let diagram = "....k...
             ........
             ........
             ........
             ........
             ........
             ........
             R...K..N";
        let full_rights = CastlingRights::new();
        let position = setup(diagram, Color::White).with_castling(full_rights);
        let king = piece(&position, 4, 7);
        assert!(position.castling().can_castle(Color::White, CastleSide::Kingside));
        // a knight on h1 is no castling partner
        assert!(!is_legal(&position, &king, 6, 7));
        assert!(is_legal(&position, &king, 2, 7));

        let mut board = position.board().clone();
        board.remove_piece(7, 7);
        let position = Position::from_board(board, Color::White, Rules::default())
            .unwrap()
            .with_castling(full_rights);
        assert!(pseudo_legal(&position, &king, 6, 7).is_none());
    }

    #[test]
    fn test_castling_after_rook_moved() {
        let start = setup(
            "....k...
             ........
             ........
             ........
             ........
             ........
             ........
             R...K..R",
            Color::White,
        );
        let rook = piece(&start, 7, 7);
        let away = start.apply(&legal_move(&start, &rook, 7, 6).unwrap());
        let rook = piece(&away, 7, 6);
        let back = away.apply(&legal_move(&away, &rook, 7, 7).unwrap());

        // the rook is home again but the kingside right is gone
        let king = piece(&back, 4, 7);
        assert!(!is_legal(&back, &king, 6, 7));
        assert!(is_legal(&back, &king, 2, 7));
    }

    #[test]
    fn test_castling_through_check() {
        let diagram = "....k...
             ........
             ........
             ........
             ........
             .....r..
             ........
             ....K..R";
        let strict = setup(diagram, Color::White);
        let king = piece(&strict, 4, 7);
        assert!(!is_legal(&strict, &king, 6, 7));

        let permissive = setup_with(diagram, Color::White, Rules::permissive_castling());
        assert!(is_legal(&permissive, &king, 6, 7));
    }

    #[test]
    fn test_no_castling_out_of_check() {
        let diagram = "....r..k
             ........
             ........
             ........
             ........
             ........
             ........
             R...K...";
        let strict = setup(diagram, Color::White);
        let king = piece(&strict, 4, 7);
        assert!(!is_legal(&strict, &king, 2, 7));

        let permissive = setup_with(diagram, Color::White, Rules::permissive_castling());
        assert!(is_legal(&permissive, &king, 2, 7));
    }

    #[test]
    fn test_castling_into_check_always_rejected() {
        let diagram = "....k.r.
             ........
             ........
             ........
             ........
             ........
             ........
             ....K..R";
        let permissive = setup_with(diagram, Color::White, Rules::permissive_castling());
        let king = piece(&permissive, 4, 7);
        assert!(!is_legal(&permissive, &king, 6, 7));
    }

    #[test]
    fn test_en_passant_window() {
        let position = setup(
            "....k...
             ...p....
             ........
             ....P...
             ........
             ........
             ........
             ....K...",
            Color::Black,
        );
        let black_pawn = piece(&position, 3, 1);
        let push = legal_move(&position, &black_pawn, 3, 3).unwrap();
        assert_eq!(push.kind, MoveKind::DoublePush);
        let after = position.apply(&push);

        let white_pawn = piece(&after, 4, 3);
        let capture = legal_move(&after, &white_pawn, 3, 2).unwrap();
        assert_eq!(capture.kind, MoveKind::EnPassant);
        assert_eq!(capture.captured, Some(Piece::new(PieceKind::Pawn, Color::Black, 3, 3)));

        let taken = after.apply(&capture);
        assert!(taken.board().piece_at(3, 3).is_none());
        assert_eq!(taken.board().piece_at(3, 2).map(|p| p.color), Some(Color::White));

        // the window closes once another move has been played
        let waited = after.apply(&legal_move(&after, &piece(&after, 4, 7), 4, 6).unwrap());
        let waited = waited.apply(&legal_move(&waited, &piece(&waited, 4, 0), 4, 1).unwrap());
        let white_pawn = piece(&waited, 4, 3);
        assert!(!is_legal(&waited, &white_pawn, 3, 2));
    }
}
