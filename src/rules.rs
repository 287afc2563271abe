/// Rule switches honoured by the move validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    /// Forbid castling out of check and across an attacked square.
    /// Turning this off only checks the king's destination.
    pub strict_castling: bool,
}

impl Rules {
    pub fn permissive_castling() -> Self {
        Self {
            strict_castling: false,
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            strict_castling: true,
        }
    }
}
