use thiserror::Error;

/// Failure raised by the expression sub-parser boundary.
///
/// Deliberately carries less ceremony than `stylish_parser::Error`: the
/// grammar engine is the thing that owns the scanner's "after context" and
/// the canonical `Invalid CSS after ...` wording; when it catches one
/// of these it rebuilds that message itself, using `label()` as the
/// `expected` string and `line()` for the line number. This crate never
/// formats that window itself, since doing so would require knowing the
/// grammar engine's scanner position at throw time, which is already
/// visible to the catcher.
#[derive(Debug, Error)]
pub enum ExprError {
    #[error("expression")]
    Empty { line: usize },
    #[error("closing \"}}\"")]
    UnterminatedInterpolation { line: usize },
    #[error("closing quote")]
    UnterminatedString { line: usize },
    #[error("closing \")\"")]
    UnterminatedArgList { line: usize },
}

impl ExprError {
    pub fn line(&self) -> usize {
        match self {
            ExprError::Empty { line }
            | ExprError::UnterminatedInterpolation { line }
            | ExprError::UnterminatedString { line }
            | ExprError::UnterminatedArgList { line } => *line,
        }
    }

    /// Human name for what was expected, for the grammar engine's error
    /// message. Deliberately the same vocabulary as the pattern-name table
    /// in `stylish_parser::error` (e.g. "closing quote" reads the same way
    /// whichever side of the crate boundary raised it).
    pub fn label(&self) -> &'static str {
        match self {
            ExprError::Empty { .. } => "expression",
            ExprError::UnterminatedInterpolation { .. } => "closing \"}\"",
            ExprError::UnterminatedString { .. } => "closing quote",
            ExprError::UnterminatedArgList { .. } => "closing \")\"",
        }
    }
}
