use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApatError>;

/// Error codes kept numerically compatible with the historical engine:
/// 1 = io, 2 = memory, 3 = assertion, 4 = not found / out of range.
#[derive(Error, Debug)]
pub enum ApatError {
    #[error("allocation of {0} elements failed")]
    OutOfMemory(usize),

    #[error("malformed pattern `{0}`")]
    PatternSyntax(String),

    #[error("empty pattern")]
    EmptyPattern,

    #[error("pattern has {0} positions, more than the {1} a single machine word can hold")]
    PatternTooLong(usize, usize),

    #[error("pattern was not successfully compiled")]
    PatternNotReady,

    #[error("range begins at {begin} but the sequence ends at {end}")]
    RangeInvalid { begin: usize, end: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ApatError {
    pub fn code(&self) -> i32 {
        match self {
            ApatError::Io(_) => 1,
            ApatError::OutOfMemory(_) => 2,
            ApatError::PatternSyntax(_)
            | ApatError::EmptyPattern
            | ApatError::PatternTooLong(_, _)
            | ApatError::PatternNotReady => 3,
            ApatError::RangeInvalid { .. } => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ApatError::OutOfMemory(12).code(), 2);
        assert_eq!(ApatError::EmptyPattern.code(), 3);
        assert_eq!(ApatError::PatternTooLong(65, 64).code(), 3);
        assert_eq!(ApatError::RangeInvalid { begin: 9, end: 4 }.code(), 4);
    }

    #[test]
    fn test_error_messages() {
        let err = ApatError::PatternSyntax("AC[".to_string());
        assert_eq!(err.to_string(), "malformed pattern `AC[`");
    }
}
