use thiserror::Error;

/// Reasons a token sequence is rejected.
///
/// Parsing stops at the first error; specs matched before the fault keep
/// the values they already received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// `--bogus` or `-z` with no declared spec behind it.
    #[error("unknown argument: {option}")]
    UnknownOption { option: String },

    #[error("missing value for option: {option}")]
    MissingValue { option: String },

    #[error("unexpected positional argument: {value}")]
    UnexpectedPositional { value: String },

    #[error("argument {name} is missing and has no default value")]
    MissingRequiredArgument { name: String },

    #[error("value {value} for {name} is below the minimum {min}")]
    BelowMinimumValue {
        name: String,
        value: String,
        min: String,
    },

    #[error("invalid value '{value}' for {name}: {reason}")]
    ConversionFailure {
        name: String,
        value: String,
        reason: String,
    },

    #[error("argument {name} needs at least {expected} values, got {found}")]
    TooFewValues {
        name: String,
        expected: usize,
        found: usize,
    },
}

impl ParseError {
    /// Long name (or raw option text) the error refers to.
    pub fn subject(&self) -> &str {
        match self {
            Self::UnknownOption { option } | Self::MissingValue { option } => option,
            Self::UnexpectedPositional { value } => value,
            Self::MissingRequiredArgument { name }
            | Self::BelowMinimumValue { name, .. }
            | Self::ConversionFailure { name, .. }
            | Self::TooFewValues { name, .. } => name,
        }
    }
}

/// Failures when reading values back after a parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("no argument named {name}")]
    UnknownArgument { name: String },

    #[error("argument {name} does not hold {expected} values")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },

    #[error("argument {name} has {len} values, index {index} is out of range")]
    IndexOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },
}

pub type ParseResult<T> = Result<T, ParseError>;
pub type AccessResult<T> = Result<T, AccessError>;
