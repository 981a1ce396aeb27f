use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected end of input at {pos}: unterminated <{tag}> tag")]
    UnexpectedEof { pos: usize, tag: String },

    #[error("Nesting too deep at {pos}: more than {limit} open elements")]
    NestingTooDeep { pos: usize, limit: usize },
}

impl ParseError {
    pub fn unexpected_eof(pos: usize, tag: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            pos,
            tag: tag.into(),
        }
    }

    pub fn nesting_too_deep(pos: usize, limit: usize) -> Self {
        Self::NestingTooDeep { pos, limit }
    }
}
