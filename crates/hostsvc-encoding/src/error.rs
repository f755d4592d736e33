//! Encoding error types.

use miette::Diagnostic;
use thiserror::Error;

/// Errors produced while converting between character sets.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum EncodingError {
    /// The CCSID or charset name is not supported.
    #[error("unsupported code page: {name}")]
    #[diagnostic(code(encoding::unsupported_code_page))]
    UnsupportedCodePage { name: String },

    /// Input bytes are not valid in the source encoding.
    #[error("malformed {ccsid} input at byte offset {offset}")]
    #[diagnostic(code(encoding::malformed_input))]
    MalformedInput { ccsid: u16, offset: usize },

    /// A character has no representation in the target encoding.
    #[error("character U+{code_point:04X} cannot be encoded in {ccsid}")]
    #[diagnostic(code(encoding::unmappable))]
    Unmappable { code_point: u32, ccsid: u16 },
}
