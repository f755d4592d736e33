//! Character-set conversion for hostsvc.
//!
//! Request bodies arrive in an ASCII-family encoding while the host's batch
//! subsystems consume EBCDIC records. This crate provides the conversion
//! service that sits between the two.
//!
//! # Example
//!
//! ```rust
//! use hostsvc_encoding::{Ccsid, Charset, HostCharset};
//!
//! let ebcdic = HostCharset
//!     .convert(b"//", Ccsid::UTF_8, Ccsid::IBM_1047)
//!     .unwrap();
//! assert_eq!(ebcdic, vec![0x61, 0x61]);
//! ```

#![forbid(unsafe_code)]

pub mod charset;
pub mod ebcdic;
pub mod error;

pub use charset::{Ccsid, Charset, HostCharset};
pub use ebcdic::{CodePage, CP037, CP1047};
pub use error::EncodingError;

/// Result type for encoding operations.
pub type Result<T> = std::result::Result<T, EncodingError>;
