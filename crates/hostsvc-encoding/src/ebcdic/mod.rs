//! EBCDIC encoding support for the host's native code pages.
//!
//! Only single-byte EBCDIC pages whose repertoire is exactly ISO-8859-1 are
//! supported, so every code page here is a permutation of the 256 Latin-1
//! code points and conversion never needs substitution characters.

mod tables;

pub use tables::{CodePage, CP037, CP1047};

use crate::error::EncodingError;
use crate::Result;

/// Byte used as the record pad character (`' '`).
pub const fn space(page: &CodePage) -> u8 {
    page.latin1_to_ebcdic[b' ' as usize]
}

impl CodePage {
    /// Decode EBCDIC bytes to a UTF-8 string.
    pub fn decode(&self, bytes: &[u8]) -> String {
        bytes
            .iter()
            .map(|&b| char::from(self.ebcdic_to_latin1[b as usize]))
            .collect()
    }

    /// Encode a UTF-8 string to EBCDIC bytes.
    ///
    /// # Errors
    /// Returns [`EncodingError::Unmappable`] for any character above U+00FF.
    pub fn encode(&self, s: &str) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(s.len());
        for ch in s.chars() {
            let code_point = ch as u32;
            if code_point > 0xFF {
                return Err(EncodingError::Unmappable {
                    code_point,
                    ccsid: self.ccsid,
                });
            }
            out.push(self.latin1_to_ebcdic[code_point as usize]);
        }
        Ok(out)
    }

    /// Convert a single EBCDIC byte to Latin-1.
    #[inline]
    pub fn to_latin1_byte(&self, ebcdic: u8) -> u8 {
        self.ebcdic_to_latin1[ebcdic as usize]
    }

    /// Convert a single Latin-1 byte to EBCDIC.
    #[inline]
    pub fn from_latin1_byte(&self, latin1: u8) -> u8 {
        self.latin1_to_ebcdic[latin1 as usize]
    }

    /// Look up a code page by CCSID.
    pub fn from_ccsid(ccsid: u16) -> Option<&'static CodePage> {
        match ccsid {
            1047 => Some(&CP1047),
            37 => Some(&CP037),
            _ => None,
        }
    }
}
