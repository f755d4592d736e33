//! Charset conversion between CCSIDs.

use std::fmt;

use crate::ebcdic::CodePage;
use crate::error::EncodingError;
use crate::Result;

/// IBM coded character set identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ccsid(pub u16);

impl Ccsid {
    /// UTF-8.
    pub const UTF_8: Ccsid = Ccsid(1208);
    /// ISO-8859-1.
    pub const ISO_8859_1: Ccsid = Ccsid(819);
    /// EBCDIC IBM-1047.
    pub const IBM_1047: Ccsid = Ccsid(1047);
    /// EBCDIC IBM-037.
    pub const IBM_037: Ccsid = Ccsid(37);

    /// Resolve a charset name as it appears in a `Content-Type` header or a
    /// configuration file (`UTF-8`, `ISO-8859-1`, `IBM-1047`, `CP037`, `1047`, ...).
    pub fn from_name(name: &str) -> Result<Ccsid> {
        let normalized: String = name
            .trim()
            .trim_matches('"')
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_uppercase();

        let ccsid = match normalized.as_str() {
            "UTF8" | "1208" => Ccsid::UTF_8,
            "ISO88591" | "LATIN1" | "819" => Ccsid::ISO_8859_1,
            "IBM1047" | "CP1047" | "1047" => Ccsid::IBM_1047,
            "IBM037" | "CP037" | "IBM37" | "037" | "37" => Ccsid::IBM_037,
            _ => {
                return Err(EncodingError::UnsupportedCodePage {
                    name: name.to_string(),
                })
            }
        };
        Ok(ccsid)
    }

    /// The EBCDIC code page for this CCSID, if it is one.
    pub fn code_page(self) -> Option<&'static CodePage> {
        CodePage::from_ccsid(self.0)
    }
}

impl fmt::Display for Ccsid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Ccsid::UTF_8 => write!(f, "UTF-8"),
            Ccsid::ISO_8859_1 => write!(f, "ISO-8859-1"),
            other => match other.code_page() {
                Some(page) => f.write_str(page.name),
                None => write!(f, "CCSID {}", other.0),
            },
        }
    }
}

/// Character-set conversion service.
pub trait Charset: Send + Sync {
    /// Convert `bytes` encoded in `from` into the `to` encoding.
    fn convert(&self, bytes: &[u8], from: Ccsid, to: Ccsid) -> Result<Vec<u8>>;
}

/// Table-driven converter covering UTF-8, ISO-8859-1 and the EBCDIC pages
/// in [`crate::ebcdic`].
#[derive(Debug, Default, Clone, Copy)]
pub struct HostCharset;

impl HostCharset {
    fn decode(bytes: &[u8], from: Ccsid) -> Result<String> {
        match from {
            Ccsid::UTF_8 => std::str::from_utf8(bytes)
                .map(str::to_string)
                .map_err(|e| EncodingError::MalformedInput {
                    ccsid: from.0,
                    offset: e.valid_up_to(),
                }),
            Ccsid::ISO_8859_1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            other => other
                .code_page()
                .map(|page| page.decode(bytes))
                .ok_or_else(|| unsupported(other)),
        }
    }

    fn encode(text: &str, to: Ccsid) -> Result<Vec<u8>> {
        match to {
            Ccsid::UTF_8 => Ok(text.as_bytes().to_vec()),
            Ccsid::ISO_8859_1 => text
                .chars()
                .map(|ch| {
                    u8::try_from(u32::from(ch)).map_err(|_| EncodingError::Unmappable {
                        code_point: u32::from(ch),
                        ccsid: to.0,
                    })
                })
                .collect(),
            other => other
                .code_page()
                .ok_or_else(|| unsupported(other))?
                .encode(text),
        }
    }
}

impl Charset for HostCharset {
    fn convert(&self, bytes: &[u8], from: Ccsid, to: Ccsid) -> Result<Vec<u8>> {
        if from == to {
            // Still validate UTF-8 so callers can rely on the output being well formed.
            if from == Ccsid::UTF_8 {
                Self::decode(bytes, from)?;
            } else if from != Ccsid::ISO_8859_1 && from.code_page().is_none() {
                return Err(unsupported(from));
            }
            return Ok(bytes.to_vec());
        }

        // Single-byte to single-byte conversion goes straight through Latin-1.
        if let (Some(src), Some(dst)) = (from.code_page(), to.code_page()) {
            return Ok(bytes
                .iter()
                .map(|&b| dst.from_latin1_byte(src.to_latin1_byte(b)))
                .collect());
        }

        let text = Self::decode(bytes, from)?;
        Self::encode(&text, to)
    }
}

fn unsupported(ccsid: Ccsid) -> EncodingError {
    EncodingError::UnsupportedCodePage {
        name: ccsid.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_accepts_common_spellings() {
        assert_eq!(Ccsid::from_name("utf-8").unwrap(), Ccsid::UTF_8);
        assert_eq!(Ccsid::from_name("\"UTF8\"").unwrap(), Ccsid::UTF_8);
        assert_eq!(Ccsid::from_name("ISO-8859-1").unwrap(), Ccsid::ISO_8859_1);
        assert_eq!(Ccsid::from_name("IBM-1047").unwrap(), Ccsid::IBM_1047);
        assert_eq!(Ccsid::from_name("cp037").unwrap(), Ccsid::IBM_037);
        assert!(Ccsid::from_name("shift_jis").is_err());
    }

    #[test]
    fn utf8_to_ebcdic_and_back() {
        let cs = HostCharset;
        let ebcdic = cs
            .convert("//JOB1 JOB".as_bytes(), Ccsid::UTF_8, Ccsid::IBM_1047)
            .unwrap();
        assert_eq!(&ebcdic[..2], &[0x61, 0x61]);
        let utf8 = cs.convert(&ebcdic, Ccsid::IBM_1047, Ccsid::UTF_8).unwrap();
        assert_eq!(utf8, b"//JOB1 JOB");
    }

    #[test]
    fn latin1_input_is_widened_to_utf8() {
        let cs = HostCharset;
        let out = cs.convert(&[0x63, 0x61, 0x66, 0xE9], Ccsid::ISO_8859_1, Ccsid::UTF_8).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "café");
    }

    #[test]
    fn invalid_utf8_reports_offset() {
        let cs = HostCharset;
        let err = cs.convert(&[b'a', b'b', 0xFF], Ccsid::UTF_8, Ccsid::UTF_8).unwrap_err();
        assert_eq!(err, EncodingError::MalformedInput { ccsid: 1208, offset: 2 });
    }

    #[test]
    fn ebcdic_to_ebcdic_transcodes_brackets() {
        let cs = HostCharset;
        let out = cs.convert(&[0xAD], Ccsid::IBM_1047, Ccsid::IBM_037).unwrap();
        assert_eq!(out, vec![0xBA]);
    }

    #[test]
    fn unmappable_character_in_target() {
        let cs = HostCharset;
        let err = cs
            .convert("€".as_bytes(), Ccsid::UTF_8, Ccsid::IBM_1047)
            .unwrap_err();
        assert!(matches!(err, EncodingError::Unmappable { code_point: 0x20AC, .. }));
    }
}
