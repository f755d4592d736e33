//! Dataset, member and DD names, and the `NAME(MEMBER)` path grammar.

use std::fmt;

use crate::error::NameError;

/// Maximum dataset name length.
pub const DSNAME_MAX: usize = 44;
/// Maximum member, qualifier and DD name length.
pub const NAME8_MAX: usize = 8;

fn is_national(c: char) -> bool {
    matches!(c, '@' | '#' | '$')
}

/// Validate a 1-8 character name segment. `allow_hyphen` admits `-` after the
/// first character, which qualifiers allow and member names do not.
fn check_segment(segment: &str, allow_hyphen: bool) -> Result<(), String> {
    if segment.is_empty() || segment.len() > NAME8_MAX {
        return Err(format!("'{}' must be 1-8 characters", segment));
    }
    let mut chars = segment.chars();
    if let Some(first) = chars.next() {
        if !(first.is_ascii_uppercase() || is_national(first)) {
            return Err(format!("'{}' must start with a letter or @ # $", segment));
        }
    }
    for c in chars {
        let ok = c.is_ascii_uppercase()
            || c.is_ascii_digit()
            || is_national(c)
            || (allow_hyphen && c == '-');
        if !ok {
            return Err(format!("'{}' contains invalid character '{}'", segment, c));
        }
    }
    Ok(())
}

/// A validated, upper-case dataset name of at most 44 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetName(String);

impl DatasetName {
    /// Validate and upper-case a dataset name.
    pub fn new(name: &str) -> Result<Self, NameError> {
        let upper = name.trim().to_ascii_uppercase();
        if upper.is_empty() || upper.len() > DSNAME_MAX {
            return Err(NameError::InvalidDsname {
                name: name.to_string(),
                reason: "must be 1-44 characters".to_string(),
            });
        }
        for qualifier in upper.split('.') {
            check_segment(qualifier, true).map_err(|reason| NameError::InvalidDsname {
                name: name.to_string(),
                reason: format!("qualifier {}", reason),
            })?;
        }
        Ok(Self(upper))
    }

    /// The name without padding.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name space-padded to 44 characters.
    pub fn padded(&self) -> String {
        format!("{:<width$}", self.0, width = DSNAME_MAX)
    }
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated, upper-case PDS member name of at most 8 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberName(String);

impl MemberName {
    /// Validate and upper-case a member name.
    pub fn new(name: &str) -> Result<Self, NameError> {
        let upper = name.trim().to_ascii_uppercase();
        check_segment(&upper, false).map_err(|reason| NameError::InvalidMember {
            name: name.to_string(),
            reason,
        })?;
        Ok(Self(upper))
    }

    /// The name without padding.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Space-padded to 8 characters; all blanks when there is no member.
    pub fn padded(member: Option<&MemberName>) -> String {
        format!(
            "{:<width$}",
            member.map(MemberName::as_str).unwrap_or(""),
            width = NAME8_MAX
        )
    }
}

impl fmt::Display for MemberName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An 8-character DD name identifying an allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DdName(String);

impl DdName {
    /// System-generated DD name `SYSnnnnn`.
    pub fn generated(number: u32) -> Self {
        Self(format!("SYS{:05}", number % 100_000))
    }

    /// The name without padding.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DdName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<width$}", self.0, width = NAME8_MAX)
    }
}

/// A dataset reference of the form `NAME` or `NAME(MEMBER)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPath {
    /// Dataset name.
    pub dataset: DatasetName,
    /// Member name, for partitioned datasets.
    pub member: Option<MemberName>,
}

impl DatasetPath {
    /// Parse a dataset reference.
    ///
    /// Accepts the bare form (`IBMUSER.JCL(PAYROLL)`) and the quoted
    /// file-path form (`//'IBMUSER.JCL(PAYROLL)'`).
    pub fn parse(path: &str) -> Result<Self, NameError> {
        let invalid = || NameError::InvalidPath {
            path: path.to_string(),
        };

        let trimmed = path.trim();
        let body = match trimmed.strip_prefix("//'") {
            Some(rest) => rest.strip_suffix('\'').ok_or_else(invalid)?,
            None => trimmed,
        };

        let left = body.find('(');
        let right = body.find(')');
        match (left, right) {
            (None, None) => Ok(Self {
                dataset: DatasetName::new(body)?,
                member: None,
            }),
            (Some(l), Some(r)) if r == body.len() - 1 && l < r => Ok(Self {
                dataset: DatasetName::new(&body[..l])?,
                member: Some(MemberName::new(&body[l + 1..r])?),
            }),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for DatasetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.member {
            Some(member) => write!(f, "{}({})", self.dataset, member),
            None => write!(f, "{}", self.dataset),
        }
    }
}
