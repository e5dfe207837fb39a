//! Record identifier type.

use core::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Characters rejected anywhere in a record id, besides ASCII whitespace.
const FORBIDDEN_CHARS: &[char] = &['@', '#', '$', '&', '|', '.', ',', '\'', '"', '\\', '/'];

/// Alphabet used for generated ids.
const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Errors that can occur when parsing a [`RecordId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordIdError {
    /// The input string is empty.
    #[error("record id cannot be empty")]
    Empty,
    /// The input contains a reserved character or whitespace.
    #[error("record id contains invalid character {0:?}")]
    InvalidChar(char),
}

/// Identifier of a stored record.
///
/// Generated ids are [`RecordId::DEFAULT_LENGTH`] lowercase alphanumeric
/// characters. Client-supplied ids are accepted by [`RecordId::parse`] as long
/// as they are well formed; the exact-length requirement for new records is
/// enforced by the upsert form, not by this type.
///
/// ## Examples
///
/// ```
/// use address_api_core::RecordId;
///
/// let id = RecordId::generate();
/// assert_eq!(id.as_str().len(), RecordId::DEFAULT_LENGTH);
///
/// assert!(RecordId::parse("abc123def456ghi").is_ok());
/// assert!(RecordId::parse("has space").is_err());
/// assert!(RecordId::parse("dot.ted").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Length of system-generated ids.
    pub const DEFAULT_LENGTH: usize = 15;

    /// Generate a new random id of [`Self::DEFAULT_LENGTH`] characters.
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let id = (0..Self::DEFAULT_LENGTH)
            .map(|_| {
                let idx = rng.random_range(0..ID_ALPHABET.len());
                #[allow(clippy::indexing_slicing)] // idx < ID_ALPHABET.len()
                let byte = ID_ALPHABET[idx];
                char::from(byte)
            })
            .collect();
        Self(id)
    }

    /// Parse a `RecordId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or contains a reserved
    /// character (`@ # $ & | . , ' " \ /`) or ASCII whitespace (space, `\t`,
    /// `\n`, `\x0C`, `\r`). Other Unicode whitespace such as NBSP is allowed.
    pub fn parse(s: &str) -> Result<Self, RecordIdError> {
        Self::check_format(s)?;
        Ok(Self(s.to_owned()))
    }

    /// Check the id format without allocating.
    ///
    /// # Errors
    ///
    /// Same conditions as [`RecordId::parse`].
    pub fn check_format(s: &str) -> Result<(), RecordIdError> {
        if s.is_empty() {
            return Err(RecordIdError::Empty);
        }

        match s
            .chars()
            .find(|c| c.is_ascii_whitespace() || FORBIDDEN_CHARS.contains(c))
        {
            Some(c) => Err(RecordIdError::InvalidChar(c)),
            None => Ok(()),
        }
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RecordId {
    type Err = RecordIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for RecordId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for RecordId {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for RecordId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_length_and_alphabet() {
        for _ in 0..100 {
            let id = RecordId::generate();
            assert_eq!(id.as_str().chars().count(), RecordId::DEFAULT_LENGTH);
            assert!(
                id.as_str()
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
            );
        }
    }

    #[test]
    fn test_generate_is_well_formed() {
        let id = RecordId::generate();
        assert!(RecordId::check_format(id.as_str()).is_ok());
    }

    #[test]
    fn test_generate_unique() {
        assert_ne!(RecordId::generate(), RecordId::generate());
    }

    #[test]
    fn test_parse_valid() {
        assert!(RecordId::parse("abc123def456ghi").is_ok());
        assert!(RecordId::parse("x").is_ok());
        assert!(RecordId::parse("UPPER_and-mixed").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(RecordId::parse(""), Err(RecordIdError::Empty));
    }

    #[test]
    fn test_parse_forbidden_chars() {
        for c in FORBIDDEN_CHARS {
            let s = format!("abc{c}def");
            assert_eq!(RecordId::parse(&s), Err(RecordIdError::InvalidChar(*c)));
        }
    }

    #[test]
    fn test_parse_whitespace() {
        assert_eq!(
            RecordId::parse("abc def"),
            Err(RecordIdError::InvalidChar(' '))
        );
        assert_eq!(
            RecordId::parse("abc\tdef"),
            Err(RecordIdError::InvalidChar('\t'))
        );
        assert_eq!(
            RecordId::parse("abc\x0Cdef"),
            Err(RecordIdError::InvalidChar('\x0C'))
        );
    }

    #[test]
    fn test_parse_allows_non_ascii_whitespace() {
        assert!(RecordId::parse("abcdefg\u{a0}ijklmno").is_ok());
        assert!(RecordId::parse("abc\x0Bdef").is_ok());
    }

    #[test]
    fn test_display_and_from_str() {
        let id: RecordId = "abc123def456ghi".parse().unwrap();
        assert_eq!(format!("{id}"), "abc123def456ghi");
    }

    #[test]
    fn test_serde_transparent() {
        let id = RecordId::parse("abc123def456ghi").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc123def456ghi\"");
    }
}
