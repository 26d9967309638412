//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why a string failed to parse as an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {MAX_EMAIL_LEN} characters")]
    TooLong,
    #[error("email must not contain whitespace")]
    ContainsWhitespace,
    #[error("email must contain an @ symbol")]
    MissingAtSymbol,
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    #[error("email domain cannot be empty")]
    EmptyDomain,
}

/// RFC 5321 address length limit.
pub const MAX_EMAIL_LEN: usize = 254;

/// A member email address.
///
/// Emails are the login identifier for the members portal, so they are
/// normalized to lowercase on parse and matched case-insensitively
/// throughout the system. Validation is structural only: non-empty local
/// part and domain around an @ symbol, no whitespace, within the RFC 5321
/// length limit. Deliverability is the mail relay's problem.
///
/// ## Examples
///
/// ```
/// use cascade_officials_core::Email;
///
/// let email = Email::parse("Referee@Example.com").unwrap();
/// assert_eq!(email.as_str(), "referee@example.com");
///
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("@example.com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parse and normalize an address.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] naming the first structural problem found.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        match s.len() {
            0 => return Err(EmailError::Empty),
            n if n > MAX_EMAIL_LEN => return Err(EmailError::TooLong),
            _ => {}
        }
        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::ContainsWhitespace);
        }
        match s.split_once('@') {
            None => Err(EmailError::MissingAtSymbol),
            Some(("", _)) => Err(EmailError::EmptyLocalPart),
            Some((_, "")) => Err(EmailError::EmptyDomain),
            Some(_) => Ok(Self(s.to_lowercase())),
        }
    }

    /// The normalized address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part after the @.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
mod pg {
    use super::Email;

    impl sqlx::Type<sqlx::Postgres> for Email {
        fn type_info() -> sqlx::postgres::PgTypeInfo {
            <String as sqlx::Type<sqlx::Postgres>>::type_info()
        }

        fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
            <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
        }
    }

    impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Email {
        fn decode(
            value: sqlx::postgres::PgValueRef<'r>,
        ) -> Result<Self, sqlx::error::BoxDynError> {
            // Stored values were normalized on the way in.
            Ok(Self(<String as sqlx::Decode<sqlx::Postgres>>::decode(
                value,
            )?))
        }
    }

    impl sqlx::Encode<'_, sqlx::Postgres> for Email {
        fn encode_by_ref(
            &self,
            buf: &mut sqlx::postgres::PgArgumentBuffer,
        ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
            <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_shapes() {
        for ok in [
            "official@cascadeofficials.org",
            "first.last@example.com",
            "user+portal@example.co.uk",
            "a@b",
        ] {
            assert!(Email::parse(ok).is_ok(), "{ok} should parse");
        }
    }

    #[test]
    fn normalizes_to_lowercase() {
        let email = Email::parse("Referee@Example.COM").unwrap();
        assert_eq!(email.as_str(), "referee@example.com");
    }

    #[test]
    fn names_the_structural_problem() {
        let cases = [
            ("", EmailError::Empty),
            ("user name@example.com", EmailError::ContainsWhitespace),
            ("not-an-email", EmailError::MissingAtSymbol),
            ("@example.com", EmailError::EmptyLocalPart),
            ("user@", EmailError::EmptyDomain),
        ];
        for (input, expected) in cases {
            assert_eq!(Email::parse(input).unwrap_err(), expected, "{input:?}");
        }

        let long = format!("{}@example.com", "a".repeat(250));
        assert_eq!(Email::parse(&long).unwrap_err(), EmailError::TooLong);
    }

    #[test]
    fn domain_accessor() {
        let email = Email::parse("user@example.com").unwrap();
        assert_eq!(email.domain(), "example.com");
    }

    #[test]
    fn serde_round_trip() {
        let email = Email::parse("user@example.com").unwrap();
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"user@example.com\"");
        let back: Email = serde_json::from_str(&json).unwrap();
        assert_eq!(back, email);
    }
}
