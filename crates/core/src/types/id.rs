//! Newtype IDs for type-safe entity references.

/// Define a newtype ID over `i32`.
///
/// The wrapper serializes transparently, displays as the raw value, and
/// (under the `postgres` feature) maps to `INT4`. Distinct ID types do not
/// unify, so a member ID cannot be passed where some other entity's ID is
/// expected.
///
/// # Example
///
/// ```rust
/// # use cascade_officials_core::define_id;
/// define_id!(MemberId, "Primary key of a `members` row.");
///
/// let id = MemberId::new(1);
/// assert_eq!(id.as_i32(), 1);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn as_i32(self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        $crate::id_pg_impls!($name);
    };
}

/// Postgres scalar impls for an ID newtype, delegating to `i32`.
#[doc(hidden)]
#[macro_export]
#[cfg(feature = "postgres")]
macro_rules! id_pg_impls {
    ($name:ident) => {
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                Ok(Self(<i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(
                    value,
                )?))
            }
        }

        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
#[cfg(not(feature = "postgres"))]
macro_rules! id_pg_impls {
    ($name:ident) => {};
}

define_id!(MemberId, "Primary key of a `members` row.");

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::MemberId;

    #[test]
    fn round_trips_through_i32() {
        let id = MemberId::new(42);
        assert_eq!(id.as_i32(), 42);
        assert_eq!(MemberId::from(42), id);
        assert_eq!(i32::from(id), 42);
    }

    #[test]
    fn display_is_the_raw_value() {
        assert_eq!(MemberId::new(7).to_string(), "7");
    }

    #[test]
    fn serde_is_transparent() {
        let id = MemberId::new(9);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "9");
        let back: MemberId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
