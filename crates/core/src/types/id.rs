//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different upstream entity types.

use thiserror::Error;

/// Error returned when a caller-supplied identifier is not a valid number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid value for '{name}': {value}")]
pub struct InvalidId {
    /// Name of the parameter that carried the value.
    pub name: &'static str,
    /// The rejected raw value.
    pub value: String,
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Ord`
/// - Conversion methods: `new()`, `as_i64()`, `parse()`
/// - `From<i64>` and `Into<i64>` implementations
///
/// # Example
///
/// ```rust
/// # use commerce_bridge_core::define_id;
/// define_id!(PageId);
/// define_id!(BrandId);
///
/// let page_id = PageId::new(1);
/// let brand_id = BrandId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: PageId = brand_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }

            /// Parse a caller-supplied identifier.
            ///
            /// `name` is the parameter name reported in the error.
            ///
            /// # Errors
            ///
            /// Returns `InvalidId` if the value is not an integer.
            pub fn parse(
                name: &'static str,
                value: &str,
            ) -> ::core::result::Result<Self, $crate::types::id::InvalidId> {
                value
                    .trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| $crate::types::id::InvalidId {
                        name,
                        value: value.to_string(),
                    })
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Upstream entity IDs
define_id!(CategoryId);
define_id!(ContentId);
define_id!(ProductId);

impl CategoryId {
    /// Parent id carried by top-level categories.
    pub const ROOT: Self = Self(0);
}

/// Parse a list of caller-supplied ids, silently dropping invalid entries.
///
/// Entries that are not integers, or that parse to `0`, are ignored. The
/// bridge host sends whatever ids it has stored, and stale or malformed ones
/// must not fail the whole request.
pub fn parse_id_list<T, S>(raw: &[S]) -> Vec<T>
where
    T: From<i64>,
    S: AsRef<str>,
{
    raw.iter()
        .filter_map(|value| value.as_ref().trim().parse::<i64>().ok())
        .filter(|id| *id != 0)
        .map(T::from)
        .collect()
}
