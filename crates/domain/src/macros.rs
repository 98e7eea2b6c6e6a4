//! Macro for implementing Display and FromStr for label enums
//!
//! Wire-facing enums (HTTP methods, error kinds) need a stable string form for
//! logs and config files. This macro provides both directions from a single
//! variant-to-label table.
//!
//! # Example
//!
//! ```rust
//! use conduit_domain::impl_label_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Channel {
//!     Stable,
//!     Beta,
//! }
//!
//! impl_label_conversions!(Channel {
//!     Stable => "stable",
//!     Beta => "beta",
//! });
//!
//! assert_eq!(Channel::Beta.to_string(), "beta");
//! assert_eq!("STABLE".parse::<Channel>().unwrap(), Channel::Stable);
//! ```

/// Implements Display and FromStr traits for label enums
///
/// - Display writes the label exactly as given in the table
/// - FromStr matches labels ASCII case-insensitively
#[macro_export]
macro_rules! impl_label_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
