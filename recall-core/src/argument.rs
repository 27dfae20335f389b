//! Argument capture for call fingerprinting
//!
//! The interception seam cannot hand the fingerprint builder live values of
//! arbitrary types, so each argument is captured up front as a
//! [`KeyArgument`]: the runtime type name, the canonical serde encoding, an
//! optional textual representation and a primitive/value-type marker. The
//! resolution pipeline in [`crate::key`] then works over these captures
//! alone.

use std::any::type_name;
use std::fmt::Display;

use serde::Serialize;
use serde_json::Value;

use crate::config::ArgumentResolver;
use crate::error::KeyError;

/// Marker standing in for a caller-supplied cancellation token argument.
///
/// The default configuration ignores this type, so passing it never affects
/// the fingerprint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cancellation;

impl Cancellation {
    /// Runtime type name of the marker, as stored in the ignore set.
    pub fn type_name() -> &'static str {
        type_name::<Cancellation>()
    }
}

/// One method argument, captured for fingerprinting.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyArgument {
    type_name: &'static str,
    value: Value,
    display: Option<String>,
    scalar: bool,
}

impl KeyArgument {
    fn capture(
        type_name: &'static str,
        value: Value,
        display: Option<String>,
        scalar: bool,
    ) -> Self {
        Self {
            type_name,
            value,
            display,
            scalar,
        }
    }

    /// Capture a primitive/value-type argument. Its canonical encoding is
    /// used verbatim.
    pub fn scalar<T: Serialize>(argument: &T) -> Result<Self, KeyError> {
        Ok(Self::capture(
            type_name::<T>(),
            serde_json::to_value(argument)?,
            None,
            true,
        ))
    }

    /// Capture an argument that has a meaningful textual representation.
    ///
    /// When the rendered text differs from the type name, the text replaces
    /// the raw value in the canonical encoding.
    pub fn displayed<T: Serialize + Display>(argument: &T) -> Result<Self, KeyError> {
        Ok(Self::capture(
            type_name::<T>(),
            serde_json::to_value(argument)?,
            Some(argument.to_string()),
            false,
        ))
    }

    /// Capture an argument by its serde encoding alone.
    pub fn opaque<T: Serialize>(argument: &T) -> Result<Self, KeyError> {
        Ok(Self::capture(
            type_name::<T>(),
            serde_json::to_value(argument)?,
            None,
            false,
        ))
    }

    /// Runtime type name of the captured argument.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Canonical serde encoding of the captured argument.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Resolve the value that participates in the canonical encoding.
    ///
    /// Order matters: a configured resolver replacement wins, then scalars
    /// pass through unchanged, then a meaningful textual representation
    /// (one that differs from the type's own name) replaces the raw value.
    pub(crate) fn resolved(&self, resolver: Option<&ArgumentResolver>) -> Value {
        if let Some(resolver) = resolver {
            if let Some(replacement) = resolver(self.type_name, &self.value) {
                return replacement;
            }
        }

        if self.scalar {
            return self.value.clone();
        }

        if let Some(display) = &self.display {
            if display != self.type_name {
                return Value::String(display.clone());
            }
        }

        self.value.clone()
    }
}

/// Conversion into a captured key argument.
///
/// Implemented for the primitive types an interception seam passes most
/// often; everything else goes through [`KeyArgument::displayed`] or
/// [`KeyArgument::opaque`] explicitly.
pub trait IntoKeyArgument {
    fn into_key_argument(self) -> Result<KeyArgument, KeyError>;
}

impl IntoKeyArgument for KeyArgument {
    fn into_key_argument(self) -> Result<KeyArgument, KeyError> {
        Ok(self)
    }
}

macro_rules! scalar_key_argument {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoKeyArgument for $ty {
                fn into_key_argument(self) -> Result<KeyArgument, KeyError> {
                    KeyArgument::scalar(&self)
                }
            }
        )*
    };
}

scalar_key_argument!(
    i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, isize, usize, f32, f64, bool, char, String,
);

impl IntoKeyArgument for &str {
    fn into_key_argument(self) -> Result<KeyArgument, KeyError> {
        KeyArgument::scalar(&self)
    }
}

impl IntoKeyArgument for Cancellation {
    fn into_key_argument(self) -> Result<KeyArgument, KeyError> {
        Ok(KeyArgument::capture(
            Cancellation::type_name(),
            Value::Null,
            None,
            true,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_scalar_capture() {
        let arg = 42i32.into_key_argument().expect("capture should succeed");
        assert_eq!(arg.value(), &Value::from(42));
        assert_eq!(arg.type_name(), "i32");
        assert_eq!(arg.resolved(None), Value::from(42));
    }

    #[test]
    fn test_string_capture_resolves_to_itself() {
        let arg = "hello".into_key_argument().expect("capture should succeed");
        assert_eq!(arg.resolved(None), Value::String("hello".to_string()));
    }

    #[test]
    fn test_displayed_capture_uses_text() {
        #[derive(Serialize)]
        struct UserRef {
            id: u64,
        }

        impl Display for UserRef {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "user:{}", self.id)
            }
        }

        let arg = KeyArgument::displayed(&UserRef { id: 7 }).expect("capture should succeed");
        assert_eq!(arg.resolved(None), Value::String("user:7".to_string()));
    }

    #[test]
    fn test_display_matching_type_name_falls_back_to_value() {
        #[derive(Serialize)]
        struct Opaque {
            id: u64,
        }

        impl Display for Opaque {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                // Default-style representation: just the type name.
                f.write_str(type_name::<Opaque>())
            }
        }

        let arg = KeyArgument::displayed(&Opaque { id: 7 }).expect("capture should succeed");
        assert_eq!(arg.resolved(None), serde_json::json!({ "id": 7 }));
    }

    #[test]
    fn test_resolver_replacement_wins() {
        let arg = 42i32.into_key_argument().expect("capture should succeed");
        let resolver = |_: &str, _: &Value| Some(Value::String("resolved".to_string()));
        assert_eq!(
            arg.resolved(Some(&resolver)),
            Value::String("resolved".to_string())
        );
    }

    #[test]
    fn test_resolver_none_keeps_original() {
        let arg = 42i32.into_key_argument().expect("capture should succeed");
        let resolver = |_: &str, _: &Value| None;
        assert_eq!(arg.resolved(Some(&resolver)), Value::from(42));
    }

    #[test]
    fn test_non_encodable_argument_fails() {
        // serde_json rejects maps with non-string keys.
        let mut bad = HashMap::new();
        bad.insert((1u8, 2u8), "value");
        assert!(KeyArgument::opaque(&bad).is_err());
    }

    #[test]
    fn test_cancellation_marker() {
        let arg = Cancellation
            .into_key_argument()
            .expect("capture should succeed");
        assert_eq!(arg.type_name(), Cancellation::type_name());
        assert_eq!(arg.value(), &Value::Null);
    }
}
