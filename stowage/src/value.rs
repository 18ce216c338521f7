use std::convert::TryFrom;

use crate::StowageError;

/// Tag prepended to every encoded value so decoding is a direct dispatch
/// instead of guessing the type from the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValueKind {
    Number,
    String,
    Structured,
}

impl ValueKind {
    fn tag(self) -> &'static str {
        match self {
            ValueKind::Number => "n:",
            ValueKind::String => "s:",
            ValueKind::Structured => "j:",
        }
    }
}

/// An application-level value as stored through [`Stowage`](crate::Stowage).
///
/// The medium only speaks strings, so values are enveloped with a one-byte
/// kind tag on write. A literal string `"42"` and the number `42` therefore
/// stay distinguishable after a round trip.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    String(String),
    Structured(serde_json::Value),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Number(_) => ValueKind::Number,
            Self::String(_) => ValueKind::String,
            Self::Structured(_) => ValueKind::Structured,
        }
    }

    /// Encode the value to the medium's string form, tag included.
    pub fn encode(&self) -> String {
        match self {
            Self::Number(n) => format!("{}{}", ValueKind::Number.tag(), n),
            Self::String(s) => format!("{}{}", ValueKind::String.tag(), s),
            // serde_json::Value only holds string map keys, serializing it
            // back to text can't fail
            Self::Structured(v) => format!(
                "{}{}",
                ValueKind::Structured.tag(),
                serde_json::to_string(v).unwrap_or_default()
            ),
        }
    }

    /// Decode a raw medium string back into a value.
    ///
    /// Decoding is total: a recognized tag dispatches to its payload parser,
    /// anything else, including a tagged payload that fails to parse, comes
    /// back as `Value::String` holding the raw string untouched. Strings
    /// written to the medium by other parties are therefore readable as-is.
    pub fn decode(mut raw: String) -> Value {
        // Matching on bytes as the first char of the raw string may well be
        // multibyte when it wasn't written through the codec
        let kind = match raw.as_bytes() {
            [b'n', b':', ..] => Some(ValueKind::Number),
            [b's', b':', ..] => Some(ValueKind::String),
            [b'j', b':', ..] => Some(ValueKind::Structured),
            _ => None,
        };

        match kind {
            Some(ValueKind::Number) => {
                if let Ok(n) = raw[2..].parse::<f64>() {
                    return Value::Number(n);
                }
            }
            Some(ValueKind::String) => return Value::String(raw.split_off(2)),
            Some(ValueKind::Structured) => {
                if let Ok(v) = serde_json::from_str(&raw[2..]) {
                    return Value::Structured(v);
                }
            }
            None => {}
        }
        Value::String(raw)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Self::Structured(value)
    }
}

macro_rules! impl_from_number {
    ($number:ty) => {
        impl From<$number> for Value {
            fn from(value: $number) -> Self {
                Self::Number(value as f64)
            }
        }

        impl<'b> From<&'b $number> for Value {
            fn from(value: &'b $number) -> Self {
                Self::Number(*value as f64)
            }
        }
    };
}

impl_from_number!(u8);
impl_from_number!(i8);
impl_from_number!(u16);
impl_from_number!(i16);
impl_from_number!(u32);
impl_from_number!(i32);
impl_from_number!(i64);
impl_from_number!(f32);
impl_from_number!(f64);

impl TryFrom<Value> for f64 {
    type Error = StowageError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(n) => Ok(n),
            _ => Err(StowageError::TypeConversion),
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = StowageError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(n) if n.fract() == 0.0 => Ok(n as i64),
            _ => Err(StowageError::TypeConversion),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = StowageError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(val) => Ok(val),
            Value::Number(n) => Ok(n.to_string()),
            Value::Structured(_) => Err(StowageError::TypeConversion),
        }
    }
}

impl TryFrom<Value> for serde_json::Value {
    type Error = StowageError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Structured(val) => Ok(val),
            _ => Err(StowageError::TypeConversion),
        }
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_encode_tags() {
        assert_eq!(Value::from(42).encode(), "n:42");
        assert_eq!(Value::from(13.37).encode(), "n:13.37");
        assert_eq!(Value::from("val").encode(), "s:val");
        assert_eq!(Value::from(json!([1, 2])).encode(), "j:[1,2]");
    }

    #[test]
    fn test_decode_dispatch() {
        assert_eq!(Value::decode("n:42".to_owned()), Value::Number(42.0));
        assert_eq!(
            Value::decode("s:some string".to_owned()),
            Value::String("some string".to_owned())
        );
        assert_eq!(
            Value::decode(r#"j:{"a":1}"#.to_owned()),
            Value::Structured(json!({"a": 1}))
        );
    }

    #[test]
    fn test_number_string_are_distinguishable() {
        // A literal "42" and the number 42 encode differently and come back
        // as their original kinds
        let as_num = Value::from(42).encode();
        let as_str = Value::from("42").encode();
        assert_ne!(as_num, as_str);

        assert_eq!(Value::decode(as_num), Value::Number(42.0));
        assert_eq!(Value::decode(as_str), Value::String("42".to_owned()));
    }

    #[test]
    fn test_decode_never_fails() {
        // Untagged strings, foreign writes to the medium, come back verbatim
        assert_eq!(
            Value::decode("some random bytes".to_owned()),
            Value::String("some random bytes".to_owned())
        );
        assert_eq!(Value::decode("".to_owned()), Value::String("".to_owned()));
        assert_eq!(Value::decode("n".to_owned()), Value::String("n".to_owned()));

        // A tagged but unparsable payload degrades to the raw string
        assert_eq!(
            Value::decode("n:not a number".to_owned()),
            Value::String("n:not a number".to_owned())
        );
        assert_eq!(
            Value::decode("j:{broken".to_owned()),
            Value::String("j:{broken".to_owned())
        );
    }

    #[test]
    fn test_structured_roundtrip() {
        let v = json!({
            "name": "Mamad",
            "height": 160,
            "says_hello": false,
            "friends": ["Akbar", "Asghar"]
        });
        let encoded = Value::from(v.clone()).encode();
        assert_eq!(Value::decode(encoded), Value::Structured(v));
    }

    #[test]
    fn test_conversions() {
        use std::convert::TryInto;

        let n: f64 = Value::Number(1337.0).try_into().unwrap();
        assert_eq!(n, 1337.0);

        let n: i64 = Value::Number(1337.0).try_into().unwrap();
        assert_eq!(n, 1337);

        let r: Result<i64, _> = Value::Number(13.37).try_into();
        assert!(r.is_err());

        let s: String = Value::String("val".to_owned()).try_into().unwrap();
        assert_eq!(s, "val");

        let r: Result<f64, _> = Value::String("val".to_owned()).try_into();
        assert!(r.is_err());
    }
}
