use crate::error::{mismatched_types, BoxDynError, Error};
use crate::type_info::{DataKind, VerticaTypeInfo};
use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};

/// A single cell of a result row.
///
/// Cells are fetched from the driver as text (or raw bytes for binary columns)
/// and decoded on demand through [`Decode`].
#[derive(Debug, Clone, PartialEq)]
pub struct VerticaValue {
    pub(crate) type_info: VerticaTypeInfo,
    pub(crate) raw: Option<Vec<u8>>,
}

impl VerticaValue {
    pub fn null(type_info: VerticaTypeInfo) -> Self {
        Self {
            type_info,
            raw: None,
        }
    }

    pub fn from_text(type_info: VerticaTypeInfo, text: impl Into<String>) -> Self {
        Self {
            type_info,
            raw: Some(text.into().into_bytes()),
        }
    }

    pub fn from_bytes(type_info: VerticaTypeInfo, bytes: Vec<u8>) -> Self {
        Self {
            type_info,
            raw: Some(bytes),
        }
    }

    pub fn type_info(&self) -> &VerticaTypeInfo {
        &self.type_info
    }

    pub fn is_null(&self) -> bool {
        self.raw.is_none()
    }

    /// The cell as text; invalid UTF-8 is replaced.
    pub fn as_str(&self) -> Option<Cow<'_, str>> {
        self.raw.as_deref().map(String::from_utf8_lossy)
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.raw.as_deref()
    }

    pub fn try_decode<T: Decode>(&self) -> Result<T, Error> {
        T::decode(self).map_err(Error::Decode)
    }
}

impl Display for VerticaValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(text) => f.write_str(&text),
            None => f.write_str("NULL"),
        }
    }
}

/// An unexpected `NULL` was encountered during decoding.
#[derive(Debug, Clone, Copy)]
pub struct UnexpectedNullError;

impl Display for UnexpectedNullError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("unexpected null; try decoding as an `Option`")
    }
}

impl std::error::Error for UnexpectedNullError {}

/// A type that can be decoded from a [`VerticaValue`].
pub trait Decode: Sized {
    fn decode(value: &VerticaValue) -> Result<Self, BoxDynError>;
}

fn text_of(value: &VerticaValue) -> Result<Cow<'_, str>, BoxDynError> {
    value.as_str().ok_or_else(|| UnexpectedNullError.into())
}

impl<T: Decode> Decode for Option<T> {
    fn decode(value: &VerticaValue) -> Result<Self, BoxDynError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::decode(value).map(Some)
        }
    }
}

impl Decode for String {
    fn decode(value: &VerticaValue) -> Result<Self, BoxDynError> {
        Ok(text_of(value)?.into_owned())
    }
}

impl Decode for Vec<u8> {
    fn decode(value: &VerticaValue) -> Result<Self, BoxDynError> {
        value
            .as_bytes()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| UnexpectedNullError.into())
    }
}

macro_rules! impl_decode_parse {
    ($($ty:ty),*) => {
        $(
            impl Decode for $ty {
                fn decode(value: &VerticaValue) -> Result<Self, BoxDynError> {
                    let text = text_of(value)?;
                    text.trim()
                        .parse::<$ty>()
                        .map_err(|_| mismatched_types::<$ty>(value.type_info.name()))
                }
            }
        )*
    };
}

impl_decode_parse!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl Decode for bool {
    fn decode(value: &VerticaValue) -> Result<Self, BoxDynError> {
        let text = text_of(value)?;
        parse_bool(&text).ok_or_else(|| mismatched_types::<bool>(value.type_info.name()))
    }
}

/// Parses the boolean spellings drivers use for `BOOLEAN` columns.
pub(crate) fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" | "on" => Some(true),
        "0" | "f" | "false" | "n" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

impl VerticaValue {
    /// Loose truthiness, used by catalog flags such as `is_identity`.
    pub(crate) fn is_truthy(&self) -> bool {
        match self.as_str() {
            None => false,
            Some(text) => match self.type_info.kind() {
                DataKind::Integer | DataKind::Numeric | DataKind::Float => text
                    .trim()
                    .parse::<f64>()
                    .map(|n| n != 0.0)
                    .unwrap_or(false),
                _ => parse_bool(&text).unwrap_or(false),
            },
        }
    }
}
