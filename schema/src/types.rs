use std::fmt;
use std::str::FromStr;

/// The primitive types of the Sia schema language.
///
/// Any other type name appearing in a field is expected to name a schema
/// declared in the same compilation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiaType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Bool,
    String,
    String8,
    String16,
    String32,
    String64,
    ByteN,
    Byte8,
    Byte16,
    Byte32,
    Byte64,
    BigInt,
}

pub const ALL_TYPES: [SiaType; 20] = [
    SiaType::Int8,
    SiaType::Int16,
    SiaType::Int32,
    SiaType::Int64,
    SiaType::UInt8,
    SiaType::UInt16,
    SiaType::UInt32,
    SiaType::UInt64,
    SiaType::Bool,
    SiaType::String,
    SiaType::String8,
    SiaType::String16,
    SiaType::String32,
    SiaType::String64,
    SiaType::ByteN,
    SiaType::Byte8,
    SiaType::Byte16,
    SiaType::Byte32,
    SiaType::Byte64,
    SiaType::BigInt,
];

impl SiaType {
    /// Looks up a primitive by its schema-language spelling.
    pub fn from_name(name: &str) -> Option<SiaType> {
        ALL_TYPES.iter().copied().find(|t| t.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SiaType::Int8     => "int8",
            SiaType::Int16    => "int16",
            SiaType::Int32    => "int32",
            SiaType::Int64    => "int64",
            SiaType::UInt8    => "uint8",
            SiaType::UInt16   => "uint16",
            SiaType::UInt32   => "uint32",
            SiaType::UInt64   => "uint64",
            SiaType::Bool     => "bool",
            SiaType::String   => "string",
            SiaType::String8  => "string8",
            SiaType::String16 => "string16",
            SiaType::String32 => "string32",
            SiaType::String64 => "string64",
            SiaType::ByteN    => "byteN",
            SiaType::Byte8    => "byte8",
            SiaType::Byte16   => "byte16",
            SiaType::Byte32   => "byte32",
            SiaType::Byte64   => "byte64",
            SiaType::BigInt   => "bigint",
        }
    }

    pub fn is_signed_integer(&self) -> bool {
        matches!(self, SiaType::Int8 | SiaType::Int16 | SiaType::Int32 | SiaType::Int64)
    }

    pub fn is_unsigned_integer(&self) -> bool {
        matches!(self, SiaType::UInt8 | SiaType::UInt16 | SiaType::UInt32 | SiaType::UInt64)
    }

    /// Fixed-width integers only; `bigint` is classified separately.
    pub fn is_integer(&self) -> bool {
        self.is_signed_integer() || self.is_unsigned_integer()
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, SiaType::Bool)
    }

    /// The plain `string` type, whose length prefix is picked from its `max` option.
    pub fn is_generic_string(&self) -> bool {
        matches!(self, SiaType::String)
    }

    pub fn is_sized_string(&self) -> bool {
        matches!(
            self,
            SiaType::String8 | SiaType::String16 | SiaType::String32 | SiaType::String64
        )
    }

    pub fn is_string(&self) -> bool {
        self.is_generic_string() || self.is_sized_string()
    }

    /// `byteN`: a byte array of fixed length, given by `length` or `fromEnd`.
    pub fn is_generic_byte_array(&self) -> bool {
        matches!(self, SiaType::ByteN)
    }

    pub fn is_sized_byte_array(&self) -> bool {
        matches!(
            self,
            SiaType::Byte8 | SiaType::Byte16 | SiaType::Byte32 | SiaType::Byte64
        )
    }

    pub fn is_byte_array(&self) -> bool {
        self.is_generic_byte_array() || self.is_sized_byte_array()
    }

    pub fn is_bigint(&self) -> bool {
        matches!(self, SiaType::BigInt)
    }

    /// Bit width of the value (integers) or of the length prefix (strings and
    /// byte arrays). `None` for types without a fixed width.
    pub fn width_bits(&self) -> Option<u8> {
        match self {
            SiaType::Int8 | SiaType::UInt8 | SiaType::String8 | SiaType::Byte8 => Some(8),
            SiaType::Int16 | SiaType::UInt16 | SiaType::String16 | SiaType::Byte16 => Some(16),
            SiaType::Int32 | SiaType::UInt32 | SiaType::String32 | SiaType::Byte32 => Some(32),
            SiaType::Int64 | SiaType::UInt64 | SiaType::String64 | SiaType::Byte64 => Some(64),
            SiaType::BigInt => Some(64),
            SiaType::Bool | SiaType::String | SiaType::ByteN => None,
        }
    }

    /// Name of the runtime helper that writes one element of an array of
    /// this type, e.g. `serializeInt8ArrayItem`.
    pub fn array_item_serializer(&self) -> &'static str {
        match self {
            SiaType::Int8     => "serializeInt8ArrayItem",
            SiaType::Int16    => "serializeInt16ArrayItem",
            SiaType::Int32    => "serializeInt32ArrayItem",
            SiaType::Int64    => "serializeInt64ArrayItem",
            SiaType::UInt8    => "serializeUInt8ArrayItem",
            SiaType::UInt16   => "serializeUInt16ArrayItem",
            SiaType::UInt32   => "serializeUInt32ArrayItem",
            SiaType::UInt64   => "serializeUInt64ArrayItem",
            SiaType::Bool     => "serializeBoolArrayItem",
            SiaType::String   => "serializeStringArrayItem",
            SiaType::String8  => "serializeString8ArrayItem",
            SiaType::String16 => "serializeString16ArrayItem",
            SiaType::String32 => "serializeString32ArrayItem",
            SiaType::String64 => "serializeString64ArrayItem",
            SiaType::ByteN    => "serializeByteArrayNArrayItem",
            SiaType::Byte8    => "serializeByteArray8ArrayItem",
            SiaType::Byte16   => "serializeByteArray16ArrayItem",
            SiaType::Byte32   => "serializeByteArray32ArrayItem",
            SiaType::Byte64   => "serializeByteArray64ArrayItem",
            SiaType::BigInt   => "serializeBigIntArrayItem",
        }
    }
}

impl fmt::Display for SiaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SiaType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SiaType::from_name(s).ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for ty in ALL_TYPES {
            assert_eq!(SiaType::from_name(ty.as_str()), Some(ty));
        }
        assert_eq!(SiaType::from_name("Person"), None);
        assert_eq!(SiaType::from_name("String8"), None);
    }

    #[test]
    fn test_classification_is_a_partition() {
        for ty in ALL_TYPES {
            let classes = [
                ty.is_integer(),
                ty.is_bool(),
                ty.is_string(),
                ty.is_byte_array(),
                ty.is_bigint(),
            ];
            assert_eq!(classes.iter().filter(|c| **c).count(), 1, "{}", ty);
        }
    }

    #[test]
    fn test_string_and_byte_families() {
        assert!(SiaType::String.is_generic_string());
        assert!(!SiaType::String.is_sized_string());
        assert!(SiaType::String16.is_sized_string());
        assert!(SiaType::ByteN.is_generic_byte_array());
        assert!(SiaType::Byte32.is_sized_byte_array());
        assert!(!SiaType::Byte32.is_string());
        assert!(SiaType::UInt8.is_unsigned_integer());
        assert!(!SiaType::UInt8.is_signed_integer());
        assert!(!SiaType::BigInt.is_integer());
    }

    #[test]
    fn test_width_bits() {
        assert_eq!(SiaType::String8.width_bits(), Some(8));
        assert_eq!(SiaType::Byte64.width_bits(), Some(64));
        assert_eq!(SiaType::Int16.width_bits(), Some(16));
        assert_eq!(SiaType::String.width_bits(), None);
        assert_eq!(SiaType::ByteN.width_bits(), None);
    }
}
