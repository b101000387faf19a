//! PackStream marker byte constants and size-tier selection.
//!
//! This table is the wire contract shared by the encoder and the decoder.
//! Both sides go through [`SizeTier`], [`IntTier`] and [`classify`] so the
//! two directions cannot drift apart.

/// Revision of the marker table below.
pub const PACKSTREAM_VERSION: u8 = 1;

// Null
pub const NULL: u8 = 0xC0;

// Boolean
pub const FALSE: u8 = 0xC2;
pub const TRUE: u8 = 0xC3;

// Float (IEEE 754 double-precision)
pub const FLOAT_64: u8 = 0xC1;

// Integer (beyond TINY_INT range)
pub const INT_8: u8 = 0xC8;
pub const INT_16: u8 = 0xC9;
pub const INT_32: u8 = 0xCA;
pub const INT_64: u8 = 0xCB;

// TINY_INT: single byte, range -16..=127
// Positive: 0x00..=0x7F (0..127)
// Negative: 0xF0..=0xFF (-16..-1)
pub const TINY_INT_MIN: i64 = -16;
pub const TINY_INT_MAX: i64 = 127;

// String
// TINY_STRING: 0x80..=0x8F (high nibble 0x8, low = byte length 0..15)
pub const STRING_8: u8 = 0xD0;
pub const STRING_16: u8 = 0xD1;
pub const STRING_32: u8 = 0xD2;

// List
// TINY_LIST: 0x90..=0x9F (high nibble 0x9, low = item count 0..15)
pub const LIST_8: u8 = 0xD4;
pub const LIST_16: u8 = 0xD5;
pub const LIST_32: u8 = 0xD6;

// Dictionary (Map)
// TINY_DICT: 0xA0..=0xAF (high nibble 0xA, low = entry count 0..15)
pub const DICT_8: u8 = 0xD8;
pub const DICT_16: u8 = 0xD9;
pub const DICT_32: u8 = 0xDA;

// Structure
// TINY_STRUCT: 0xB0..=0xBF (high nibble 0xB, low = field count 0..15)
// No 32-bit structure tier exists.
pub const STRUCT_8: u8 = 0xDC;
pub const STRUCT_16: u8 = 0xDD;

// High-nibble masks for tiny types.
pub const TINY_STRING_NIBBLE: u8 = 0x80;
pub const TINY_LIST_NIBBLE: u8 = 0x90;
pub const TINY_DICT_NIBBLE: u8 = 0xA0;
pub const TINY_STRUCT_NIBBLE: u8 = 0xB0;

/// Largest size that fits in a tiny marker's low nibble.
pub const TINY_SIZE_MAX: usize = 15;

/// Size class of a string, list, dict or structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    /// Size folded into the marker's low nibble.
    Tiny(u8),
    Size8,
    Size16,
    Size32,
}

impl SizeTier {
    /// Picks the smallest tier that holds `len`, or `None` past the 32-bit
    /// ceiling.
    pub fn for_len(len: usize) -> Option<Self> {
        if len <= TINY_SIZE_MAX {
            Some(Self::Tiny(len as u8))
        } else if len <= usize::from(u8::MAX) {
            Some(Self::Size8)
        } else if len <= usize::from(u16::MAX) {
            Some(Self::Size16)
        } else if u32::try_from(len).is_ok() {
            Some(Self::Size32)
        } else {
            None
        }
    }

    /// Width in bytes of the length field that follows the marker.
    pub fn prefix_width(self) -> usize {
        match self {
            Self::Tiny(_) => 0,
            Self::Size8 => 1,
            Self::Size16 => 2,
            Self::Size32 => 4,
        }
    }
}

/// Marker bytes for one length-prefixed category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizedMarkers {
    /// Category name used in error messages.
    pub kind: &'static str,
    pub tiny: u8,
    pub size_8: u8,
    pub size_16: u8,
    pub size_32: Option<u8>,
}

impl SizedMarkers {
    /// Marker byte for `tier`, or `None` if this category lacks that tier.
    pub fn marker(&self, tier: SizeTier) -> Option<u8> {
        match tier {
            SizeTier::Tiny(n) => Some(self.tiny | (n & 0x0F)),
            SizeTier::Size8 => Some(self.size_8),
            SizeTier::Size16 => Some(self.size_16),
            SizeTier::Size32 => self.size_32,
        }
    }

    /// Largest size this category can represent.
    pub fn max_len(&self) -> usize {
        match self.size_32 {
            Some(_) => u32::MAX as usize,
            None => usize::from(u16::MAX),
        }
    }

    fn tier_of(&self, byte: u8) -> Option<SizeTier> {
        if byte & 0xF0 == self.tiny {
            Some(SizeTier::Tiny(byte & 0x0F))
        } else if byte == self.size_8 {
            Some(SizeTier::Size8)
        } else if byte == self.size_16 {
            Some(SizeTier::Size16)
        } else if Some(byte) == self.size_32 {
            Some(SizeTier::Size32)
        } else {
            None
        }
    }
}

pub const STRING: SizedMarkers = SizedMarkers {
    kind: "string",
    tiny: TINY_STRING_NIBBLE,
    size_8: STRING_8,
    size_16: STRING_16,
    size_32: Some(STRING_32),
};

pub const LIST: SizedMarkers = SizedMarkers {
    kind: "list",
    tiny: TINY_LIST_NIBBLE,
    size_8: LIST_8,
    size_16: LIST_16,
    size_32: Some(LIST_32),
};

pub const DICT: SizedMarkers = SizedMarkers {
    kind: "dict",
    tiny: TINY_DICT_NIBBLE,
    size_8: DICT_8,
    size_16: DICT_16,
    size_32: Some(DICT_32),
};

pub const STRUCT: SizedMarkers = SizedMarkers {
    kind: "structure",
    tiny: TINY_STRUCT_NIBBLE,
    size_8: STRUCT_8,
    size_16: STRUCT_16,
    size_32: None,
};

/// Integer representation, chosen as the narrowest that holds the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntTier {
    Tiny,
    Int8,
    Int16,
    Int32,
    Int64,
}

impl IntTier {
    pub fn for_value(value: i64) -> Self {
        if (TINY_INT_MIN..=TINY_INT_MAX).contains(&value) {
            Self::Tiny
        } else if i8::try_from(value).is_ok() {
            Self::Int8
        } else if i16::try_from(value).is_ok() {
            Self::Int16
        } else if i32::try_from(value).is_ok() {
            Self::Int32
        } else {
            Self::Int64
        }
    }

    /// Marker byte, or `None` for tiny ints which are their own marker.
    pub fn marker(self) -> Option<u8> {
        match self {
            Self::Tiny => None,
            Self::Int8 => Some(INT_8),
            Self::Int16 => Some(INT_16),
            Self::Int32 => Some(INT_32),
            Self::Int64 => Some(INT_64),
        }
    }

    /// Number of payload bytes after the marker.
    pub fn payload_width(self) -> usize {
        match self {
            Self::Tiny => 0,
            Self::Int8 => 1,
            Self::Int16 => 2,
            Self::Int32 => 4,
            Self::Int64 => 8,
        }
    }
}

/// What a leading byte announces about the value that follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Null,
    Boolean(bool),
    Float,
    TinyInt(i8),
    Int(IntTier),
    String(SizeTier),
    List(SizeTier),
    Dict(SizeTier),
    Struct(SizeTier),
    /// Not assigned in this table revision.
    Reserved,
}

/// Classifies a leading byte.
pub fn classify(byte: u8) -> Marker {
    match byte {
        0x00..=0x7F | 0xF0..=0xFF => Marker::TinyInt(byte as i8),
        NULL => Marker::Null,
        FALSE => Marker::Boolean(false),
        TRUE => Marker::Boolean(true),
        FLOAT_64 => Marker::Float,
        INT_8 => Marker::Int(IntTier::Int8),
        INT_16 => Marker::Int(IntTier::Int16),
        INT_32 => Marker::Int(IntTier::Int32),
        INT_64 => Marker::Int(IntTier::Int64),
        _ => {
            if let Some(tier) = STRING.tier_of(byte) {
                Marker::String(tier)
            } else if let Some(tier) = LIST.tier_of(byte) {
                Marker::List(tier)
            } else if let Some(tier) = DICT.tier_of(byte) {
                Marker::Dict(tier)
            } else if let Some(tier) = STRUCT.tier_of(byte) {
                Marker::Struct(tier)
            } else {
                Marker::Reserved
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SizedMarkers; 4] = [STRING, LIST, DICT, STRUCT];

    #[test]
    fn wire_values_are_fixed() {
        assert_eq!(PACKSTREAM_VERSION, 1);
        assert_eq!(
            [NULL, TRUE, FALSE, INT_8, INT_16, INT_32, INT_64, FLOAT_64],
            [0xC0, 0xC3, 0xC2, 0xC8, 0xC9, 0xCA, 0xCB, 0xC1]
        );
        assert_eq!([STRING_8, STRING_16, STRING_32], [0xD0, 0xD1, 0xD2]);
        assert_eq!([LIST_8, LIST_16, LIST_32], [0xD4, 0xD5, 0xD6]);
        assert_eq!([DICT_8, DICT_16, DICT_32], [0xD8, 0xD9, 0xDA]);
        assert_eq!([STRUCT_8, STRUCT_16], [0xDC, 0xDD]);
    }

    #[test]
    fn every_byte_classifies_consistently() {
        let mut reserved = Vec::new();
        for byte in 0..=u8::MAX {
            match classify(byte) {
                Marker::TinyInt(v) => {
                    assert!((TINY_INT_MIN..=TINY_INT_MAX).contains(&i64::from(v)));
                    assert_eq!(v as u8, byte);
                }
                Marker::Int(tier) => assert_eq!(tier.marker(), Some(byte)),
                Marker::String(tier) => assert_eq!(STRING.marker(tier), Some(byte)),
                Marker::List(tier) => assert_eq!(LIST.marker(tier), Some(byte)),
                Marker::Dict(tier) => assert_eq!(DICT.marker(tier), Some(byte)),
                Marker::Struct(tier) => assert_eq!(STRUCT.marker(tier), Some(byte)),
                Marker::Null => assert_eq!(byte, NULL),
                Marker::Boolean(b) => assert_eq!(byte, if b { TRUE } else { FALSE }),
                Marker::Float => assert_eq!(byte, FLOAT_64),
                Marker::Reserved => reserved.push(byte),
            }
        }

        let mut expected: Vec<u8> = (0xC4..=0xC7).chain(0xCC..=0xCF).collect();
        expected.extend([0xD3, 0xD7, 0xDB, 0xDE, 0xDF]);
        expected.extend(0xE0..=0xEF);
        assert_eq!(reserved, expected);
    }

    #[test]
    fn sized_markers_round_trip_through_classify() {
        for markers in ALL {
            for tier in [SizeTier::Tiny(0), SizeTier::Tiny(15), SizeTier::Size8, SizeTier::Size16] {
                let byte = markers.marker(tier).unwrap();
                let back = match classify(byte) {
                    Marker::String(t) | Marker::List(t) | Marker::Dict(t) | Marker::Struct(t) => t,
                    other => panic!("0x{byte:02X} classified as {other:?}"),
                };
                assert_eq!(back, tier, "{} 0x{byte:02X}", markers.kind);
            }
        }
        assert_eq!(STRUCT.marker(SizeTier::Size32), None);
    }

    #[test]
    fn size_tier_boundaries() {
        assert_eq!(SizeTier::for_len(0), Some(SizeTier::Tiny(0)));
        assert_eq!(SizeTier::for_len(15), Some(SizeTier::Tiny(15)));
        assert_eq!(SizeTier::for_len(16), Some(SizeTier::Size8));
        assert_eq!(SizeTier::for_len(255), Some(SizeTier::Size8));
        assert_eq!(SizeTier::for_len(256), Some(SizeTier::Size16));
        assert_eq!(SizeTier::for_len(65_535), Some(SizeTier::Size16));
        assert_eq!(SizeTier::for_len(65_536), Some(SizeTier::Size32));
        assert_eq!(SizeTier::for_len(u32::MAX as usize), Some(SizeTier::Size32));
        #[cfg(target_pointer_width = "64")]
        assert_eq!(SizeTier::for_len(u32::MAX as usize + 1), None);
    }

    #[test]
    fn struct_max_len_is_16_bit() {
        assert_eq!(STRUCT.max_len(), 65_535);
        assert_eq!(STRING.max_len(), u32::MAX as usize);
    }

    #[test]
    fn int_tier_boundaries() {
        let cases = [
            (i64::MIN, IntTier::Int64),
            (-2_147_483_649, IntTier::Int64),
            (-2_147_483_648, IntTier::Int32),
            (-32_769, IntTier::Int32),
            (-32_768, IntTier::Int16),
            (-129, IntTier::Int16),
            (-128, IntTier::Int8),
            (-17, IntTier::Int8),
            (-16, IntTier::Tiny),
            (127, IntTier::Tiny),
            (128, IntTier::Int16),
            (32_767, IntTier::Int16),
            (32_768, IntTier::Int32),
            (2_147_483_647, IntTier::Int32),
            (2_147_483_648, IntTier::Int64),
            (i64::MAX, IntTier::Int64),
        ];
        for (value, tier) in cases {
            assert_eq!(IntTier::for_value(value), tier, "{value}");
        }
    }
}
