//! Sub-byte field extraction.
//!
//! Several advertisement fields share one byte. Each is described by a
//! [`BitField`] (LSB offset + width) and pulled out with a shift and mask.

/// A contiguous run of bits inside one byte, counted from the LSB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    offset: u8,
    width: u8,
}

impl BitField {
    /// Describe `width` bits starting at bit `offset`.
    ///
    /// Panics at compile time (in const contexts) if the field leaves the byte.
    pub const fn new(offset: u8, width: u8) -> Self {
        assert!(width >= 1 && offset + width <= 8, "bit field must fit in one byte");
        Self { offset, width }
    }

    /// A single-bit flag at `bit`.
    pub const fn flag(bit: u8) -> Self {
        Self::new(bit, 1)
    }

    pub const fn offset(self) -> u8 {
        self.offset
    }

    pub const fn width(self) -> u8 {
        self.width
    }

    /// The unshifted mask of this field's width.
    pub const fn mask(self) -> u8 {
        if self.width >= 8 {
            0xFF
        } else {
            (1u8 << self.width) - 1
        }
    }

    /// Extract the field value from `raw`, right-aligned.
    pub const fn extract(self, raw: u8) -> u8 {
        (raw >> self.offset) & self.mask()
    }

    /// Extract a single-bit field as a boolean.
    pub const fn is_set(self, raw: u8) -> bool {
        self.extract(raw) != 0
    }

    /// Write `value` into the field inside `raw`, leaving other bits untouched.
    pub const fn insert(self, raw: u8, value: u8) -> u8 {
        let cleared = raw & !(self.mask() << self.offset);
        cleared | ((value & self.mask()) << self.offset)
    }
}
