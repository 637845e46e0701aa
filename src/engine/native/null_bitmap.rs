/// Per-row null bitmap. Bit `i` lives in byte `i / 8` at position
/// `7 - i % 8` (most significant bit first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullBitmap {
    bytes: Vec<u8>,
    bits: usize,
    dirty: bool,
}

impl NullBitmap {
    pub fn new(bits: usize) -> Self {
        Self {
            bytes: vec![0; Self::byte_len(bits)],
            bits,
            dirty: false,
        }
    }

    /// Bytes needed to hold `bits` flags.
    pub fn byte_len(bits: usize) -> usize {
        bits.div_ceil(8)
    }

    pub fn from_bytes(bytes: &[u8], bits: usize) -> Self {
        let mut bitmap = Self::new(bits);
        let n = bitmap.bytes.len().min(bytes.len());
        bitmap.bytes[..n].copy_from_slice(&bytes[..n]);
        bitmap.dirty = bitmap.bytes.iter().any(|b| *b != 0);
        bitmap
    }

    pub fn len(&self) -> usize {
        self.bits
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn set(&mut self, index: usize) {
        debug_assert!(index < self.bits);
        self.bytes[index / 8] |= 0x80 >> (index % 8);
        self.dirty = true;
    }

    pub fn is_set(&self, index: usize) -> bool {
        index < self.bits && self.bytes[index / 8] & (0x80 >> (index % 8)) != 0
    }

    /// Resets all bits. A bitmap that never had a bit set is left untouched.
    pub fn clear(&mut self) {
        if self.dirty {
            self.bytes.iter_mut().for_each(|b| *b = 0);
            self.dirty = false;
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
