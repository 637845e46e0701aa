use crate::engine::native::NullBitmap;

#[test]
fn first_column_is_most_significant_bit() {
    let mut bitmap = NullBitmap::new(10);
    assert_eq!(bitmap.as_bytes(), &[0, 0]);

    bitmap.set(0);
    bitmap.set(7);
    bitmap.set(9);
    assert_eq!(bitmap.as_bytes(), &[0b1000_0001, 0b0100_0000]);
    assert!(bitmap.is_set(9));
    assert!(!bitmap.is_set(8));
    assert!(!bitmap.is_set(42));
}

#[test]
fn byte_len_rounds_up() {
    assert_eq!(NullBitmap::byte_len(0), 0);
    assert_eq!(NullBitmap::byte_len(1), 1);
    assert_eq!(NullBitmap::byte_len(8), 1);
    assert_eq!(NullBitmap::byte_len(9), 2);
}

#[test]
fn clear_resets_all_bits() {
    let mut bitmap = NullBitmap::new(3);
    bitmap.set(2);
    bitmap.clear();
    assert_eq!(bitmap.as_bytes(), &[0]);
    assert_eq!(bitmap.len(), 3);
}

#[test]
fn from_bytes_restores_flags() {
    let bitmap = NullBitmap::from_bytes(&[0b0010_0000], 3);
    assert!(bitmap.is_set(2));
    assert!(!bitmap.is_set(0));
}
