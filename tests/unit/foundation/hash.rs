use super::*;

#[test]
fn split_writes_hash_like_one_write() {
    let mut a = StableHasher::new();
    a.write_bytes(b"rotomask");
    let mut b = StableHasher::new();
    b.write_bytes(b"roto");
    b.write_bytes(b"mask");
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn integer_encodings_are_distinguished_by_value() {
    let mut a = StableHasher::new();
    a.write_i32(-1);
    let mut b = StableHasher::new();
    b.write_i32(1);
    assert_ne!(a.finish(), b.finish());
}
