use std::io::Cursor;
use twophase::{
    Tables,
    cache::{self, CacheError},
};

#[test_log::test]
fn test_cache_round_trip() {
    let tables = Tables::get();
    let mut bytes = Vec::new();
    cache::save(tables, &mut bytes).unwrap();
    assert!(bytes.starts_with(b"TWOPHS02"));

    let loaded = cache::load(Cursor::new(&bytes)).unwrap();
    assert_eq!(&loaded, tables);
}

#[test_log::test]
fn test_cache_rejects_corruption() {
    let mut bytes = Vec::new();
    cache::save(Tables::get(), &mut bytes).unwrap();

    let mut foreign = bytes.clone();
    foreign[0] ^= 0xff;
    assert!(matches!(
        cache::load(Cursor::new(&foreign)),
        Err(CacheError::BadMagic)
    ));

    // A single flipped bit anywhere in the tables is caught
    let mut flipped = bytes.clone();
    let middle = flipped.len() / 2;
    flipped[middle] ^= 1;
    assert!(matches!(
        cache::load(Cursor::new(&flipped)),
        Err(CacheError::Corrupted)
    ));

    let mut flipped = bytes.clone();
    flipped[20] ^= 0x80;
    assert!(matches!(
        cache::load(Cursor::new(&flipped)),
        Err(CacheError::Corrupted)
    ));

    bytes.truncate(bytes.len() - 1);
    assert!(matches!(
        cache::load(Cursor::new(&bytes)),
        Err(CacheError::Corrupted)
    ));
}
