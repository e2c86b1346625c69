use super::*;
use crate::scene::ids::CameraId;

#[test]
fn duplicate_names_get_numeric_suffix() {
    let mut c: Collection<CameraId, u8> = Collection::default();
    let (a, na) = c.insert("take", 1);
    let (b, nb) = c.insert("take", 2);
    let (_, nc) = c.insert("take", 3);
    assert_eq!(na, "take");
    assert_eq!(nb, "take.001");
    assert_eq!(nc, "take.002");
    assert_ne!(a, b);
    assert_eq!(c.id("take.001"), Some(b));
    assert_eq!(*c.get(b), 2);
    assert_eq!(c.name(a), "take");
    assert_eq!(c.len(), 3);
}

#[test]
fn lookup_of_unknown_name_is_none() {
    let c: Collection<CameraId, u8> = Collection::default();
    assert_eq!(c.id("Main"), None);
}
