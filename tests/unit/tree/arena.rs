use super::*;
use crate::shape::bezier::Bezier;

fn shape() -> ItemKind {
    ItemKind::Shape(Box::new(Bezier::new()))
}

fn sample_tree() -> (ItemTree, ItemId, ItemId, ItemId, ItemId) {
    let mut t = ItemTree::new();
    let base = t.insert(None, "Layer1".into(), ItemKind::layer()).unwrap();
    let inner = t.insert(Some(base), "Layer2".into(), ItemKind::layer()).unwrap();
    let a = t.insert(Some(inner), "Bezier1".into(), shape()).unwrap();
    let b = t.insert(Some(base), "Bezier2".into(), shape()).unwrap();
    (t, base, inner, a, b)
}

#[test]
fn insert_links_parent_and_children() {
    let (t, base, inner, a, b) = sample_tree();
    assert_eq!(t.len(), 4);
    assert_eq!(t.roots(), [base]);
    assert_eq!(t.item(base).unwrap().children(), [inner, b]);
    assert_eq!(t.item(a).unwrap().parent(), Some(inner));
    assert!(t.item(a).unwrap().as_shape().is_some());
    assert!(t.item(a).unwrap().is_globally_activated());
    assert!(!t.item(a).unwrap().is_locked());
}

#[test]
fn shapes_cannot_hold_children() {
    let (mut t, _, _, a, _) = sample_tree();
    let err = t.insert(Some(a), "x".into(), shape()).unwrap_err();
    assert!(matches!(err, RotoError::Contract(_)));
    assert_eq!(t.len(), 4);
}

#[test]
fn iteration_is_preorder_bottom_first() {
    let (t, base, inner, a, b) = sample_tree();
    let ids: Vec<_> = t.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, [base, inner, a, b]);
    assert_eq!(t.find_by_name("Bezier2"), Some(b));
    assert_eq!(t.find_by_name("nope"), None);
}

#[test]
fn remove_is_recursive_and_ids_are_not_reused() {
    let (mut t, base, inner, a, b) = sample_tree();
    let removed = t.remove(inner).unwrap();
    assert_eq!(removed, [inner, a]);
    assert!(t.get(a).is_none());
    assert_eq!(t.item(base).unwrap().children(), [b]);

    let c = t.insert(Some(base), "Bezier3".into(), shape()).unwrap();
    assert_ne!(c, inner);
    assert_ne!(c, a);
    assert!(t.remove(a).is_err());
}

#[test]
fn reparent_moves_and_rejects_cycles() {
    let (mut t, base, inner, a, b) = sample_tree();
    t.reparent(b, Some(inner), 0).unwrap();
    assert_eq!(t.item(inner).unwrap().children(), [b, a]);
    assert_eq!(t.item(b).unwrap().parent(), Some(inner));
    assert!(t.is_ancestor(base, b));

    let err = t.reparent(base, Some(inner), 0).unwrap_err();
    assert!(matches!(err, RotoError::InvalidOperation(_)));
    assert!(t.reparent(inner, Some(a), 0).is_err());

    t.reparent(inner, None, 99).unwrap();
    assert_eq!(t.roots(), [base, inner]);
    assert!(t.item(base).unwrap().children().is_empty());
}
