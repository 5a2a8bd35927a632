use super::*;

fn r(index: u32) -> ValueRef {
    ValueRef::new(index, 0)
}

#[test]
fn test_insert_replace_lookup() {
    let mut table = SymbolTable::new();
    let x = Name::from_raw(1);

    assert_eq!(table.insert(x, r(10)), None);
    assert_eq!(table.get(x), Some(r(10)));

    assert_eq!(table.insert(x, r(11)), Some(r(10)));
    assert_eq!(table.get(x), Some(r(11)));
    assert_eq!(table.len(), 1);
}

#[test]
fn test_remove_missing_is_noop() {
    let mut table = SymbolTable::new();
    let x = Name::from_raw(1);
    assert_eq!(table.remove(x), None);

    table.insert(x, r(1));
    assert_eq!(table.remove(x), Some(r(1)));
    assert!(!table.contains(x));
    assert!(table.is_empty());
}

#[test]
fn test_values_lists_every_handle() {
    let mut table = SymbolTable::new();
    table.insert(Name::from_raw(1), r(1));
    table.insert(Name::from_raw(2), r(2));

    let mut values: Vec<ValueRef> = table.values().collect();
    values.sort_by_key(|v| v.index());
    assert_eq!(values, vec![r(1), r(2)]);
}
