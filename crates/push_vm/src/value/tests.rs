use super::*;
use pretty_assertions::assert_eq;

fn r(index: u32) -> ValueRef {
    ValueRef::new(index, 0)
}

#[test]
fn test_code_iter_front_to_back() {
    let code = Code::new(vec![r(1), r(2), r(3)]);
    assert_eq!(code.iter().collect::<Vec<_>>(), vec![r(1), r(2), r(3)]);
    // Traversal is repeatable.
    assert_eq!(code.iter().count(), 3);
    assert_eq!(code.iter().rev().collect::<Vec<_>>(), vec![r(3), r(2), r(1)]);
}

#[test]
fn test_code_prepend_is_persistent() {
    let tail = Code::new(vec![r(2), r(3)]);
    let full = tail.prepend(r(1));

    assert_eq!(full.iter().collect::<Vec<_>>(), vec![r(1), r(2), r(3)]);
    assert_eq!(tail.len(), 2);
    assert_eq!(full.first(), Some(r(1)));
    assert_eq!(full.rest(), tail);
}

#[test]
fn test_code_rest_of_empty() {
    assert!(Code::empty().rest().is_empty());
    assert_eq!(Code::empty().first(), None);
}

#[test]
fn test_value_kind() {
    assert_eq!(Value::Bool(true).kind(), ValueKind::Bool);
    assert_eq!(Value::Int(1).kind(), ValueKind::Int);
    assert_eq!(Value::Real(1.5).kind(), ValueKind::Real);
    assert_eq!(Value::Name(Name::EMPTY).kind(), ValueKind::Name);
    assert_eq!(Value::Code(Code::empty()).kind(), ValueKind::Code);
}

#[test]
fn test_value_accessors() {
    assert_eq!(Value::Int(7).as_int(), Some(7));
    assert_eq!(Value::Int(7).as_real(), None);
    assert_eq!(Value::Real(0.5).as_real(), Some(0.5));
    assert_eq!(Value::Bool(false).as_bool(), Some(false));
    assert!(Value::Code(Code::empty()).as_code().is_some());
}

#[test]
fn test_value_ref_debug() {
    assert_eq!(format!("{:?}", ValueRef::new(4, 2)), "ValueRef(4v2)");
}
