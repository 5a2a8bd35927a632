use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn r(index: u32) -> ValueRef {
    ValueRef::new(index, 0)
}

#[test]
fn test_push_pop_peek() {
    let mut stack = Stack::new();
    assert_eq!(stack.pop(), None);
    assert_eq!(stack.peek(), None);

    stack.push(r(1));
    stack.push(r(2));
    assert_eq!(stack.peek(), Some(r(2)));
    assert_eq!(stack.len(), 2);

    assert_eq!(stack.pop(), Some(r(2)));
    assert_eq!(stack.pop(), Some(r(1)));
    assert_eq!(stack.pop(), None);
}

#[test]
fn test_peek_at_depth() {
    let stack: Stack = [r(1), r(2), r(3)].into_iter().collect();
    assert_eq!(stack.peek_at(0), Some(r(3)));
    assert_eq!(stack.peek_at(2), Some(r(1)));
    assert_eq!(stack.peek_at(3), None);
    assert_eq!(stack.peek_at(usize::MAX), None);
}

#[test]
fn test_flush_keeps_stack_usable() {
    let mut stack: Stack = [r(1), r(2)].into_iter().collect();
    stack.flush();
    assert!(stack.is_empty());
    stack.push(r(3));
    assert_eq!(stack.pop(), Some(r(3)));
}

#[test]
fn test_swap_top() {
    let mut stack: Stack = [r(1), r(2)].into_iter().collect();
    assert!(stack.swap_top());
    assert_eq!(stack.as_slice(), &[r(2), r(1)]);

    let mut single: Stack = [r(1)].into_iter().collect();
    assert!(!single.swap_top());
}

#[test]
fn test_stacks_are_independent() {
    let mut stacks = Stacks::new();
    stacks.get_mut(StackKind::Integer).push(r(1));
    stacks.get_mut(StackKind::Exec).push(r(2));

    assert_eq!(stacks.get(StackKind::Integer).peek(), Some(r(1)));
    assert_eq!(stacks.get(StackKind::Exec).peek(), Some(r(2)));
    assert!(stacks.get(StackKind::Boolean).is_empty());
    assert_eq!(stacks.iter_all().count(), 2);

    stacks.flush_all();
    assert_eq!(stacks.iter_all().count(), 0);
}

#[test]
fn test_stack_kind_names() {
    for kind in StackKind::ALL {
        assert_eq!(StackKind::from_str_opt(kind.as_str()), Some(kind));
    }
    assert_eq!(StackKind::from_str_opt("float"), None);
}

#[test]
fn test_stack_kind_indices_are_distinct() {
    let mut seen = [false; StackKind::COUNT];
    for kind in StackKind::ALL {
        assert!(!seen[kind.index()]);
        seen[kind.index()] = true;
    }
}

#[test]
fn test_literal_routing() {
    assert_eq!(StackKind::for_literal(ValueKind::Bool), Some(StackKind::Boolean));
    assert_eq!(StackKind::for_literal(ValueKind::Int), Some(StackKind::Integer));
    assert_eq!(StackKind::for_literal(ValueKind::Real), Some(StackKind::Real));
    assert_eq!(StackKind::for_literal(ValueKind::Name), Some(StackKind::Name));
    assert_eq!(StackKind::for_literal(ValueKind::Code), None);
    assert_eq!(StackKind::for_literal(ValueKind::Instruction), None);
}

proptest! {
    #[test]
    fn prop_pop_order_is_reverse_of_push(indices in prop::collection::vec(0u32..10_000, 0..64)) {
        for kind in StackKind::ALL {
            let mut stacks = Stacks::new();
            for &i in &indices {
                stacks.get_mut(kind).push(r(i));
            }
            let popped: Vec<ValueRef> =
                std::iter::from_fn(|| stacks.get_mut(kind).pop()).collect();
            let mut expected: Vec<ValueRef> = indices.iter().map(|&i| r(i)).collect();
            expected.reverse();
            prop_assert_eq!(popped, expected);
        }
    }
}
