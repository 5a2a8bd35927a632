use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;
use crate::gc::SharedCollector;
use crate::tree::ValueTree;
use crate::value::Code;
use pretty_assertions::assert_eq;

fn bare() -> Interpreter {
    Interpreter::builder()
        .collector(SharedCollector::new())
        .default_config(false)
        .default_instructions(false)
        .build()
}

fn ints(interp: &Interpreter) -> Vec<ValueTree> {
    interp.image().stack(StackKind::Integer).to_vec()
}

/// Register an integer adder under `name`.
fn register_plus(machine: &mut Machine, name: &str) {
    machine.register_instruction(name, |m: &mut Machine| {
        let stack = m.stack(StackKind::Integer);
        if stack.len() < 2 {
            return;
        }
        if let (Some(b), Some(a)) = (m.pop_int(), m.pop_int()) {
            m.push_int(a + b);
        }
    });
}

#[test]
fn test_concrete_scenario() {
    let interp = Interpreter::builder().collector(SharedCollector::new()).build();
    interp.with(|m| {
        register_plus(m, "+");
        let two = m.alloc(Value::Int(2));
        let three = m.alloc(Value::Int(3));
        let plus = m.instruction_value("+").unwrap();
        m.push_value(StackKind::Exec, Value::Code(Code::new(vec![two, three, plus])));
    });

    interp.run(0);
    assert_eq!(ints(&interp), vec![ValueTree::Int(5)]);
    assert!(interp.done());
}

#[test]
fn test_literals_go_to_their_stacks() {
    let interp = bare();
    interp.with(|m| {
        let x = m.intern("x");
        m.push_value(StackKind::Exec, Value::Name(x));
        m.push_value(StackKind::Exec, Value::Real(1.5));
        m.push_value(StackKind::Exec, Value::Int(7));
        m.push_value(StackKind::Exec, Value::Bool(true));
    });
    assert_eq!(interp.run(0), 4);

    let image = interp.image();
    assert_eq!(image.stack(StackKind::Boolean), &[ValueTree::Bool(true)]);
    assert_eq!(image.stack(StackKind::Integer), &[ValueTree::Int(7)]);
    assert_eq!(image.stack(StackKind::Real), &[ValueTree::Real(1.5)]);
    assert_eq!(image.stack(StackKind::Name), &[ValueTree::name("x")]);
}

#[test]
fn test_code_expands_in_order() {
    let interp = bare();
    interp
        .push_tree(
            StackKind::Exec,
            &ValueTree::Code(vec![
                ValueTree::Int(1),
                ValueTree::Code(vec![ValueTree::Int(2), ValueTree::Int(3)]),
                ValueTree::Int(4),
            ]),
        )
        .unwrap();

    assert_eq!(interp.step(), StepOutcome::Executed);
    assert_eq!(interp.with(|m| m.stack(StackKind::Exec).len()), 3);

    interp.run(0);
    assert_eq!(
        ints(&interp),
        vec![
            ValueTree::Int(1),
            ValueTree::Int(2),
            ValueTree::Int(3),
            ValueTree::Int(4)
        ]
    );
}

#[test]
fn test_bound_name_executes_its_value() {
    let interp = bare();
    interp.with(|m| {
        let n = m.intern("n");
        let one = m.alloc(Value::Int(1));
        let two = m.alloc(Value::Int(2));
        let body = m.alloc(Value::Code(Code::new(vec![one, two])));
        m.define(n, body).unwrap();
        m.push_value(StackKind::Exec, Value::Name(n));
    });

    assert_eq!(interp.run(0), 4);
    assert_eq!(ints(&interp), vec![ValueTree::Int(1), ValueTree::Int(2)]);
    assert!(interp.image().stack(StackKind::Name).is_empty());
}

#[test]
fn test_empty_exec_is_idle() {
    let interp = bare();
    assert_eq!(interp.step(), StepOutcome::Idle);
    assert_eq!(interp.run(0), 0);
    assert_eq!(interp.run(10), 0);
}

#[test]
fn test_run_respects_step_budget() {
    let interp = bare();
    interp
        .push_tree(
            StackKind::Exec,
            &ValueTree::Code((0..10).map(ValueTree::Int).collect()),
        )
        .unwrap();

    assert_eq!(interp.run(3), 3);
    assert_eq!(ints(&interp), vec![ValueTree::Int(0), ValueTree::Int(1)]);
    assert_eq!(interp.run(-1), 8);
    assert_eq!(ints(&interp).len(), 10);
}

#[test]
fn test_interrupt_from_native_op_stops_next_boundary() {
    let seen = Arc::new(AtomicUsize::new(0));
    let handler_seen = Arc::clone(&seen);
    let interp = Interpreter::builder()
        .collector(SharedCollector::new())
        .default_instructions(false)
        .interrupt_handler(move |_, flag| {
            handler_seen.store(usize::try_from(flag).unwrap_or(0), Ordering::SeqCst);
        })
        .build();

    interp.with(|m| {
        m.register_instruction("STOP", |m: &mut Machine| m.interrupt(7));
    });
    interp
        .push_tree(
            StackKind::Exec,
            &ValueTree::Code(vec![
                ValueTree::Int(1),
                ValueTree::instruction("STOP"),
                ValueTree::Int(2),
                ValueTree::Int(3),
            ]),
        )
        .unwrap();

    // Expand, 1, STOP.
    assert_eq!(interp.run(0), 3);
    assert_eq!(seen.load(Ordering::SeqCst), 7);
    assert_eq!(ints(&interp), vec![ValueTree::Int(1)]);
    assert_eq!(
        interp.image().stack(StackKind::Exec),
        &[ValueTree::Int(3), ValueTree::Int(2)]
    );

    // The next run clears the flag and continues.
    assert_eq!(interp.run(0), 2);
    assert_eq!(
        ints(&interp),
        vec![ValueTree::Int(1), ValueTree::Int(2), ValueTree::Int(3)]
    );
}

#[test]
fn test_negative_interrupt_skips_handler() {
    let called = Arc::new(AtomicUsize::new(0));
    let handler_called = Arc::clone(&called);
    let interp = Interpreter::builder()
        .collector(SharedCollector::new())
        .interrupt_handler(move |_, _| {
            handler_called.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    interp.with(|m| {
        m.push_int(1);
        m.push_value(StackKind::Exec, Value::Int(5));
        m.interrupt(-1);
        assert_eq!(
            m.step(),
            StepOutcome::Interrupted {
                flag: -1,
                executed: true
            }
        );
    });
    assert_eq!(called.load(Ordering::SeqCst), 0);
}

#[test]
fn test_interrupt_before_run_is_cleared() {
    let interp = bare();
    interp.with(|m| {
        m.push_value(StackKind::Exec, Value::Int(1));
    });
    interp.interrupt(3);
    assert_eq!(interp.run(0), 1);
    assert_eq!(interp.interrupt_handle().get(), 0);
}

#[test]
fn test_step_hook_can_halt() {
    let calls = Arc::new(AtomicUsize::new(0));
    let hook_calls = Arc::clone(&calls);
    let interp = Interpreter::builder()
        .collector(SharedCollector::new())
        .step_hook(move |m| {
            hook_calls.fetch_add(1, Ordering::SeqCst);
            if m.stack(StackKind::Integer).len() >= 2 {
                StepControl::Stop
            } else {
                StepControl::Continue
            }
        })
        .build();
    interp
        .push_tree(
            StackKind::Exec,
            &ValueTree::Code(vec![ValueTree::Int(1), ValueTree::Int(2), ValueTree::Int(3)]),
        )
        .unwrap();

    assert_eq!(interp.run(0), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(ints(&interp), vec![ValueTree::Int(1), ValueTree::Int(2)]);
    assert_eq!(interp.image().stack(StackKind::Exec), &[ValueTree::Int(3)]);
}

#[test]
fn test_hook_runs_on_idle_step() {
    let calls = Arc::new(AtomicUsize::new(0));
    let hook_calls = Arc::clone(&calls);
    let interp = Interpreter::builder()
        .collector(SharedCollector::new())
        .step_hook(move |_| {
            hook_calls.fetch_add(1, Ordering::SeqCst);
            StepControl::Continue
        })
        .build();
    assert_eq!(interp.step(), StepOutcome::Idle);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_stale_exec_entry_is_skipped() {
    let interp = bare();
    let collector = interp.collector().clone();
    interp.with(|m| {
        m.push_value(StackKind::Exec, Value::Int(1));
        let stale = m.push_value(StackKind::Exec, Value::Int(2));
        collector.untrack(stale);
    });

    assert_eq!(interp.run(0), 2);
    assert_eq!(ints(&interp), vec![ValueTree::Int(1)]);
}

#[test]
fn test_run_collects_garbage_past_threshold() {
    let collector = SharedCollector::with_threshold(8);
    let interp = Interpreter::builder()
        .collector(collector.clone())
        .default_config(false)
        .build();
    interp
        .push_tree(
            StackKind::Exec,
            &ValueTree::Code(
                (0..20)
                    .flat_map(|_| {
                        [
                            ValueTree::instruction("INTEGER.STACKDEPTH"),
                            ValueTree::instruction("INTEGER.POP"),
                        ]
                    })
                    .collect(),
            ),
        )
        .unwrap();

    interp.run(0);
    assert!(ints(&interp).is_empty());
    // 41 values from the program plus 20 pushed depths; without in-run
    // collection all 61 would still be live.
    assert!(collector.live_count() < 41);
}

#[test]
fn test_outcome_helpers() {
    assert!(StepOutcome::Executed.should_continue());
    assert!(!StepOutcome::Idle.should_continue());
    assert!(StepOutcome::Halted { executed: true }.executed());
    assert!(!StepOutcome::Interrupted {
        flag: 1,
        executed: false
    }
    .executed());
}

proptest::proptest! {
    #[test]
    fn prop_code_runs_children_in_order(values in proptest::collection::vec(proptest::num::i64::ANY, 0..32)) {
        let interp = bare();
        interp
            .push_tree(
                StackKind::Exec,
                &ValueTree::Code(values.iter().copied().map(ValueTree::Int).collect()),
            )
            .unwrap();
        interp.run(0);
        let expected: Vec<_> = values.into_iter().map(ValueTree::Int).collect();
        proptest::prop_assert_eq!(ints(&interp), expected);
    }
}
