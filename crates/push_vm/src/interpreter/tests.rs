use super::*;
use crate::tree::{MachineImage, ValueTree};
use pretty_assertions::assert_eq;

fn bare() -> Interpreter {
    Interpreter::builder()
        .collector(SharedCollector::new())
        .default_config(false)
        .default_instructions(false)
        .build()
}

#[test]
fn test_new_interpreter_is_empty_and_configured() {
    let interp = Interpreter::builder().collector(SharedCollector::new()).build();
    assert!(interp.done());
    interp.with(|m| {
        for kind in StackKind::ALL {
            assert!(m.stack(kind).is_empty());
        }
        assert!(m.bindings().is_empty());
        assert_eq!(m.config_int(keys::MIN_RANDOM_INT), Some(-100));
        assert_eq!(m.config_int(keys::MAX_RANDOM_INT), Some(100));
        assert_eq!(m.config_real(keys::MAX_RANDOM_REAL), Some(1.0));
        assert_eq!(m.config_real(keys::NEW_ERC_NAME_PROBABILITY), Some(0.01));
        assert_eq!(m.config().len(), 8);
        assert!(m.has_instruction("INTEGER.+"));
    });
}

#[test]
fn test_bare_interpreter_has_no_tables() {
    let interp = bare();
    interp.with(|m| {
        assert!(m.config().is_empty());
        assert!(m.instructions().is_empty());
    });
}

#[test]
fn test_config_set_and_get() {
    let interp = bare();
    interp.with(|m| {
        let r = m.alloc(Value::Int(7));
        m.config_set("LIMIT", r);
        assert_eq!(m.config_get("LIMIT"), Some(r));

        let key = m.intern("LIMIT");
        assert_eq!(m.config_get_interned(key), Some(r));
        assert_eq!(m.config_int("LIMIT"), Some(7));
        assert_eq!(m.config_real("LIMIT"), Some(7.0));

        assert_eq!(m.config_get("MISSING"), None);
        assert!(m.names().get("MISSING").is_none());

        assert_eq!(m.config_remove("LIMIT"), Some(r));
        assert_eq!(m.config_get("LIMIT"), None);
    });
}

#[test]
fn test_define_and_lookup() {
    let interp = bare();
    interp.with(|m| {
        let x = m.intern("x");
        let five = m.alloc(Value::Int(5));
        m.define(x, five).unwrap();
        assert_eq!(m.lookup(x), Some(five));

        let six = m.alloc(Value::Int(6));
        m.define(x, six).unwrap();
        assert_eq!(m.lookup(x), Some(six));

        m.undefine(x);
        assert_eq!(m.lookup(x), None);
    });
}

#[test]
fn test_define_rejects_direct_self_reference() {
    let interp = bare();
    interp.with(|m| {
        let x = m.intern("x");
        let self_ref = m.alloc(Value::Name(x));
        let err = m.define(x, self_ref).unwrap_err();
        assert_eq!(
            err,
            VmError::SelfReferentialBinding {
                name: "x".to_owned()
            }
        );
        assert_eq!(m.lookup(x), None);
    });
}

#[test]
fn test_define_rejects_indirect_cycle() {
    let interp = bare();
    interp.with(|m| {
        let a = m.intern("a");
        let b = m.intern("b");
        let to_b = m.alloc(Value::Name(b));
        let to_a = m.alloc(Value::Name(a));

        m.define(a, to_b).unwrap();
        assert!(matches!(
            m.define(b, to_a),
            Err(VmError::SelfReferentialBinding { .. })
        ));
        assert_eq!(m.lookup(b), None);
    });
}

#[test]
fn test_define_allows_code_mentioning_its_name() {
    let interp = bare();
    interp.with(|m| {
        let f = m.intern("f");
        let mention = m.alloc(Value::Name(f));
        let body = m.alloc(Value::Code(Code::new(vec![mention])));
        assert!(m.define(f, body).is_ok());
    });
}

#[test]
fn test_define_rejects_stale_value() {
    let interp = bare();
    let collector = interp.collector().clone();
    interp.with(|m| {
        let x = m.intern("x");
        let r = m.alloc(Value::Int(1));
        collector.untrack(r);
        assert_eq!(m.define(x, r), Err(VmError::StaleValue(r)));
    });
}

#[test]
fn test_define_rejects_foreign_name() {
    let interp = bare();
    interp.with(|m| {
        let r = m.alloc(Value::Int(1));
        let foreign = Name::from_raw(9_999);
        assert!(matches!(
            m.define(foreign, r),
            Err(VmError::InvalidArgument { .. })
        ));
        assert!(m.bindings().is_empty());
    });
}

#[test]
fn test_reset_flushes_stacks_and_bindings_but_keeps_config() {
    let interp = Interpreter::builder().collector(SharedCollector::new()).build();
    interp.with(|m| {
        m.push_int(1);
        m.push_bool(true);
        let x = m.intern("x");
        let v = m.alloc(Value::Int(2));
        m.define(x, v).unwrap();

        m.reset();
        assert!(m.stacks().iter_all().next().is_none());
        assert!(m.bindings().is_empty());
        assert_eq!(m.config().len(), 8);
    });
}

#[test]
fn test_typed_pop_leaves_mismatched_top() {
    let interp = bare();
    interp.with(|m| {
        assert_eq!(m.pop_int(), None);

        // A native op may push anything anywhere.
        m.push_value(StackKind::Integer, Value::Bool(true));
        assert_eq!(m.pop_int(), None);
        assert_eq!(m.stack(StackKind::Integer).len(), 1);

        m.push_int(3);
        assert_eq!(m.pop_int(), Some(3));
        m.push_real(1.5);
        assert_eq!(m.pop_real(), Some(1.5));
    });
}

#[test]
fn test_userdata_roundtrip() {
    #[derive(Debug, PartialEq)]
    struct Counter(u32);

    let interp = Interpreter::builder()
        .collector(SharedCollector::new())
        .userdata(Counter(1))
        .build();
    interp.with(|m| {
        assert_eq!(m.userdata::<Counter>(), Some(&Counter(1)));
        assert_eq!(m.userdata::<String>(), None);
        if let Some(counter) = m.userdata_mut::<Counter>() {
            counter.0 += 1;
        }
        assert_eq!(m.userdata::<Counter>(), Some(&Counter(2)));
    });
}

#[test]
fn test_image_reflects_state() {
    let interp = Interpreter::builder().collector(SharedCollector::new()).build();
    interp
        .push_tree(
            StackKind::Exec,
            &ValueTree::Code(vec![ValueTree::Int(1), ValueTree::instruction("INTEGER.+")]),
        )
        .unwrap();
    interp.with(|m| {
        let quoted = m.intern("INTEGER.+");
        m.push_name(quoted);
        let x = m.intern("x");
        let v = m.alloc(Value::Real(0.5));
        m.define(x, v).unwrap();
    });

    let image = interp.image();
    assert_eq!(
        image.stack(StackKind::Exec),
        &[ValueTree::Code(vec![
            ValueTree::Int(1),
            ValueTree::instruction("INTEGER.+")
        ])]
    );
    assert_eq!(image.stack(StackKind::Name), &[ValueTree::name("INTEGER.+")]);
    assert_eq!(image.bindings.get("x"), Some(&ValueTree::Real(0.5)));
    assert_eq!(image.config.len(), 8);
}

#[test]
fn test_restore_replaces_state() {
    let interp = Interpreter::builder().collector(SharedCollector::new()).build();
    interp.with(|m| m.push_int(99));

    let image = MachineImage::new()
        .with_stack(StackKind::Integer, vec![ValueTree::Int(1), ValueTree::Int(2)])
        .with_stack(StackKind::Exec, vec![ValueTree::instruction("INTEGER.+")])
        .with_binding("y", ValueTree::Bool(false))
        .with_config("MAX-RANDOM-INT", ValueTree::Int(5));
    interp.restore(&image).unwrap();

    assert_eq!(interp.image(), image);
    interp.run(0);
    assert_eq!(interp.image().stack(StackKind::Integer), &[ValueTree::Int(3)]);
}

#[test]
fn test_restore_is_all_or_nothing() {
    let interp = bare();
    interp.with(|m| m.push_int(42));
    let before = interp.image();

    let unknown = MachineImage::new()
        .with_stack(StackKind::Integer, vec![ValueTree::Int(1)])
        .with_stack(StackKind::Exec, vec![ValueTree::instruction("NOPE")]);
    assert_eq!(
        interp.restore(&unknown),
        Err(VmError::UnknownInstruction {
            name: "NOPE".to_owned()
        })
    );
    assert_eq!(interp.image(), before);

    let looping = MachineImage::new()
        .with_stack(StackKind::Integer, vec![ValueTree::Int(1)])
        .with_binding("a", ValueTree::name("b"))
        .with_binding("b", ValueTree::name("a"));
    assert!(matches!(
        interp.restore(&looping),
        Err(VmError::SelfReferentialBinding { .. })
    ));
    assert_eq!(interp.image(), before);
}

#[test]
fn test_image_restore_crosses_interpreters() {
    let source = Interpreter::builder().collector(SharedCollector::new()).build();
    source
        .push_tree(
            StackKind::Code,
            &ValueTree::Code(vec![ValueTree::name("f"), ValueTree::Code(vec![])]),
        )
        .unwrap();

    let target = Interpreter::builder().collector(SharedCollector::new()).build();
    target.restore(&source.image()).unwrap();
    assert_eq!(target.image(), source.image());
}

#[test]
#[allow(deprecated)]
fn test_copy_is_independent() {
    let source = Interpreter::builder().collector(SharedCollector::new()).build();
    source.with(|m| {
        m.push_int(1);
        let sq = m.intern("square");
        let dup = m.instruction_value("INTEGER.DUP").unwrap();
        let mul = m.instruction_value("INTEGER.*").unwrap();
        let body = m.alloc(Value::Code(Code::new(vec![dup, mul])));
        m.define(sq, body).unwrap();
    });

    let copy = source.copy();
    assert!(copy.collector().ptr_eq(source.collector()));
    assert_eq!(copy.image(), source.image());

    copy.with(|m| m.push_int(2));
    assert_eq!(source.image().stack(StackKind::Integer), &[ValueTree::Int(1)]);
    assert_eq!(
        copy.image().stack(StackKind::Integer),
        &[ValueTree::Int(1), ValueTree::Int(2)]
    );

    copy.push_tree(StackKind::Exec, &ValueTree::name("square")).unwrap();
    copy.run(0);
    assert_eq!(
        copy.image().stack(StackKind::Integer),
        &[ValueTree::Int(1), ValueTree::Int(4)]
    );
}

#[test]
fn test_copy_value_to_reinterns_names() {
    let source = bare();
    let target = bare();
    let copied = source.with(|src| {
        src.intern("padding");
        let name = src.intern("hello");
        let leaf = src.alloc(Value::Name(name));
        let code = src.alloc(Value::Code(Code::new(vec![leaf])));
        target.with(|dst| {
            let r = src.copy_value_to(code, dst).unwrap();
            dst.tree(r)
        })
    });
    assert_eq!(
        copied,
        Some(ValueTree::Code(vec![ValueTree::name("hello")]))
    );
}

#[test]
fn test_machine_ids_are_unique() {
    let a = bare();
    let b = bare();
    assert_ne!(a.id(), b.id());
    assert!(a.id() < b.id());
}
