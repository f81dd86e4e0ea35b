//! The full accessor grid with the raw facility disabled, so every handle
//! in this process takes the reflective strategy.
//!
//! Lives in its own test binary: the facility probe is cached per process,
//! and the unit-test binary probes with the facility available.

use std::sync::Arc;

use fastfield::{
    Class, ClassBuilder, FieldError, FieldHandle, FieldType, MOD_FINAL, MOD_PUBLIC, MOD_STATIC,
    ObjRef, PrimitiveKind, Value, builtins,
};

/// Every test sets this before building its first handle, so the one-time
/// probe sees it no matter which test runs first.
fn disable_raw() {
    // SAFETY: the test harness spawns no other process-global readers of
    // the environment before the first handle is built.
    unsafe { std::env::set_var("FASTFIELD_DISABLE_RAW", "1") };
}

fn sample_class() -> Arc<Class> {
    ClassBuilder::new("Sample")
        .field(
            "private_final_int",
            FieldType::Prim(PrimitiveKind::I32),
            MOD_FINAL,
        )
        .field("public_int", FieldType::Prim(PrimitiveKind::I32), MOD_PUBLIC)
        .field(
            "label",
            FieldType::Ref(builtins::str_class().clone()),
            MOD_PUBLIC,
        )
        .field(
            "sealed_tag",
            FieldType::Ref(builtins::str_class().clone()),
            MOD_FINAL | MOD_PUBLIC,
        )
        .field(
            "private_static_obj",
            FieldType::Ref(builtins::object_class().clone()),
            MOD_STATIC,
        )
        .field(
            "public_static_int",
            FieldType::Prim(PrimitiveKind::I32),
            MOD_STATIC | MOD_PUBLIC,
        )
        .build()
        .unwrap()
}

// ════════════════════════════════════════════════════════════════════════════
// Facility
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_disabled_facility_is_unobtainable() {
    disable_raw();
    assert!(matches!(
        fastfield::acquire_raw().unwrap_err(),
        FieldError::PermissionDenied(_)
    ));
}

// ════════════════════════════════════════════════════════════════════════════
// Instance accessors
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_instance_i32_grid() {
    disable_raw();
    let class = sample_class();
    let obj = class
        .instantiate(&[("private_final_int", Value::I32(1))])
        .unwrap();

    let open = FieldHandle::create(&class, "public_int").unwrap();
    assert_eq!(open.get_i32(&obj).unwrap(), 0);
    open.put_i32(&obj, 7).unwrap();
    assert_eq!(open.get_i32(&obj).unwrap(), 7);
    open.put_boxed(&obj, &Value::I32(8)).unwrap();
    assert_eq!(open.get_boxed(&obj).unwrap(), Value::I32(8));

    let sealed = FieldHandle::create(&class, "private_final_int").unwrap();
    assert_eq!(sealed.get_i32(&obj).unwrap(), 1);
    assert!(matches!(
        sealed.put_i32(&obj, 99).unwrap_err(),
        FieldError::FinalFieldReadOnly(_)
    ));
    sealed.force_put_i32(&obj, 99).unwrap();
    assert_eq!(sealed.get_i32(&obj).unwrap(), 99);
    assert_eq!(sealed.get_boxed(&obj).unwrap(), Value::I32(99));
}

#[test]
fn test_instance_reference_grid() {
    disable_raw();
    let class = sample_class();
    let obj = class.new_instance();

    let label = FieldHandle::create(&class, "label").unwrap();
    assert_eq!(label.get(&obj).unwrap(), Value::Null);
    label.put(&obj, Value::from("tag")).unwrap();
    assert_eq!(label.get(&obj).unwrap(), Value::from("tag"));
    assert_eq!(label.get_boxed(&obj).unwrap(), Value::from("tag"));
    label.put_boxed(&obj, &Value::Null).unwrap();
    assert_eq!(label.get(&obj).unwrap(), Value::Null);

    // A wrongly-classed object is refused before storage is touched.
    let stranger = builtins::object_class().new_instance();
    assert!(matches!(
        label.put(&obj, Value::Obj(stranger)).unwrap_err(),
        FieldError::TypeMismatch { .. }
    ));

    let sealed = FieldHandle::create(&class, "sealed_tag").unwrap();
    assert!(matches!(
        sealed.put(&obj, Value::from("no")).unwrap_err(),
        FieldError::FinalFieldReadOnly(_)
    ));
    sealed.force_put(&obj, Value::from("yes")).unwrap();
    assert_eq!(sealed.get(&obj).unwrap(), Value::from("yes"));
}

// ════════════════════════════════════════════════════════════════════════════
// Static accessors
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_static_grid() {
    disable_raw();
    let class = sample_class();

    let count = FieldHandle::create(&class, "public_static_int").unwrap();
    assert_eq!(count.get_static_i32().unwrap(), 0);
    count.put_static_i32(41).unwrap();
    assert_eq!(count.get_static_i32().unwrap(), 41);
    count.put_static_boxed(&Value::I32(42)).unwrap();
    assert_eq!(count.get_static_boxed().unwrap(), Value::I32(42));

    let holder = FieldHandle::create(&class, "private_static_obj").unwrap();
    assert_eq!(holder.get_static().unwrap(), Value::Null);
    holder.put_static(Value::from("x")).unwrap();
    assert_eq!(holder.get_static().unwrap(), Value::from("x"));
    assert_eq!(holder.get_static_boxed().unwrap(), Value::from("x"));
}

// ════════════════════════════════════════════════════════════════════════════
// Guards
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_guards_hold_without_the_facility() {
    disable_raw();
    let class = sample_class();
    let open = FieldHandle::create(&class, "public_int").unwrap();
    let label = FieldHandle::create(&class, "label").unwrap();

    assert!(matches!(
        open.get_i32(&ObjRef::null()).unwrap_err(),
        FieldError::NullInstance
    ));
    assert!(matches!(
        label.get(&ObjRef::null()).unwrap_err(),
        FieldError::NullInstance
    ));

    let other = ClassBuilder::new("Other")
        .field("public_int", FieldType::Prim(PrimitiveKind::I32), MOD_PUBLIC)
        .build()
        .unwrap();
    assert!(matches!(
        open.get_i32(&other.new_instance()).unwrap_err(),
        FieldError::TypeMismatch { .. }
    ));

    let obj = class.new_instance();
    assert!(matches!(
        label.get_i32(&obj).unwrap_err(),
        FieldError::WrongFieldKind(_)
    ));
    assert!(matches!(
        open.get_static_i32().unwrap_err(),
        FieldError::WrongFieldKind(_)
    ));
}
