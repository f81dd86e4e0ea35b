use std::sync::Arc;

use super::descriptor::FieldDescriptor;
use super::{FieldHandle, Strategy, select_strategy};
use crate::capability;
use crate::class::{Class, ClassBuilder, FieldType, MOD_FINAL, MOD_PUBLIC, MOD_STATIC, ObjRef, builtins};
use crate::error::FieldError;
use crate::primitive::PrimitiveKind;
use crate::value::Value;

// ════════════════════════════════════════════════════════════════════════════
// Fixtures
// ════════════════════════════════════════════════════════════════════════════

fn i32_ty() -> FieldType {
    FieldType::Prim(PrimitiveKind::I32)
}

fn f64_ty() -> FieldType {
    FieldType::Prim(PrimitiveKind::F64)
}

fn str_ty() -> FieldType {
    FieldType::Ref(builtins::str_class().clone())
}

fn obj_ty() -> FieldType {
    FieldType::Ref(builtins::object_class().clone())
}

/// One class covering every field shape the handle API distinguishes.
/// Statics live on the class value itself, so each call gets fresh ones.
fn sample_class() -> Arc<Class> {
    ClassBuilder::new("Sample")
        .field("private_final_int", i32_ty(), MOD_FINAL)
        .field("public_int", i32_ty(), MOD_PUBLIC)
        .field("ratio", f64_ty(), MOD_PUBLIC)
        .field("label", str_ty(), MOD_PUBLIC)
        .field("private_static_obj", obj_ty(), MOD_STATIC)
        .field("public_static_int", i32_ty(), MOD_STATIC | MOD_PUBLIC)
        .build()
        .unwrap()
}

fn sample_instance(class: &Arc<Class>) -> ObjRef {
    class
        .instantiate(&[
            ("private_final_int", Value::I32(1)),
            ("public_int", Value::I32(4)),
        ])
        .unwrap()
}

// ════════════════════════════════════════════════════════════════════════════
// Instance primitives
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_instance_i32_roundtrip() {
    let class = sample_class();
    let obj = sample_instance(&class);
    let handle = FieldHandle::create(&class, "public_int").unwrap();

    assert_eq!(handle.get_i32(&obj).unwrap(), 4);
    handle.put_i32(&obj, 7).unwrap();
    assert_eq!(handle.get_i32(&obj).unwrap(), 7);
    assert_eq!(handle.get_boxed(&obj).unwrap(), Value::I32(7));
}

#[test]
fn test_final_field_rejects_put_but_not_force_put() {
    let class = sample_class();
    let obj = sample_instance(&class);
    let handle = FieldHandle::create(&class, "private_final_int").unwrap();

    assert_eq!(handle.get_i32(&obj).unwrap(), 1);
    let err = handle.put_i32(&obj, 2).unwrap_err();
    assert!(matches!(err, FieldError::FinalFieldReadOnly(_)));
    handle.force_put_i32(&obj, 2).unwrap();
    assert_eq!(handle.get_i32(&obj).unwrap(), 2);
}

#[test]
fn test_unspecialized_kind_goes_reflective() {
    // f64 has no raw specialization, so this exercises the checked path.
    let class = sample_class();
    let obj = class.new_instance();
    let handle = FieldHandle::create(&class, "ratio").unwrap();
    assert!(matches!(handle.strategy, Strategy::Reflective));

    assert_eq!(handle.get_boxed(&obj).unwrap(), Value::F64(0.0));
    handle.put_boxed(&obj, &Value::F64(2.5)).unwrap();
    assert_eq!(handle.get_boxed(&obj).unwrap(), Value::F64(2.5));
}

#[test]
fn test_boxed_write_demands_exact_variant() {
    let class = sample_class();
    let obj = sample_instance(&class);
    let handle = FieldHandle::create(&class, "public_int").unwrap();

    let err = handle.put_boxed(&obj, &Value::I64(7)).unwrap_err();
    assert!(matches!(err, FieldError::TypeMismatch { .. }));
    // The failed write left the field untouched.
    assert_eq!(handle.get_i32(&obj).unwrap(), 4);
}

// ════════════════════════════════════════════════════════════════════════════
// References
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_instance_reference_roundtrip() {
    let class = sample_class();
    let obj = class.new_instance();
    let handle = FieldHandle::create(&class, "label").unwrap();

    assert_eq!(handle.get(&obj).unwrap(), Value::Null);
    handle.put(&obj, Value::from("tag")).unwrap();
    assert_eq!(handle.get(&obj).unwrap(), Value::from("tag"));
    handle.put(&obj, Value::Null).unwrap();
    assert_eq!(handle.get(&obj).unwrap(), Value::Null);
}

#[test]
fn test_reference_write_checks_value_class() {
    let class = sample_class();
    let obj = class.new_instance();
    let handle = FieldHandle::create(&class, "label").unwrap();

    // A plain Object is not a Str.
    let stranger = builtins::object_class().new_instance();
    let err = handle.put(&obj, Value::Obj(stranger)).unwrap_err();
    assert!(matches!(err, FieldError::TypeMismatch { .. }));
}

#[test]
fn test_static_reference_roundtrip() {
    let class = sample_class();
    let handle = FieldHandle::create(&class, "private_static_obj").unwrap();

    assert_eq!(handle.get_static().unwrap(), Value::Null);
    handle.put_static(Value::from("x")).unwrap();
    assert_eq!(handle.get_static().unwrap(), Value::from("x"));
}

#[test]
fn test_static_i32_roundtrip() {
    let class = sample_class();
    let handle = FieldHandle::create(&class, "public_static_int").unwrap();

    assert_eq!(handle.get_static_i32().unwrap(), 0);
    handle.put_static_i32(41).unwrap();
    assert_eq!(handle.get_static_i32().unwrap(), 41);
    assert_eq!(handle.get_static_boxed().unwrap(), Value::I32(41));
}

// ════════════════════════════════════════════════════════════════════════════
// Shape errors
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_reference_accessors_reject_primitive_fields() {
    let class = sample_class();
    let obj = sample_instance(&class);
    let handle = FieldHandle::create(&class, "public_int").unwrap();

    assert!(matches!(
        handle.get(&obj).unwrap_err(),
        FieldError::WrongFieldKind(_)
    ));
    assert!(matches!(
        handle.put(&obj, Value::Null).unwrap_err(),
        FieldError::WrongFieldKind(_)
    ));
}

#[test]
fn test_i32_accessors_reject_other_shapes() {
    let class = sample_class();
    let obj = class.new_instance();
    let label = FieldHandle::create(&class, "label").unwrap();
    let ratio = FieldHandle::create(&class, "ratio").unwrap();

    assert!(matches!(
        label.get_i32(&obj).unwrap_err(),
        FieldError::WrongFieldKind(_)
    ));
    assert!(matches!(
        ratio.get_i32(&obj).unwrap_err(),
        FieldError::WrongFieldKind(_)
    ));
}

#[test]
fn test_static_and_instance_ops_do_not_cross() {
    let class = sample_class();
    let obj = sample_instance(&class);
    let instance_handle = FieldHandle::create(&class, "public_int").unwrap();
    let static_handle = FieldHandle::create(&class, "public_static_int").unwrap();

    assert!(matches!(
        instance_handle.get_static_i32().unwrap_err(),
        FieldError::WrongFieldKind(_)
    ));
    assert!(matches!(
        static_handle.get_i32(&obj).unwrap_err(),
        FieldError::WrongFieldKind(_)
    ));
}

#[test]
fn test_shape_checks_precede_final_check() {
    // A wrongly-shaped write to a final field reports the shape error,
    // never FinalFieldReadOnly.
    let class = sample_class();
    let obj = sample_instance(&class);
    let handle = FieldHandle::create(&class, "private_final_int").unwrap();

    assert!(matches!(
        handle.put(&obj, Value::Null).unwrap_err(),
        FieldError::WrongFieldKind("field is primitive")
    ));
    assert!(matches!(
        handle.put_static_i32(9).unwrap_err(),
        FieldError::WrongFieldKind("field is not static")
    ));
    // The rightly-shaped write still hits the final check.
    assert!(matches!(
        handle.put_i32(&obj, 9).unwrap_err(),
        FieldError::FinalFieldReadOnly(_)
    ));
}

#[test]
fn test_introspection_reports_field_shape() {
    let class = sample_class();

    let sealed = FieldHandle::create(&class, "private_final_int").unwrap();
    assert!(!sealed.is_static());
    assert!(sealed.is_final());
    assert!(!sealed.is_public());
    assert!(sealed.is_primitive());
    assert_eq!(sealed.primitive_kind(), Some(PrimitiveKind::I32));

    let static_ref = FieldHandle::create(&class, "private_static_obj").unwrap();
    assert!(static_ref.is_static());
    assert!(!static_ref.is_final());
    assert!(!static_ref.is_primitive());
    assert_eq!(static_ref.primitive_kind(), None);
    assert_eq!(static_ref.declaring_class().name(), "Sample");
    assert_eq!(static_ref.field_type().name(), "Object");

    let open = FieldHandle::create(&class, "public_int").unwrap();
    assert!(open.is_public());
    assert!(!open.is_final());
}

#[test]
fn test_null_instance_is_rejected() {
    let class = sample_class();
    let int_handle = FieldHandle::create(&class, "public_int").unwrap();
    let ref_handle = FieldHandle::create(&class, "label").unwrap();

    assert!(matches!(
        int_handle.get_i32(&ObjRef::null()).unwrap_err(),
        FieldError::NullInstance
    ));
    assert!(matches!(
        ref_handle.get(&ObjRef::null()).unwrap_err(),
        FieldError::NullInstance
    ));
}

#[test]
fn test_foreign_instance_is_rejected() {
    let class = sample_class();
    let other = ClassBuilder::new("Other")
        .field("public_int", i32_ty(), MOD_PUBLIC)
        .build()
        .unwrap();
    let handle = FieldHandle::create(&class, "public_int").unwrap();

    let err = handle.get_i32(&other.new_instance()).unwrap_err();
    assert!(matches!(err, FieldError::TypeMismatch { .. }));
}

#[test]
fn test_subclass_instance_is_accepted() {
    let class = sample_class();
    let sub = ClassBuilder::new("SubSample")
        .superclass(&class)
        .field("extra", i32_ty(), MOD_PUBLIC)
        .build()
        .unwrap();
    let obj = sub.new_instance();

    let inherited = FieldHandle::create(&class, "public_int").unwrap();
    inherited.put_i32(&obj, 13).unwrap();
    assert_eq!(inherited.get_i32(&obj).unwrap(), 13);

    // The subclass's own field lands past the inherited layout.
    let own = FieldHandle::create(&sub, "extra").unwrap();
    own.put_i32(&obj, 21).unwrap();
    assert_eq!(own.get_i32(&obj).unwrap(), 21);
    assert_eq!(inherited.get_i32(&obj).unwrap(), 13);
}

// ════════════════════════════════════════════════════════════════════════════
// Factories
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_create_unknown_field() {
    let class = sample_class();
    let err = FieldHandle::create(&class, "missing").unwrap_err();
    assert!(matches!(err, FieldError::NoSuchField { .. }));
}

#[test]
fn test_create_typed_exact_and_lenient() {
    let class = sample_class();

    // Exact primitive match.
    assert!(FieldHandle::create_typed(&class, "public_int", &i32_ty()).is_ok());
    // Boxed class for an unboxed field, and a boxed supertype.
    let boxed = FieldType::Ref(builtins::boxed_class(PrimitiveKind::I32).clone());
    assert!(FieldHandle::create_typed(&class, "public_int", &boxed).is_ok());
    let number = FieldType::Ref(builtins::number_class().clone());
    assert!(FieldHandle::create_typed(&class, "public_int", &number).is_ok());
}

#[test]
fn test_create_typed_mismatch() {
    let class = sample_class();
    let err = FieldHandle::create_typed(&class, "public_int", &f64_ty()).unwrap_err();
    assert!(matches!(err, FieldError::TypeMismatch { .. }));
    let err = FieldHandle::create_typed(&class, "label", &i32_ty()).unwrap_err();
    assert!(matches!(err, FieldError::TypeMismatch { .. }));
}

#[test]
fn test_find_unique_by_type() {
    let class = sample_class();

    let handle = FieldHandle::find_unique_by_type(&class, &f64_ty()).unwrap();
    assert_eq!(handle.name(), "ratio");
    let handle = FieldHandle::find_unique_by_type(&class, &str_ty()).unwrap();
    assert_eq!(handle.name(), "label");
}

#[test]
fn test_find_unique_by_type_failures() {
    let class = sample_class();

    let err = FieldHandle::find_unique_by_type(&class, &FieldType::Prim(PrimitiveKind::I8))
        .unwrap_err();
    assert!(matches!(err, FieldError::NotFound { .. }));

    // Three i32 fields, so the match is ambiguous and names them all.
    let err = FieldHandle::find_unique_by_type(&class, &i32_ty()).unwrap_err();
    match err {
        FieldError::AmbiguousMatch { matches, .. } => {
            assert!(matches.contains("public_int"));
            assert!(matches.contains("private_final_int"));
            assert!(matches.contains("public_static_int"));
        }
        other => panic!("expected AmbiguousMatch, got {other:?}"),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Access override isolation
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_handle_access_override_is_private() {
    let class = sample_class();
    let record = class.declared_field("private_final_int").unwrap();
    assert!(!record.is_accessible());

    let handle = FieldHandle::from_record(&record).unwrap();
    // Constructing the handle never mutates the caller's record.
    assert!(!record.is_accessible());

    // field() hands out an independent clone; flipping its flag changes
    // nothing about the handle.
    let exposed = handle.field().unwrap();
    assert!(exposed.is_accessible());
    exposed.set_accessible(false);
    let obj = sample_instance(&class);
    assert_eq!(handle.get_i32(&obj).unwrap(), 1);
}

#[test]
fn test_two_handles_are_independent() {
    let class = sample_class();
    let obj = sample_instance(&class);
    let a = FieldHandle::create(&class, "public_int").unwrap();
    let b = FieldHandle::create(&class, "public_int").unwrap();

    a.put_i32(&obj, 9).unwrap();
    assert_eq!(b.get_i32(&obj).unwrap(), 9);
}

// ════════════════════════════════════════════════════════════════════════════
// Strategy selection
// ════════════════════════════════════════════════════════════════════════════

fn descriptor_for(class: &Arc<Class>, name: &str) -> FieldDescriptor {
    let record = class.declared_field(name).unwrap();
    record.set_accessible(true);
    FieldDescriptor::new(record).unwrap()
}

#[test]
fn test_no_facility_means_reflective() {
    let class = sample_class();
    let d = descriptor_for(&class, "public_int");
    let strategy = select_strategy(&d, None).unwrap();
    assert!(matches!(strategy, Strategy::Reflective));
}

#[test]
fn test_facility_specializes_by_shape() {
    let class = sample_class();
    let raw = capability::raw_facility();
    assert!(raw.is_some());

    let d = descriptor_for(&class, "public_int");
    assert!(matches!(
        select_strategy(&d, raw).unwrap(),
        Strategy::RawInstanceI32 { .. }
    ));

    let d = descriptor_for(&class, "public_static_int");
    assert!(matches!(
        select_strategy(&d, raw).unwrap(),
        Strategy::RawStaticI32 { .. }
    ));

    let d = descriptor_for(&class, "label");
    assert!(matches!(
        select_strategy(&d, raw).unwrap(),
        Strategy::RawInstanceRef { .. }
    ));

    let d = descriptor_for(&class, "private_static_obj");
    assert!(matches!(
        select_strategy(&d, raw).unwrap(),
        Strategy::RawStaticRef { .. }
    ));

    // No raw specialization for f64.
    let d = descriptor_for(&class, "ratio");
    assert!(matches!(
        select_strategy(&d, raw).unwrap(),
        Strategy::Reflective
    ));
}

#[test]
fn test_inaccessible_private_record_has_no_descriptor() {
    let class = sample_class();
    let record = class.declared_field("private_final_int").unwrap();
    let err = FieldDescriptor::new(record).unwrap_err();
    assert!(matches!(err, FieldError::InaccessibleField(_)));
}

// ════════════════════════════════════════════════════════════════════════════
// Scenario
// ════════════════════════════════════════════════════════════════════════════

/// The combined walk-through: privileged reads of a private final field,
/// ordinary writes to a public one, and a private static reference, all on
/// the same class.
#[test]
fn test_combined_scenario() {
    let class = sample_class();
    let obj = sample_instance(&class);

    let private_final = FieldHandle::create(&class, "private_final_int").unwrap();
    let public_int = FieldHandle::create(&class, "public_int").unwrap();
    let static_obj = FieldHandle::create(&class, "private_static_obj").unwrap();

    assert_eq!(private_final.get_i32(&obj).unwrap(), 1);
    assert_eq!(public_int.get_i32(&obj).unwrap(), 4);

    public_int.put_i32(&obj, 5).unwrap();
    static_obj.put_static(Value::from("x")).unwrap();

    assert_eq!(public_int.get_boxed(&obj).unwrap(), Value::I32(5));
    assert_eq!(static_obj.get_static().unwrap(), Value::from("x"));
    assert_eq!(private_final.get_i32(&obj).unwrap(), 1);
}
