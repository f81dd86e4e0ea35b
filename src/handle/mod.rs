//! Typed field handles.
//!
//! A [`FieldHandle`] is a reference to one class field that can read and
//! write its value. Access checking happens once, when the handle is
//! created, never per call, so handles to non-public fields should be kept
//! private and never handed to untrusted code.
//!
//! Handles draw a hard line between reference and primitive fields: the
//! unboxed accessors (`get_i32`, `put_i32`, ...) demand an exact kind and
//! never convert, while the `*_boxed` family auto-converts primitives to
//! and from [`Value`].
//!
//! Each handle is backed by one of two strategies picked at construction:
//! the always-available reflective path, or the raw-offset path when the
//! raw facility is present and the field's shape has a specialization. The
//! raw path skips per-call lookup and validation entirely.

mod descriptor;
mod raw;
mod reflective;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use arrayvec::ArrayVec;

use crate::capability::{self, RawFacility};
use crate::class::{
    Class, FieldRecord, FieldType, INVALID_OFFSET, MAX_FIELDS, ObjRef, clone_field,
    is_leniently_assignable,
};
use crate::error::FieldError;
use crate::primitive::PrimitiveKind;
use crate::value::Value;

pub use descriptor::FieldDescriptor;

// ─── Strategy ───────────────────────────────────────────────────────────────

/// How a handle reaches its field's storage. Resolved once at construction
/// so the hot path never re-evaluates capability or shape.
#[derive(Debug)]
pub(crate) enum Strategy {
    Reflective,
    RawInstanceI32 {
        raw: &'static RawFacility,
        offset: usize,
    },
    RawStaticI32 {
        raw: &'static RawFacility,
        offset: usize,
    },
    RawInstanceRef {
        raw: &'static RawFacility,
        slot: usize,
    },
    RawStaticRef {
        raw: &'static RawFacility,
        slot: usize,
    },
}

// ─── Field Handle ───────────────────────────────────────────────────────────

/// A typed handle to one field of a class. Immutable and safe to share
/// freely across threads.
#[derive(Debug)]
pub struct FieldHandle {
    descriptor: FieldDescriptor,
    strategy: Strategy,
}

impl FieldHandle {
    // ════════════════════════════════════════════════════════════════════
    // Factory
    // ════════════════════════════════════════════════════════════════════

    /// Build a handle for an already-resolved field record.
    ///
    /// Non-public fields (or fields of non-public classes) require the
    /// suppress-access-checks grant; no explicit access override on the
    /// record is needed. The record is defensively cloned, so the handle's
    /// own access override never leaks back to the caller's record.
    pub fn from_record(record: &Arc<FieldRecord>) -> Result<Self, FieldError> {
        let declaring = record.declaring_class().ok_or_else(|| {
            FieldError::InternalAccess(format!(
                "declaring class of `{}` was dropped",
                record.name()
            ))
        })?;
        if !(record.is_public() && declaring.is_public()) {
            capability::check_suppress_access_checks()?;
        }
        let private = clone_field(record)?;
        private.set_accessible(true);
        let descriptor = FieldDescriptor::new(private)?;
        let strategy = select_strategy(&descriptor, capability::raw_facility())?;
        Ok(FieldHandle {
            descriptor,
            strategy,
        })
    }

    /// Resolve the field named `name` declared on `class`.
    pub fn create(class: &Arc<Class>, name: &str) -> Result<Self, FieldError> {
        let record = class.declared_field(name)?;
        Self::from_record(&record)
    }

    /// Resolve the field named `name`, additionally requiring its declared
    /// type to be leniently assignable to `expected` (a primitive and its
    /// boxed class are interchangeable).
    pub fn create_typed(
        class: &Arc<Class>,
        name: &str,
        expected: &FieldType,
    ) -> Result<Self, FieldError> {
        let record = class.declared_field(name)?;
        if !is_leniently_assignable(expected, record.ty()) {
            return Err(FieldError::TypeMismatch {
                expected: expected.name(),
                actual: record.ty().name(),
            });
        }
        Self::from_record(&record)
    }

    /// Find the one declared field whose type leniently matches `expected`.
    ///
    /// Passing `Object` accepts every reference field and every boxed
    /// primitive, so narrow types make for the useful queries.
    pub fn find_unique_by_type(
        class: &Arc<Class>,
        expected: &FieldType,
    ) -> Result<Self, FieldError> {
        let matches: ArrayVec<&Arc<FieldRecord>, MAX_FIELDS> = class
            .declared_fields()
            .filter(|record| is_leniently_assignable(expected, record.ty()))
            .collect();
        match matches.as_slice() {
            [] => Err(FieldError::NotFound {
                class: class.name().clone(),
                ty: expected.name(),
            }),
            [record] => Self::from_record(record),
            many => Err(FieldError::AmbiguousMatch {
                class: class.name().clone(),
                ty: expected.name(),
                matches: many
                    .iter()
                    .map(|record| record.name().as_str())
                    .collect::<Vec<_>>()
                    .join(","),
            }),
        }
    }

    // ════════════════════════════════════════════════════════════════════
    // Introspection
    // ════════════════════════════════════════════════════════════════════

    #[inline]
    pub fn name(&self) -> &str {
        self.descriptor.name().as_str()
    }

    #[inline]
    pub fn declaring_class(&self) -> &Arc<Class> {
        self.descriptor.declaring_class()
    }

    #[inline]
    pub fn field_type(&self) -> &FieldType {
        self.descriptor.field_type()
    }

    #[inline]
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        self.descriptor.primitive_kind()
    }

    #[inline]
    pub fn is_primitive(&self) -> bool {
        self.descriptor.is_primitive()
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.descriptor.is_static()
    }

    #[inline]
    pub fn is_final(&self) -> bool {
        self.descriptor.is_final()
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.descriptor.is_public()
    }

    #[inline]
    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    /// The underlying field record, defensively cloned: its access flag is
    /// independent of this handle's.
    pub fn field(&self) -> Result<Arc<FieldRecord>, FieldError> {
        clone_field(self.descriptor.record())
    }

    // ════════════════════════════════════════════════════════════════════
    // Reference accessors (reference fields only, never primitives)
    // ════════════════════════════════════════════════════════════════════

    /// Value of this reference instance field in `instance`.
    pub fn get(&self, instance: &ObjRef) -> Result<Value, FieldError> {
        self.check_reference()?;
        self.check_instance_op()?;
        match &self.strategy {
            Strategy::Reflective => reflective::read_ref(&self.descriptor, instance),
            Strategy::RawInstanceRef { raw, slot } => {
                raw::read_ref(raw, *slot, &self.descriptor, instance)
            }
            other => Err(strategy_mismatch(other)),
        }
    }

    /// Value of this reference static field.
    pub fn get_static(&self) -> Result<Value, FieldError> {
        self.check_reference()?;
        self.check_static_op()?;
        match &self.strategy {
            Strategy::Reflective => reflective::read_static_ref(&self.descriptor),
            Strategy::RawStaticRef { raw, slot } => {
                raw::read_static_ref(raw, *slot, &self.descriptor)
            }
            other => Err(strategy_mismatch(other)),
        }
    }

    /// Write this reference instance field. Fails on final fields.
    pub fn put(&self, instance: &ObjRef, value: Value) -> Result<(), FieldError> {
        self.check_reference()?;
        self.check_instance_op()?;
        self.check_not_final()?;
        self.force_put(instance, value)
    }

    /// Write this reference static field. Fails on final fields.
    pub fn put_static(&self, value: Value) -> Result<(), FieldError> {
        self.check_reference()?;
        self.check_static_op()?;
        self.check_not_final()?;
        self.force_put_static(value)
    }

    /// Write this reference instance field even if it is final.
    ///
    /// Best-effort on final fields: a host that has already assumed the
    /// field never changes may not show the write to every reader.
    pub fn force_put(&self, instance: &ObjRef, value: Value) -> Result<(), FieldError> {
        self.check_reference()?;
        self.check_instance_op()?;
        match &self.strategy {
            Strategy::Reflective => reflective::write_ref(&self.descriptor, instance, value),
            Strategy::RawInstanceRef { raw, slot } => {
                raw::write_ref(raw, *slot, &self.descriptor, instance, value)
            }
            other => Err(strategy_mismatch(other)),
        }
    }

    /// Write this reference static field even if it is final.
    pub fn force_put_static(&self, value: Value) -> Result<(), FieldError> {
        self.check_reference()?;
        self.check_static_op()?;
        match &self.strategy {
            Strategy::Reflective => reflective::write_static_ref(&self.descriptor, value),
            Strategy::RawStaticRef { raw, slot } => {
                raw::write_static_ref(raw, *slot, &self.descriptor, value)
            }
            other => Err(strategy_mismatch(other)),
        }
    }

    // ════════════════════════════════════════════════════════════════════
    // Unboxed i32 accessors (exact kind, no conversions)
    // ════════════════════════════════════════════════════════════════════

    /// Value of this primitive i32 instance field in `instance`.
    pub fn get_i32(&self, instance: &ObjRef) -> Result<i32, FieldError> {
        self.check_i32()?;
        self.check_instance_op()?;
        match &self.strategy {
            Strategy::Reflective => reflective::read_i32(&self.descriptor, instance),
            Strategy::RawInstanceI32 { raw, offset } => {
                raw::read_i32(raw, *offset, &self.descriptor, instance)
            }
            other => Err(strategy_mismatch(other)),
        }
    }

    /// Value of this primitive i32 static field.
    pub fn get_static_i32(&self) -> Result<i32, FieldError> {
        self.check_i32()?;
        self.check_static_op()?;
        match &self.strategy {
            Strategy::Reflective => reflective::read_static_i32(&self.descriptor),
            Strategy::RawStaticI32 { raw, offset } => {
                raw::read_static_i32(raw, *offset, &self.descriptor)
            }
            other => Err(strategy_mismatch(other)),
        }
    }

    /// Write this primitive i32 instance field. Fails on final fields.
    pub fn put_i32(&self, instance: &ObjRef, value: i32) -> Result<(), FieldError> {
        self.check_i32()?;
        self.check_instance_op()?;
        self.check_not_final()?;
        self.force_put_i32(instance, value)
    }

    /// Write this primitive i32 static field. Fails on final fields.
    pub fn put_static_i32(&self, value: i32) -> Result<(), FieldError> {
        self.check_i32()?;
        self.check_static_op()?;
        self.check_not_final()?;
        self.force_put_static_i32(value)
    }

    /// Write this primitive i32 instance field even if it is final.
    pub fn force_put_i32(&self, instance: &ObjRef, value: i32) -> Result<(), FieldError> {
        self.check_i32()?;
        self.check_instance_op()?;
        match &self.strategy {
            Strategy::Reflective => reflective::write_i32(&self.descriptor, instance, value),
            Strategy::RawInstanceI32 { raw, offset } => {
                raw::write_i32(raw, *offset, &self.descriptor, instance, value)
            }
            other => Err(strategy_mismatch(other)),
        }
    }

    /// Write this primitive i32 static field even if it is final.
    pub fn force_put_static_i32(&self, value: i32) -> Result<(), FieldError> {
        self.check_i32()?;
        self.check_static_op()?;
        match &self.strategy {
            Strategy::Reflective => reflective::write_static_i32(&self.descriptor, value),
            Strategy::RawStaticI32 { raw, offset } => {
                raw::write_static_i32(raw, *offset, &self.descriptor, value)
            }
            other => Err(strategy_mismatch(other)),
        }
    }

    // ════════════════════════════════════════════════════════════════════
    // Boxed accessors (any field, auto-converting)
    // ════════════════════════════════════════════════════════════════════

    /// Value of this instance field in `instance`, boxing primitives.
    pub fn get_boxed(&self, instance: &ObjRef) -> Result<Value, FieldError> {
        self.check_instance_op()?;
        match &self.strategy {
            Strategy::Reflective => reflective::read_boxed(&self.descriptor, instance),
            Strategy::RawInstanceI32 { raw, offset } => {
                raw::read_i32(raw, *offset, &self.descriptor, instance).map(Value::I32)
            }
            Strategy::RawInstanceRef { raw, slot } => {
                raw::read_ref(raw, *slot, &self.descriptor, instance)
            }
            other => Err(strategy_mismatch(other)),
        }
    }

    /// Value of this static field, boxing primitives.
    pub fn get_static_boxed(&self) -> Result<Value, FieldError> {
        self.check_static_op()?;
        match &self.strategy {
            Strategy::Reflective => reflective::read_static_boxed(&self.descriptor),
            Strategy::RawStaticI32 { raw, offset } => {
                raw::read_static_i32(raw, *offset, &self.descriptor).map(Value::I32)
            }
            Strategy::RawStaticRef { raw, slot } => {
                raw::read_static_ref(raw, *slot, &self.descriptor)
            }
            other => Err(strategy_mismatch(other)),
        }
    }

    /// Write this instance field from boxed form. Fails on final fields.
    /// Primitive fields demand the exactly matching variant.
    pub fn put_boxed(&self, instance: &ObjRef, value: &Value) -> Result<(), FieldError> {
        self.check_instance_op()?;
        self.check_not_final()?;
        self.force_put_boxed(instance, value)
    }

    /// Write this static field from boxed form. Fails on final fields.
    pub fn put_static_boxed(&self, value: &Value) -> Result<(), FieldError> {
        self.check_static_op()?;
        self.check_not_final()?;
        self.force_put_static_boxed(value)
    }

    /// Write this instance field from boxed form even if it is final.
    pub fn force_put_boxed(&self, instance: &ObjRef, value: &Value) -> Result<(), FieldError> {
        self.check_instance_op()?;
        match &self.strategy {
            Strategy::Reflective => reflective::write_boxed(&self.descriptor, instance, value),
            Strategy::RawInstanceI32 { raw, offset } => {
                let unboxed = self.unbox_i32(value)?;
                raw::write_i32(raw, *offset, &self.descriptor, instance, unboxed)
            }
            Strategy::RawInstanceRef { raw, slot } => {
                raw::write_ref(raw, *slot, &self.descriptor, instance, value.clone())
            }
            other => Err(strategy_mismatch(other)),
        }
    }

    /// Write this static field from boxed form even if it is final.
    pub fn force_put_static_boxed(&self, value: &Value) -> Result<(), FieldError> {
        self.check_static_op()?;
        match &self.strategy {
            Strategy::Reflective => reflective::write_static_boxed(&self.descriptor, value),
            Strategy::RawStaticI32 { raw, offset } => {
                let unboxed = self.unbox_i32(value)?;
                raw::write_static_i32(raw, *offset, &self.descriptor, unboxed)
            }
            Strategy::RawStaticRef { raw, slot } => {
                raw::write_static_ref(raw, *slot, &self.descriptor, value.clone())
            }
            other => Err(strategy_mismatch(other)),
        }
    }

    // ════════════════════════════════════════════════════════════════════
    // Shape checks
    // ════════════════════════════════════════════════════════════════════

    #[inline]
    fn check_reference(&self) -> Result<(), FieldError> {
        if self.descriptor.is_primitive() {
            return Err(FieldError::WrongFieldKind("field is primitive"));
        }
        Ok(())
    }

    #[inline]
    fn check_i32(&self) -> Result<(), FieldError> {
        if self.descriptor.primitive_kind() != Some(PrimitiveKind::I32) {
            return Err(FieldError::WrongFieldKind("field isn't a primitive i32"));
        }
        Ok(())
    }

    #[inline]
    fn check_instance_op(&self) -> Result<(), FieldError> {
        if self.descriptor.is_static() {
            return Err(FieldError::WrongFieldKind("field is static"));
        }
        Ok(())
    }

    #[inline]
    fn check_static_op(&self) -> Result<(), FieldError> {
        if !self.descriptor.is_static() {
            return Err(FieldError::WrongFieldKind("field is not static"));
        }
        Ok(())
    }

    #[inline]
    fn check_not_final(&self) -> Result<(), FieldError> {
        if self.descriptor.is_final() {
            return Err(FieldError::FinalFieldReadOnly(self.descriptor.name().clone()));
        }
        Ok(())
    }

    fn unbox_i32(&self, value: &Value) -> Result<i32, FieldError> {
        value.as_i32().ok_or_else(|| FieldError::TypeMismatch {
            expected: "i32".into(),
            actual: value.type_name(),
        })
    }
}

// ─── Strategy selection ─────────────────────────────────────────────────────

/// The factory's dispatch table.
///
/// No facility means reflective, unconditionally. With the facility:
/// reference fields and i32 fields take their raw variant (static or
/// instance by the descriptor's static bit); a primitive kind without a
/// dedicated raw specialization falls back to reflective, exactly as if no
/// facility existed.
pub(crate) fn select_strategy(
    d: &FieldDescriptor,
    raw: Option<&'static RawFacility>,
) -> Result<Strategy, FieldError> {
    let Some(raw) = raw else {
        return Ok(Strategy::Reflective);
    };
    match d.primitive_kind() {
        None => {
            let slot = checked_offset(d)?;
            Ok(if d.is_static() {
                Strategy::RawStaticRef { raw, slot }
            } else {
                Strategy::RawInstanceRef { raw, slot }
            })
        }
        Some(PrimitiveKind::I32) => {
            let offset = checked_offset(d)?;
            Ok(if d.is_static() {
                Strategy::RawStaticI32 { raw, offset }
            } else {
                Strategy::RawInstanceI32 { raw, offset }
            })
        }
        Some(_) => Ok(Strategy::Reflective),
    }
}

fn checked_offset(d: &FieldDescriptor) -> Result<usize, FieldError> {
    if d.offset() == INVALID_OFFSET {
        return Err(FieldError::InvalidOffset);
    }
    Ok(d.offset())
}

/// Only reachable if the factory paired a descriptor with a strategy of
/// the wrong shape, which it never does.
fn strategy_mismatch(strategy: &Strategy) -> FieldError {
    FieldError::InternalAccess(format!("strategy {strategy:?} doesn't match field shape"))
}
