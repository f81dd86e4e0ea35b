//! The always-available strategy: every call re-resolves the field inside
//! its declaring class and goes through the checked storage codecs. Slower
//! than the raw path, but each step is validated, so a descriptor that has
//! drifted from the class layout surfaces as `InternalAccess` instead of a
//! corrupt read.

use std::sync::Arc;

use crate::class::{Class, FieldRecord, FieldType, Instance, ObjRef, check_ref_assignable};
use crate::error::FieldError;
use crate::handle::descriptor::FieldDescriptor;
use crate::primitive::PrimitiveKind;
use crate::value::Value;

/// Null and declaring-type checks shared with the raw strategies.
pub(super) fn resolve_instance<'a>(
    d: &FieldDescriptor,
    instance: &'a ObjRef,
) -> Result<&'a Arc<Instance>, FieldError> {
    let inst = instance.instance().ok_or(FieldError::NullInstance)?;
    if !d.declaring_class().is_assignable_from(inst.class()) {
        return Err(FieldError::TypeMismatch {
            expected: d.declaring_class().name().clone(),
            actual: inst.class().name().clone(),
        });
    }
    Ok(inst)
}

/// Re-resolve the descriptor's field in its declaring class and confirm it
/// still has the shape the descriptor snapshotted.
fn refind<'a>(d: &'a FieldDescriptor) -> Result<&'a Arc<FieldRecord>, FieldError> {
    let record = d.record();
    let found = d
        .declaring_class()
        .find_field(record.name_hash)
        .ok_or_else(|| desync(d, "field vanished from its class"))?;
    if found.ty() != record.ty() || found.offset != record.offset {
        return Err(desync(d, "field no longer matches its descriptor"));
    }
    Ok(found)
}

fn desync(d: &FieldDescriptor, what: &str) -> FieldError {
    FieldError::InternalAccess(format!(
        "{}.{}: {what}",
        d.declaring_class().name(),
        d.name()
    ))
}

// ════════════════════════════════════════════════════════════════════════════
// Reads
// ════════════════════════════════════════════════════════════════════════════

pub(super) fn read_ref(d: &FieldDescriptor, instance: &ObjRef) -> Result<Value, FieldError> {
    let inst = resolve_instance(d, instance)?;
    let record = refind(d)?;
    let fields = inst.read_fields();
    fields.read_ref(record.offset)
}

pub(super) fn read_static_ref(d: &FieldDescriptor) -> Result<Value, FieldError> {
    let record = refind(d)?;
    let statics = d.declaring_class().read_statics();
    statics.read_ref(record.offset)
}

pub(super) fn read_i32(d: &FieldDescriptor, instance: &ObjRef) -> Result<i32, FieldError> {
    let inst = resolve_instance(d, instance)?;
    let record = checked_kind(d, refind(d)?, PrimitiveKind::I32)?;
    let fields = inst.read_fields();
    fields.read_i32(record.offset)
}

pub(super) fn read_static_i32(d: &FieldDescriptor) -> Result<i32, FieldError> {
    let record = checked_kind(d, refind(d)?, PrimitiveKind::I32)?;
    let statics = d.declaring_class().read_statics();
    statics.read_i32(record.offset)
}

pub(super) fn read_boxed(d: &FieldDescriptor, instance: &ObjRef) -> Result<Value, FieldError> {
    let inst = resolve_instance(d, instance)?;
    let record = refind(d)?;
    let fields = inst.read_fields();
    match record.ty() {
        FieldType::Prim(kind) => fields.read_prim(*kind, record.offset),
        FieldType::Ref(_) => fields.read_ref(record.offset),
    }
}

pub(super) fn read_static_boxed(d: &FieldDescriptor) -> Result<Value, FieldError> {
    let record = refind(d)?;
    let statics = d.declaring_class().read_statics();
    match record.ty() {
        FieldType::Prim(kind) => statics.read_prim(*kind, record.offset),
        FieldType::Ref(_) => statics.read_ref(record.offset),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Writes
// ════════════════════════════════════════════════════════════════════════════

pub(super) fn write_ref(
    d: &FieldDescriptor,
    instance: &ObjRef,
    value: Value,
) -> Result<(), FieldError> {
    let inst = resolve_instance(d, instance)?;
    let record = refind(d)?;
    check_target(d, &value)?;
    let mut fields = inst.write_fields();
    fields.write_ref(record.offset, value)
}

pub(super) fn write_static_ref(d: &FieldDescriptor, value: Value) -> Result<(), FieldError> {
    let record = refind(d)?;
    check_target(d, &value)?;
    let mut statics = d.declaring_class().write_statics();
    statics.write_ref(record.offset, value)
}

pub(super) fn write_i32(
    d: &FieldDescriptor,
    instance: &ObjRef,
    value: i32,
) -> Result<(), FieldError> {
    let inst = resolve_instance(d, instance)?;
    let record = checked_kind(d, refind(d)?, PrimitiveKind::I32)?;
    let mut fields = inst.write_fields();
    fields.write_i32(record.offset, value)
}

pub(super) fn write_static_i32(d: &FieldDescriptor, value: i32) -> Result<(), FieldError> {
    let record = checked_kind(d, refind(d)?, PrimitiveKind::I32)?;
    let mut statics = d.declaring_class().write_statics();
    statics.write_i32(record.offset, value)
}

pub(super) fn write_boxed(
    d: &FieldDescriptor,
    instance: &ObjRef,
    value: &Value,
) -> Result<(), FieldError> {
    let inst = resolve_instance(d, instance)?;
    let record = refind(d)?;
    match record.ty() {
        FieldType::Prim(kind) => {
            let mut fields = inst.write_fields();
            fields.write_prim(*kind, record.offset, value)
        }
        FieldType::Ref(_) => {
            check_target(d, value)?;
            let mut fields = inst.write_fields();
            fields.write_ref(record.offset, value.clone())
        }
    }
}

pub(super) fn write_static_boxed(d: &FieldDescriptor, value: &Value) -> Result<(), FieldError> {
    let record = refind(d)?;
    match record.ty() {
        FieldType::Prim(kind) => {
            let mut statics = d.declaring_class().write_statics();
            statics.write_prim(*kind, record.offset, value)
        }
        FieldType::Ref(_) => {
            check_target(d, value)?;
            let mut statics = d.declaring_class().write_statics();
            statics.write_ref(record.offset, value.clone())
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════════════

fn checked_kind<'a>(
    d: &FieldDescriptor,
    record: &'a Arc<FieldRecord>,
    kind: PrimitiveKind,
) -> Result<&'a Arc<FieldRecord>, FieldError> {
    if record.ty().kind() == Some(kind) {
        Ok(record)
    } else {
        Err(desync(d, "field kind changed under its descriptor"))
    }
}

pub(super) fn check_target(d: &FieldDescriptor, value: &Value) -> Result<(), FieldError> {
    let target: &Arc<Class> = d
        .ref_class()
        .ok_or_else(|| desync(d, "reference write against a primitive field"))?;
    check_ref_assignable(target, value)
}
