//! The privileged strategy: offset computed once at construction, then
//! unchecked reads and writes at that offset.
//!
//! The facility itself performs no validation at all. A null instance would
//! not fail cleanly, it would turn the offset into a nonsense address, and
//! a mistyped instance would read another class's layout. Both guards below
//! are therefore mandatory on every operation, even though the handle has
//! already validated the operation's shape.

use crate::capability::RawFacility;
use crate::class::ObjRef;
use crate::error::FieldError;
use crate::handle::descriptor::FieldDescriptor;
use crate::handle::reflective::{check_target, resolve_instance};
use crate::value::Value;

// ════════════════════════════════════════════════════════════════════════════
// Instance i32
// ════════════════════════════════════════════════════════════════════════════

pub(super) fn read_i32(
    raw: &RawFacility,
    offset: usize,
    d: &FieldDescriptor,
    instance: &ObjRef,
) -> Result<i32, FieldError> {
    // Explicit null check and declaring-type cast before the raw read.
    let inst = resolve_instance(d, instance)?;
    let fields = inst.read_fields();
    Ok(raw.read_i32(&fields, offset))
}

pub(super) fn write_i32(
    raw: &RawFacility,
    offset: usize,
    d: &FieldDescriptor,
    instance: &ObjRef,
    value: i32,
) -> Result<(), FieldError> {
    let inst = resolve_instance(d, instance)?;
    let mut fields = inst.write_fields();
    raw.write_i32(&mut fields, offset, value);
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Static i32 (base = the declaring class's statics block)
// ════════════════════════════════════════════════════════════════════════════

pub(super) fn read_static_i32(
    raw: &RawFacility,
    offset: usize,
    d: &FieldDescriptor,
) -> Result<i32, FieldError> {
    let statics = d.declaring_class().read_statics();
    Ok(raw.read_i32(&statics, offset))
}

pub(super) fn write_static_i32(
    raw: &RawFacility,
    offset: usize,
    d: &FieldDescriptor,
    value: i32,
) -> Result<(), FieldError> {
    let mut statics = d.declaring_class().write_statics();
    raw.write_i32(&mut statics, offset, value);
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Instance reference
// ════════════════════════════════════════════════════════════════════════════

pub(super) fn read_ref(
    raw: &RawFacility,
    slot: usize,
    d: &FieldDescriptor,
    instance: &ObjRef,
) -> Result<Value, FieldError> {
    let inst = resolve_instance(d, instance)?;
    let fields = inst.read_fields();
    Ok(raw.read_ref(&fields, slot))
}

pub(super) fn write_ref(
    raw: &RawFacility,
    slot: usize,
    d: &FieldDescriptor,
    instance: &ObjRef,
    value: Value,
) -> Result<(), FieldError> {
    let inst = resolve_instance(d, instance)?;
    // Cast check on write: the raw store would happily put a Str in an
    // Int32-classed slot.
    check_target(d, &value)?;
    let mut fields = inst.write_fields();
    raw.write_ref(&mut fields, slot, value);
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Static reference
// ════════════════════════════════════════════════════════════════════════════

pub(super) fn read_static_ref(
    raw: &RawFacility,
    slot: usize,
    d: &FieldDescriptor,
) -> Result<Value, FieldError> {
    let statics = d.declaring_class().read_statics();
    Ok(raw.read_ref(&statics, slot))
}

pub(super) fn write_static_ref(
    raw: &RawFacility,
    slot: usize,
    d: &FieldDescriptor,
    value: Value,
) -> Result<(), FieldError> {
    check_target(d, &value)?;
    let mut statics = d.declaring_class().write_statics();
    raw.write_ref(&mut statics, slot, value);
    Ok(())
}
