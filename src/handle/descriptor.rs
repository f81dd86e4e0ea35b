use std::sync::Arc;

use smol_str::SmolStr;

use crate::class::{Class, FieldRecord, FieldType, MOD_FINAL, MOD_PUBLIC, MOD_STATIC};
use crate::error::FieldError;
use crate::primitive::PrimitiveKind;

// ─── Field Descriptor ───────────────────────────────────────────────────────

/// Immutable snapshot of one field's identity: declaring class, type,
/// modifier bits, derived primitive kind, storage offset.
///
/// Built once at handle construction from a record the factory has already
/// defensively cloned, so the access-override flag it carries is private to
/// the owning handle. Never mutated afterwards.
#[derive(Debug)]
pub struct FieldDescriptor {
    record: Arc<FieldRecord>,
    declaring: Arc<Class>,
    ty: FieldType,
    modifiers: u8,
    kind: Option<PrimitiveKind>,
    offset: usize,
}

impl FieldDescriptor {
    /// Snapshot `record`. The record must be access-overridden, or public
    /// on a public class; anything else is `InaccessibleField` (the gate
    /// check for non-public fields happens before this point).
    pub(crate) fn new(record: Arc<FieldRecord>) -> Result<Self, FieldError> {
        let declaring = record.declaring_class().ok_or_else(|| {
            FieldError::InternalAccess(format!(
                "declaring class of `{}` was dropped",
                record.name()
            ))
        })?;
        if !(record.is_accessible() || record.is_public() && declaring.is_public()) {
            return Err(FieldError::InaccessibleField(record.name().clone()));
        }
        let ty = record.ty().clone();
        let kind = ty.kind();
        debug_assert_eq!(kind.is_some(), ty.is_primitive());
        Ok(Self {
            declaring,
            modifiers: record.modifiers(),
            kind,
            offset: record.offset,
            ty,
            record,
        })
    }

    #[inline]
    pub fn name(&self) -> &SmolStr {
        self.record.name()
    }

    #[inline]
    pub fn declaring_class(&self) -> &Arc<Class> {
        &self.declaring
    }

    #[inline]
    pub fn field_type(&self) -> &FieldType {
        &self.ty
    }

    /// The primitive kind, or `None` for reference fields.
    #[inline]
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        self.kind
    }

    #[inline]
    pub fn is_primitive(&self) -> bool {
        self.kind.is_some()
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.modifiers & MOD_STATIC != 0
    }

    #[inline]
    pub fn is_final(&self) -> bool {
        self.modifiers & MOD_FINAL != 0
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.modifiers & MOD_PUBLIC != 0
    }

    #[inline]
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub(crate) fn record(&self) -> &Arc<FieldRecord> {
        &self.record
    }

    /// Reference class for reference fields, `None` for primitives.
    pub(crate) fn ref_class(&self) -> Option<&Arc<Class>> {
        match &self.ty {
            FieldType::Ref(class) => Some(class),
            FieldType::Prim(_) => None,
        }
    }
}
