use crate::error::FieldError;
use crate::primitive::PrimitiveKind;
use crate::value::Value;

// ─── Field Storage ──────────────────────────────────────────────────────────
//
//  ┌──────────────────────────────────────────────┐
//  │ prims (Box<[u8]>)                            │
//  │   primitive values packed at aligned byte    │
//  │   offsets assigned at class registration     │
//  ├──────────────────────────────────────────────┤
//  │ refs (Box<[Value]>)                          │
//  │   one slot per reference field, indexed by   │
//  │   the field's slot number                    │
//  └──────────────────────────────────────────────┘
//
// One of these backs every instance, and one per class backs its statics.

/// Sentinel for "this field has no storage location here".
pub const INVALID_OFFSET: usize = usize::MAX;

#[derive(Debug, Default)]
pub struct FieldStorage {
    pub(crate) prims: Box<[u8]>,
    pub(crate) refs: Box<[Value]>,
}

impl FieldStorage {
    pub(crate) fn with_layout(prim_len: usize, ref_len: usize) -> Self {
        Self {
            prims: vec![0u8; prim_len].into_boxed_slice(),
            refs: vec![Value::Null; ref_len].into_boxed_slice(),
        }
    }

    #[inline]
    fn prim_bytes(&self, offset: usize, len: usize) -> Result<&[u8], FieldError> {
        self.prims
            .get(offset..offset + len)
            .ok_or_else(|| desync("primitive offset out of bounds"))
    }

    #[inline]
    fn prim_bytes_mut(&mut self, offset: usize, len: usize) -> Result<&mut [u8], FieldError> {
        self.prims
            .get_mut(offset..offset + len)
            .ok_or_else(|| desync("primitive offset out of bounds"))
    }

    // ════════════════════════════════════════════════════════════════════════
    // Checked i32 access (the specialized unboxed kind)
    // ════════════════════════════════════════════════════════════════════════

    #[inline]
    pub(crate) fn read_i32(&self, offset: usize) -> Result<i32, FieldError> {
        let bytes = self.prim_bytes(offset, 4)?;
        Ok(i32::from_le_bytes(
            bytes.try_into().map_err(|_| desync("short i32 read"))?,
        ))
    }

    #[inline]
    pub(crate) fn write_i32(&mut self, offset: usize, value: i32) -> Result<(), FieldError> {
        self.prim_bytes_mut(offset, 4)?
            .copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    // ════════════════════════════════════════════════════════════════════════
    // Checked boxed access (any primitive kind)
    // ════════════════════════════════════════════════════════════════════════

    /// Read the primitive at `offset` into its boxed form.
    pub(crate) fn read_prim(
        &self,
        kind: PrimitiveKind,
        offset: usize,
    ) -> Result<Value, FieldError> {
        let value = match kind {
            PrimitiveKind::I8 => Value::I8(self.prim_bytes(offset, 1)?[0] as i8),
            PrimitiveKind::I16 => Value::I16(i16::from_le_bytes(
                self.prim_bytes(offset, 2)?
                    .try_into()
                    .map_err(|_| desync("short i16 read"))?,
            )),
            PrimitiveKind::I32 => Value::I32(self.read_i32(offset)?),
            PrimitiveKind::I64 => Value::I64(i64::from_le_bytes(
                self.prim_bytes(offset, 8)?
                    .try_into()
                    .map_err(|_| desync("short i64 read"))?,
            )),
            PrimitiveKind::F32 => Value::F32(f32::from_le_bytes(
                self.prim_bytes(offset, 4)?
                    .try_into()
                    .map_err(|_| desync("short f32 read"))?,
            )),
            PrimitiveKind::F64 => Value::F64(f64::from_le_bytes(
                self.prim_bytes(offset, 8)?
                    .try_into()
                    .map_err(|_| desync("short f64 read"))?,
            )),
            PrimitiveKind::Bool => Value::Bool(self.prim_bytes(offset, 1)?[0] != 0),
            PrimitiveKind::Char => {
                let raw = u32::from_le_bytes(
                    self.prim_bytes(offset, 4)?
                        .try_into()
                        .map_err(|_| desync("short char read"))?,
                );
                Value::Char(char::from_u32(raw).ok_or_else(|| desync("invalid char payload"))?)
            }
            PrimitiveKind::Unit => Value::Unit,
        };
        Ok(value)
    }

    /// Write a boxed value into the primitive at `offset`.
    ///
    /// The value's variant must match `kind` exactly: no widening, no
    /// narrowing, no bool-to-int coercion.
    pub(crate) fn write_prim(
        &mut self,
        kind: PrimitiveKind,
        offset: usize,
        value: &Value,
    ) -> Result<(), FieldError> {
        if value.kind() != Some(kind) {
            return Err(FieldError::TypeMismatch {
                expected: kind.unboxed_name().into(),
                actual: value.type_name(),
            });
        }
        match value {
            Value::I8(v) => self.prim_bytes_mut(offset, 1)?[0] = *v as u8,
            Value::I16(v) => self
                .prim_bytes_mut(offset, 2)?
                .copy_from_slice(&v.to_le_bytes()),
            Value::I32(v) => self.write_i32(offset, *v)?,
            Value::I64(v) => self
                .prim_bytes_mut(offset, 8)?
                .copy_from_slice(&v.to_le_bytes()),
            Value::F32(v) => self
                .prim_bytes_mut(offset, 4)?
                .copy_from_slice(&v.to_le_bytes()),
            Value::F64(v) => self
                .prim_bytes_mut(offset, 8)?
                .copy_from_slice(&v.to_le_bytes()),
            Value::Bool(v) => self.prim_bytes_mut(offset, 1)?[0] = *v as u8,
            Value::Char(v) => self
                .prim_bytes_mut(offset, 4)?
                .copy_from_slice(&(*v as u32).to_le_bytes()),
            Value::Unit => {}
            Value::Null | Value::Str(_) | Value::Obj(_) => unreachable!("kind() was Some"),
        }
        Ok(())
    }

    // ════════════════════════════════════════════════════════════════════════
    // Checked reference-slot access
    // ════════════════════════════════════════════════════════════════════════

    #[inline]
    pub(crate) fn read_ref(&self, slot: usize) -> Result<Value, FieldError> {
        self.refs
            .get(slot)
            .cloned()
            .ok_or_else(|| desync("reference slot out of bounds"))
    }

    #[inline]
    pub(crate) fn write_ref(&mut self, slot: usize, value: Value) -> Result<(), FieldError> {
        let cell = self
            .refs
            .get_mut(slot)
            .ok_or_else(|| desync("reference slot out of bounds"))?;
        *cell = value;
        Ok(())
    }
}

/// These only fire when a descriptor's offsets disagree with the storage
/// the class actually allocated, which correct usage never produces.
fn desync(what: &str) -> FieldError {
    FieldError::InternalAccess(format!("storage desync: {what}"))
}
