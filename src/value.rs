use smol_str::SmolStr;

use crate::class::ObjRef;
use crate::primitive::PrimitiveKind;

// ─── Value ──────────────────────────────────────────────────────────────────

/// A field value in boxed form.
///
/// This is the union the auto-converting (`*_boxed`) accessors speak:
/// every primitive kind, plus strings, object references, and null.
/// Primitive variants carry their kind exactly; the boxed accessors never
/// widen or narrow between numeric kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Char(char),
    Unit,
    Str(SmolStr),
    Obj(ObjRef),
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl Value {
    /// The primitive kind of this value, or `None` for references and null.
    pub fn kind(&self) -> Option<PrimitiveKind> {
        match self {
            Value::Bool(_) => Some(PrimitiveKind::Bool),
            Value::I8(_) => Some(PrimitiveKind::I8),
            Value::I16(_) => Some(PrimitiveKind::I16),
            Value::I32(_) => Some(PrimitiveKind::I32),
            Value::I64(_) => Some(PrimitiveKind::I64),
            Value::F32(_) => Some(PrimitiveKind::F32),
            Value::F64(_) => Some(PrimitiveKind::F64),
            Value::Char(_) => Some(PrimitiveKind::Char),
            Value::Unit => Some(PrimitiveKind::Unit),
            Value::Null | Value::Str(_) | Value::Obj(_) => None,
        }
    }

    /// Short type name for error messages.
    pub fn type_name(&self) -> SmolStr {
        match self {
            Value::Null => SmolStr::new_static("null"),
            Value::Str(_) => SmolStr::new_static("Str"),
            Value::Obj(obj) => match obj.class() {
                Some(class) => class.name().clone(),
                None => SmolStr::new_static("null"),
            },
            prim => SmolStr::new_static(
                prim.kind()
                    .map(PrimitiveKind::unboxed_name)
                    .unwrap_or("unknown"),
            ),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_obj(&self) -> Option<&ObjRef> {
        match self {
            Value::Obj(obj) => Some(obj),
            _ => None,
        }
    }
}

// ─── From impls ─────────────────────────────────────────────────────────────

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::I8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::I16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(SmolStr::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(SmolStr::from(s))
    }
}

impl From<ObjRef> for Value {
    fn from(obj: ObjRef) -> Self {
        Value::Obj(obj)
    }
}
