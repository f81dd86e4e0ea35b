// ─── Primitive Kinds ────────────────────────────────────────────────────────

/// The closed set of primitive field kinds.
///
/// Each kind knows its unboxed spelling, the name of the builtin class its
/// values box into, whether it is numeric, and how many bytes of primitive
/// storage it occupies. `Unit` is carried for completeness; unit fields own
/// no storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Bool,
    Char,
    Unit,
}

impl PrimitiveKind {
    /// Every kind, in declaration order. Stable: `ALL[k.index()] == k`.
    pub const ALL: [PrimitiveKind; 9] = [
        PrimitiveKind::I8,
        PrimitiveKind::I16,
        PrimitiveKind::I32,
        PrimitiveKind::I64,
        PrimitiveKind::F32,
        PrimitiveKind::F64,
        PrimitiveKind::Bool,
        PrimitiveKind::Char,
        PrimitiveKind::Unit,
    ];

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// The unboxed type name, as written in field declarations.
    pub const fn unboxed_name(self) -> &'static str {
        match self {
            PrimitiveKind::I8 => "i8",
            PrimitiveKind::I16 => "i16",
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::I64 => "i64",
            PrimitiveKind::F32 => "f32",
            PrimitiveKind::F64 => "f64",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Unit => "unit",
        }
    }

    /// Name of the builtin reference class this kind boxes into.
    pub const fn boxed_name(self) -> &'static str {
        match self {
            PrimitiveKind::I8 => "Int8",
            PrimitiveKind::I16 => "Int16",
            PrimitiveKind::I32 => "Int32",
            PrimitiveKind::I64 => "Int64",
            PrimitiveKind::F32 => "Float32",
            PrimitiveKind::F64 => "Float64",
            PrimitiveKind::Bool => "Boolean",
            PrimitiveKind::Char => "Character",
            PrimitiveKind::Unit => "Unit",
        }
    }

    /// Whether values of this kind are numbers (boxed class extends `Number`).
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            PrimitiveKind::I8
                | PrimitiveKind::I16
                | PrimitiveKind::I32
                | PrimitiveKind::I64
                | PrimitiveKind::F32
                | PrimitiveKind::F64
        )
    }

    /// Bytes of primitive storage one field of this kind occupies.
    pub(crate) const fn size(self) -> usize {
        match self {
            PrimitiveKind::I8 | PrimitiveKind::Bool => 1,
            PrimitiveKind::I16 => 2,
            PrimitiveKind::I32 | PrimitiveKind::F32 | PrimitiveKind::Char => 4,
            PrimitiveKind::I64 | PrimitiveKind::F64 => 8,
            PrimitiveKind::Unit => 0,
        }
    }

    /// Storage alignment. Zero-size kinds align to 1.
    pub(crate) const fn align(self) -> usize {
        match self {
            PrimitiveKind::Unit => 1,
            other => other.size(),
        }
    }
}

// ─── Lookups ────────────────────────────────────────────────────────────────
//
// Both directions dispatch on the first byte of the name, then confirm with
// an exact match. Total functions: a non-primitive name is `None`, never an
// error.

/// Look a kind up by its unboxed type name.
#[inline]
pub fn kind_of_unboxed(name: &str) -> Option<PrimitiveKind> {
    match name.as_bytes().first()? {
        b'i' => match name {
            "i8" => Some(PrimitiveKind::I8),
            "i16" => Some(PrimitiveKind::I16),
            "i32" => Some(PrimitiveKind::I32),
            "i64" => Some(PrimitiveKind::I64),
            _ => None,
        },
        b'f' => match name {
            "f32" => Some(PrimitiveKind::F32),
            "f64" => Some(PrimitiveKind::F64),
            _ => None,
        },
        b'b' if name == "bool" => Some(PrimitiveKind::Bool),
        b'c' if name == "char" => Some(PrimitiveKind::Char),
        b'u' if name == "unit" => Some(PrimitiveKind::Unit),
        _ => None,
    }
}

/// Look a kind up by the name of its boxed class.
#[inline]
pub fn kind_of_boxed(name: &str) -> Option<PrimitiveKind> {
    match name.as_bytes().first()? {
        b'I' => match name {
            "Int8" => Some(PrimitiveKind::I8),
            "Int16" => Some(PrimitiveKind::I16),
            "Int32" => Some(PrimitiveKind::I32),
            "Int64" => Some(PrimitiveKind::I64),
            _ => None,
        },
        b'F' => match name {
            "Float32" => Some(PrimitiveKind::F32),
            "Float64" => Some(PrimitiveKind::F64),
            _ => None,
        },
        b'B' if name == "Boolean" => Some(PrimitiveKind::Bool),
        b'C' if name == "Character" => Some(PrimitiveKind::Char),
        b'U' if name == "Unit" => Some(PrimitiveKind::Unit),
        _ => None,
    }
}
