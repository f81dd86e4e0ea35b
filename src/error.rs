// ─── Error ──────────────────────────────────────────────────────────────────
use smol_str::SmolStr;
use thiserror::Error;

/// Everything that can go wrong while building classes, resolving fields,
/// or driving a [`FieldHandle`](crate::handle::FieldHandle).
///
/// None of these are retried anywhere: each variant is either a usage
/// mistake the caller can fix, or an environment inconsistency worth
/// surfacing loudly.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("permission denied: {0}")]
    PermissionDenied(&'static str),
    #[error("no field named `{name}` in `{class}`")]
    NoSuchField { class: SmolStr, name: SmolStr },
    #[error("no field of type `{ty}` in `{class}`")]
    NotFound { class: SmolStr, ty: SmolStr },
    #[error("multiple fields of type `{ty}` in `{class}`: [{matches}]")]
    AmbiguousMatch {
        class: SmolStr,
        ty: SmolStr,
        matches: String,
    },
    /// Operation shape doesn't match the field (e.g. `get_i32` on a
    /// reference field, or an instance getter on a static field).
    #[error("{0}")]
    WrongFieldKind(&'static str),
    #[error("type mismatch: expected `{expected}`, got `{actual}`")]
    TypeMismatch { expected: SmolStr, actual: SmolStr },
    #[error("null instance")]
    NullInstance,
    #[error("field `{0}` is final")]
    FinalFieldReadOnly(SmolStr),
    #[error("invalid field offset")]
    InvalidOffset,
    #[error("field `{0}` isn't accessible")]
    InaccessibleField(SmolStr),
    #[error("unable to clone field `{0}`: not found in its declaring class")]
    CloneUnsupported(SmolStr),
    /// Low-level access failure that should not occur once a descriptor
    /// has been validated. Indicates a strategy has desynchronized from
    /// the actual class layout.
    #[error("unexpected access error: {0}")]
    InternalAccess(String),
    #[error("class exceeds the 32-field limit")]
    TooManyFields,
    #[error("field `{0}` already declared")]
    FieldExists(SmolStr),
}
