//! Typed field handles over a dynamic class model.
//!
//! Classes are built at runtime from named, typed field declarations;
//! instances pack their primitives into a byte block and their references
//! into a slot table. A [`FieldHandle`] binds to one field and reads or
//! writes it either reflectively (re-resolving and validating on every
//! call) or, when the raw facility is available, through a precomputed
//! offset with no per-call checks.
//!
//! ```
//! use fastfield::{ClassBuilder, FieldHandle, FieldType, MOD_PUBLIC, PrimitiveKind, Value};
//!
//! # fn main() -> Result<(), fastfield::FieldError> {
//! let point = ClassBuilder::new("Point")
//!     .field("x", FieldType::Prim(PrimitiveKind::I32), MOD_PUBLIC)
//!     .field("y", FieldType::Prim(PrimitiveKind::I32), MOD_PUBLIC)
//!     .build()?;
//! let origin = point.instantiate(&[("x", Value::I32(3))])?;
//!
//! let x = FieldHandle::create(&point, "x")?;
//! assert_eq!(x.get_i32(&origin)?, 3);
//! x.put_i32(&origin, 5)?;
//! assert_eq!(x.get_boxed(&origin)?, Value::I32(5));
//! # Ok(())
//! # }
//! ```

pub mod capability;
pub mod class;
pub mod error;
pub mod handle;
pub mod primitive;
pub mod value;

pub use capability::{Policy, acquire_raw, install_policy};
pub use class::{
    Class, ClassBuilder, FieldRecord, FieldType, MAX_FIELDS, MOD_FINAL, MOD_PUBLIC, MOD_STATIC,
    ObjRef, builtins, clone_field, is_leniently_assignable,
};
pub use error::FieldError;
pub use handle::FieldHandle;
pub use primitive::{PrimitiveKind, kind_of_boxed, kind_of_unboxed};
pub use value::Value;
