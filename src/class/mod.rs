pub mod build;
pub mod builtins;
mod instance;
mod schema;
pub mod storage;

pub use build::{ClassBuilder, MAX_FIELDS};
pub use instance::{Instance, ObjRef};
pub use schema::{
    Class, FieldRecord, FieldType, MOD_FINAL, MOD_PUBLIC, MOD_STATIC, clone_field,
    is_leniently_assignable,
};
pub use storage::INVALID_OFFSET;

pub(crate) use instance::check_ref_assignable;
