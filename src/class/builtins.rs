use std::sync::{Arc, OnceLock};

use crate::class::build::builtin_class;
use crate::class::schema::Class;
use crate::primitive::PrimitiveKind;

// ─── Builtin Classes ────────────────────────────────────────────────────────
//
// The fixed class hierarchy every registry shares:
//
//   Object
//   ├── Number ── Int8 Int16 Int32 Int64 Float32 Float64
//   ├── Boolean, Character, Unit
//   └── Str
//
// Built once per process and published through a OnceLock.

struct Builtins {
    object: Arc<Class>,
    number: Arc<Class>,
    str_class: Arc<Class>,
    boxed: [Arc<Class>; PrimitiveKind::ALL.len()],
}

static BUILTINS: OnceLock<Builtins> = OnceLock::new();

fn builtins() -> &'static Builtins {
    BUILTINS.get_or_init(|| {
        let object = builtin_class("Object", None);
        let number = builtin_class("Number", Some(&object));
        let str_class = builtin_class("Str", Some(&object));
        let boxed = PrimitiveKind::ALL.map(|kind| {
            let superclass = if kind.is_numeric() { &number } else { &object };
            builtin_class(kind.boxed_name(), Some(superclass))
        });
        Builtins {
            object,
            number,
            str_class,
            boxed,
        }
    })
}

/// The root of the class hierarchy.
pub fn object_class() -> &'static Arc<Class> {
    &builtins().object
}

/// Superclass of every numeric boxed class.
pub fn number_class() -> &'static Arc<Class> {
    &builtins().number
}

/// Runtime class of string values.
pub fn str_class() -> &'static Arc<Class> {
    &builtins().str_class
}

/// The builtin class a primitive kind boxes into.
pub fn boxed_class(kind: PrimitiveKind) -> &'static Arc<Class> {
    &builtins().boxed[kind.index()]
}
