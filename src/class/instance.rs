use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use xxhash_rust::xxh64::xxh64;

use crate::class::builtins;
use crate::class::schema::{Class, FieldType};
use crate::class::storage::FieldStorage;
use crate::error::FieldError;
use crate::value::Value;

// ─── Instance ───────────────────────────────────────────────────────────────

/// Heap state of one object: its class plus field storage laid out per the
/// class's offsets.
#[derive(Debug)]
pub struct Instance {
    pub(crate) class: Arc<Class>,
    pub(crate) fields: RwLock<FieldStorage>,
}

impl Instance {
    #[inline]
    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    pub(crate) fn read_fields(&self) -> RwLockReadGuard<'_, FieldStorage> {
        self.fields.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write_fields(&self) -> RwLockWriteGuard<'_, FieldStorage> {
        self.fields.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// ─── Object Reference ───────────────────────────────────────────────────────

/// A nullable, shared reference to an [`Instance`].
///
/// References are cheap to clone and compare by object identity. The null
/// reference carries no class; instance-scoped field operations reject it
/// with `NullInstance` before touching storage.
#[derive(Debug, Clone, Default)]
pub struct ObjRef(Option<Arc<Instance>>);

impl ObjRef {
    #[inline]
    pub fn null() -> Self {
        ObjRef(None)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    pub fn class(&self) -> Option<&Arc<Class>> {
        self.0.as_deref().map(Instance::class)
    }

    #[inline]
    pub(crate) fn instance(&self) -> Option<&Arc<Instance>> {
        self.0.as_ref()
    }

    pub fn ptr_eq(&self, other: &ObjRef) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl PartialEq for ObjRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

// ─── Construction ───────────────────────────────────────────────────────────

impl Class {
    /// Allocate an instance with zeroed primitives and null references.
    pub fn new_instance(self: &Arc<Self>) -> ObjRef {
        ObjRef(Some(Arc::new(Instance {
            class: self.clone(),
            fields: RwLock::new(FieldStorage::with_layout(self.prim_len, self.ref_len)),
        })))
    }

    /// Allocate an instance with the named fields initialized.
    ///
    /// This is the constructor stand-in: it writes final fields too, since
    /// nothing can observe the instance before it is returned. Values must
    /// match each field's declared type exactly (primitives) or be
    /// assignable to it (references).
    pub fn instantiate(self: &Arc<Self>, inits: &[(&str, Value)]) -> Result<ObjRef, FieldError> {
        let mut storage = FieldStorage::with_layout(self.prim_len, self.ref_len);
        for (name, value) in inits {
            let record = self
                .find_field(xxh64(name.as_bytes(), 0))
                .ok_or_else(|| FieldError::NoSuchField {
                    class: self.name.clone(),
                    name: (*name).into(),
                })?;
            if record.is_static() {
                return Err(FieldError::WrongFieldKind("field is static"));
            }
            match &record.ty {
                FieldType::Prim(kind) => storage.write_prim(*kind, record.offset, value)?,
                FieldType::Ref(target) => {
                    check_ref_assignable(target, value)?;
                    storage.write_ref(record.offset, value.clone())?;
                }
            }
        }
        Ok(ObjRef(Some(Arc::new(Instance {
            class: self.clone(),
            fields: RwLock::new(storage),
        }))))
    }
}

/// Check that `value` may be stored in a reference field declared as
/// `target`. Null is assignable to every reference type; primitives box
/// into their builtin classes first.
pub(crate) fn check_ref_assignable(target: &Arc<Class>, value: &Value) -> Result<(), FieldError> {
    let runtime_class: &Arc<Class> = match value {
        Value::Null => return Ok(()),
        Value::Obj(obj) => match obj.class() {
            Some(class) => class,
            None => return Ok(()),
        },
        Value::Str(_) => builtins::str_class(),
        prim => {
            // kind() is Some for every remaining variant
            let kind = prim.kind().ok_or_else(|| FieldError::InternalAccess(
                "value without runtime class".to_string(),
            ))?;
            builtins::boxed_class(kind)
        }
    };
    if target.is_assignable_from(runtime_class) {
        Ok(())
    } else {
        Err(FieldError::TypeMismatch {
            expected: target.name().clone(),
            actual: runtime_class.name().clone(),
        })
    }
}
