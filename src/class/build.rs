use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock, Weak};

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use xxhash_rust::xxh64::xxh64;

use crate::class::schema::{Class, FieldRecord, FieldType, MOD_PUBLIC, MOD_STATIC};
use crate::class::storage::FieldStorage;
use crate::error::FieldError;

/// Hard cap on declared fields per class.
pub const MAX_FIELDS: usize = 32;

// ─── Class Builder ──────────────────────────────────────────────────────────

/// Registers a class: name, visibility, superclass, declared fields.
///
/// Offsets are assigned at `build` time: primitives get packed, aligned
/// byte offsets (instance and static layouts kept separate), reference
/// fields get sequential slot indices. The field list is then sorted by
/// name hash for lookup.
pub struct ClassBuilder {
    name: SmolStr,
    modifiers: u8,
    superclass: Option<Arc<Class>>,
    fields: Vec<FieldSpec>,
}

struct FieldSpec {
    name: SmolStr,
    ty: FieldType,
    modifiers: u8,
}

impl ClassBuilder {
    /// Start a public class.
    pub fn new(name: &str) -> Self {
        Self {
            name: SmolStr::from(name),
            modifiers: MOD_PUBLIC,
            superclass: None,
            fields: Vec::new(),
        }
    }

    /// Drop the class's public visibility.
    pub fn non_public(mut self) -> Self {
        self.modifiers &= !MOD_PUBLIC;
        self
    }

    pub fn superclass(mut self, superclass: &Arc<Class>) -> Self {
        self.superclass = Some(superclass.clone());
        self
    }

    /// Declare a field. `modifiers` is a combination of the `MOD_*` bits.
    pub fn field(mut self, name: &str, ty: FieldType, modifiers: u8) -> Self {
        self.fields.push(FieldSpec {
            name: SmolStr::from(name),
            ty,
            modifiers,
        });
        self
    }

    pub fn build(self) -> Result<Arc<Class>, FieldError> {
        if self.fields.len() > MAX_FIELDS {
            return Err(FieldError::TooManyFields);
        }
        let mut seen: FxHashSet<SmolStr> = FxHashSet::default();
        for spec in &self.fields {
            if !seen.insert(spec.name.clone()) {
                return Err(FieldError::FieldExists(spec.name.clone()));
            }
        }

        // Instance layout extends the superclass's, so a handle bound to an
        // inherited field indexes correctly into a subclass instance.
        let mut instance = match &self.superclass {
            Some(sup) => LayoutCursor {
                prim_len: sup.prim_len,
                ref_len: sup.ref_len,
            },
            None => LayoutCursor::default(),
        };
        let mut statics = LayoutCursor::default();
        let offsets: Vec<usize> = self
            .fields
            .iter()
            .map(|spec| {
                let cursor = if spec.modifiers & MOD_STATIC != 0 {
                    &mut statics
                } else {
                    &mut instance
                };
                cursor.place(&spec.ty)
            })
            .collect();

        let class = Arc::new_cyclic(|weak: &Weak<Class>| {
            let mut records: Vec<Arc<FieldRecord>> = self
                .fields
                .into_iter()
                .zip(offsets)
                .map(|(spec, offset)| {
                    Arc::new(FieldRecord {
                        declaring: weak.clone(),
                        name_hash: xxh64(spec.name.as_bytes(), 0),
                        name: spec.name,
                        ty: spec.ty,
                        modifiers: spec.modifiers,
                        offset,
                        root: None,
                        accessible: AtomicBool::new(false),
                    })
                })
                .collect();
            records.sort_by_key(|r| r.name_hash);
            Class {
                name: self.name,
                modifiers: self.modifiers,
                superclass: self.superclass,
                fields: records.into_boxed_slice(),
                prim_len: instance.prim_len,
                ref_len: instance.ref_len,
                statics: RwLock::new(FieldStorage::with_layout(
                    statics.prim_len,
                    statics.ref_len,
                )),
            }
        });
        Ok(class)
    }
}

/// Internal constructor for the builtin classes, which declare no fields.
pub(crate) fn builtin_class(name: &'static str, superclass: Option<&Arc<Class>>) -> Arc<Class> {
    Arc::new(Class {
        name: SmolStr::new_static(name),
        modifiers: MOD_PUBLIC,
        superclass: superclass.cloned(),
        fields: Box::new([]),
        prim_len: 0,
        ref_len: 0,
        statics: RwLock::new(FieldStorage::default()),
    })
}

// ─── Layout ─────────────────────────────────────────────────────────────────

#[derive(Default)]
struct LayoutCursor {
    prim_len: usize,
    ref_len: usize,
}

impl LayoutCursor {
    fn place(&mut self, ty: &FieldType) -> usize {
        match ty {
            FieldType::Prim(kind) => {
                let align = kind.align();
                let offset = self.prim_len.next_multiple_of(align);
                self.prim_len = offset + kind.size();
                offset
            }
            FieldType::Ref(_) => {
                let slot = self.ref_len;
                self.ref_len += 1;
                slot
            }
        }
    }
}
