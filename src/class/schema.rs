use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use smol_str::SmolStr;

use crate::class::builtins;
use crate::class::storage::FieldStorage;
use crate::error::FieldError;
use crate::primitive::PrimitiveKind;

// ─── Modifier Bits ──────────────────────────────────────────────────────────

pub const MOD_STATIC: u8 = 1 << 0;
pub const MOD_FINAL: u8 = 1 << 1;
pub const MOD_PUBLIC: u8 = 1 << 2;

// ─── Field Type ─────────────────────────────────────────────────────────────

/// The declared type of a field: a primitive kind, or a reference to a class.
#[derive(Debug, Clone)]
pub enum FieldType {
    Prim(PrimitiveKind),
    Ref(Arc<Class>),
}

impl FieldType {
    pub fn name(&self) -> SmolStr {
        match self {
            FieldType::Prim(kind) => SmolStr::new_static(kind.unboxed_name()),
            FieldType::Ref(class) => class.name().clone(),
        }
    }

    #[inline]
    pub fn kind(&self) -> Option<PrimitiveKind> {
        match self {
            FieldType::Prim(kind) => Some(*kind),
            FieldType::Ref(_) => None,
        }
    }

    #[inline]
    pub fn is_primitive(&self) -> bool {
        matches!(self, FieldType::Prim(_))
    }
}

impl PartialEq for FieldType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldType::Prim(a), FieldType::Prim(b)) => a == b,
            (FieldType::Ref(a), FieldType::Ref(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().as_str())
    }
}

/// Type compatibility that treats a primitive and its boxed class as
/// interchangeable before applying the ordinary subtype rule.
pub fn is_leniently_assignable(expected: &FieldType, actual: &FieldType) -> bool {
    let expected = boxed_view(expected);
    let actual = boxed_view(actual);
    expected.is_assignable_from(&actual)
}

fn boxed_view(ty: &FieldType) -> Arc<Class> {
    match ty {
        FieldType::Prim(kind) => builtins::boxed_class(*kind).clone(),
        FieldType::Ref(class) => class.clone(),
    }
}

// ─── Field Record ───────────────────────────────────────────────────────────

/// One declared field, as its class records it.
///
/// The class owns one root record per field; `Class::declared_field` hands
/// out derived views whose `root` link points back at the chain they came
/// from. The access-override flag lives per record instance, so toggling it
/// on a view (or on a clone) never leaks into any other record for the same
/// field.
#[derive(Debug)]
pub struct FieldRecord {
    pub(crate) declaring: Weak<Class>,
    pub(crate) name: SmolStr,
    pub(crate) name_hash: u64,
    pub(crate) ty: FieldType,
    pub(crate) modifiers: u8,
    /// Byte offset into primitive storage, or slot index for reference
    /// fields. `INVALID_OFFSET` when the field owns no location.
    pub(crate) offset: usize,
    /// Parent record this view derives from. `None` on class-owned roots.
    pub(crate) root: Option<Arc<FieldRecord>>,
    pub(crate) accessible: AtomicBool,
}

impl FieldRecord {
    #[inline]
    pub fn name(&self) -> &SmolStr {
        &self.name
    }

    #[inline]
    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    #[inline]
    pub fn modifiers(&self) -> u8 {
        self.modifiers
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

    /// The class that declared this field, if it is still alive.
    pub fn declaring_class(&self) -> Option<Arc<Class>> {
        self.declaring.upgrade()
    }

    /// Whether access checks are overridden on this record instance.
    #[inline]
    pub fn is_accessible(&self) -> bool {
        self.accessible.load(Ordering::Acquire)
    }

    /// Toggle the access override. Local to this record: derived views and
    /// clones each carry their own flag.
    #[inline]
    pub fn set_accessible(&self, flag: bool) {
        self.accessible.store(flag, Ordering::Release);
    }

    /// A derived view of this record with an independent access flag.
    pub(crate) fn derived(self: &Arc<Self>) -> Arc<FieldRecord> {
        Arc::new(FieldRecord {
            declaring: self.declaring.clone(),
            name: self.name.clone(),
            name_hash: self.name_hash,
            ty: self.ty.clone(),
            modifiers: self.modifiers,
            offset: self.offset,
            root: Some(self.clone()),
            accessible: AtomicBool::new(false),
        })
    }
}

/// Clone a field record with an independent access-override flag.
///
/// Copying is only valid from the root of a record's derivation chain, so
/// this walks `root` links to their end first, then confirms the root is
/// identity-present among the declaring class's own declared fields. A miss
/// there means the record no longer belongs to its class's model and the
/// clone is refused with `CloneUnsupported`.
pub fn clone_field(field: &Arc<FieldRecord>) -> Result<Arc<FieldRecord>, FieldError> {
    let mut root = field;
    while let Some(parent) = &root.root {
        root = parent;
    }
    let class = root.declaring.upgrade().ok_or_else(|| {
        FieldError::InternalAccess(format!("declaring class of `{}` was dropped", field.name))
    })?;
    if !class.fields.iter().any(|f| Arc::ptr_eq(f, root)) {
        return Err(FieldError::CloneUnsupported(field.name.clone()));
    }
    Ok(Arc::new(FieldRecord {
        declaring: root.declaring.clone(),
        name: root.name.clone(),
        name_hash: root.name_hash,
        ty: root.ty.clone(),
        modifiers: root.modifiers,
        offset: root.offset,
        root: Some(root.clone()),
        accessible: AtomicBool::new(field.is_accessible()),
    }))
}

// ─── Class ──────────────────────────────────────────────────────────────────

/// A registered class: named, typed fields plus a statics block.
///
/// Classes are immutable once built and shared via `Arc`; identity is
/// pointer identity. The declared-field list is sorted by name hash so
/// lookup can binary-search it.
#[derive(Debug)]
pub struct Class {
    pub(crate) name: SmolStr,
    pub(crate) modifiers: u8,
    pub(crate) superclass: Option<Arc<Class>>,
    /// All declared fields (static and instance), sorted by `name_hash`.
    pub(crate) fields: Box<[Arc<FieldRecord>]>,
    /// Instance layout sizes.
    pub(crate) prim_len: usize,
    pub(crate) ref_len: usize,
    pub(crate) statics: RwLock<FieldStorage>,
}

impl Class {
    #[inline]
    pub fn name(&self) -> &SmolStr {
        &self.name
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.modifiers & MOD_PUBLIC != 0
    }

    pub fn superclass(&self) -> Option<&Arc<Class>> {
        self.superclass.as_ref()
    }

    /// Ordinary subtype check: `other` is this class or a descendant.
    pub fn is_assignable_from(&self, other: &Arc<Class>) -> bool {
        let mut cur: Option<&Arc<Class>> = Some(other);
        while let Some(class) = cur {
            if std::ptr::eq(self, class.as_ref()) {
                return true;
            }
            cur = class.superclass.as_ref();
        }
        false
    }

    /// Iterate the class-owned root records of every declared field.
    pub fn declared_fields(&self) -> impl Iterator<Item = &Arc<FieldRecord>> {
        self.fields.iter()
    }

    /// Resolve a declared field by name, returning a derived view whose
    /// access flag is private to the caller.
    pub fn declared_field(&self, name: &str) -> Result<Arc<FieldRecord>, FieldError> {
        self.find_field(xxhash_rust::xxh64::xxh64(name.as_bytes(), 0))
            .map(FieldRecord::derived)
            .ok_or_else(|| FieldError::NoSuchField {
                class: self.name.clone(),
                name: name.into(),
            })
    }

    /// Find a root record by name hash: linear below five fields, binary
    /// search above.
    pub(crate) fn find_field(&self, hash: u64) -> Option<&Arc<FieldRecord>> {
        let n = self.fields.len();
        if n == 0 {
            return None;
        }
        if n <= 4 {
            return self.fields.iter().find(|f| f.name_hash == hash);
        }
        self.fields
            .binary_search_by(|f| f.name_hash.cmp(&hash))
            .ok()
            .map(|i| &self.fields[i])
    }

    // Lock accessors tolerate poisoning: storage holds no invariants a
    // panicked writer could have half-applied beyond a torn user value.

    pub(crate) fn read_statics(&self) -> RwLockReadGuard<'_, FieldStorage> {
        self.statics.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write_statics(&self) -> RwLockWriteGuard<'_, FieldStorage> {
        self.statics.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_str())
    }
}
