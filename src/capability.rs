use std::sync::OnceLock;

use crate::class::storage::FieldStorage;
use crate::error::FieldError;
use crate::value::Value;

// ─── Access Policy ──────────────────────────────────────────────────────────

/// Process-wide grant of privileged operations.
///
/// Installed at most once; every later install is ignored. When no policy
/// has been installed, everything is granted (the unrestricted default).
#[derive(Debug, Clone, Copy)]
pub struct Policy {
    suppress_access_checks: bool,
}

impl Policy {
    /// Grants everything.
    pub const fn allow_all() -> Self {
        Policy {
            suppress_access_checks: true,
        }
    }

    /// Denies access-check suppression (and with it, raw access).
    pub const fn deny_privileged() -> Self {
        Policy {
            suppress_access_checks: false,
        }
    }

    pub fn check_suppress_access_checks(&self) -> Result<(), FieldError> {
        if self.suppress_access_checks {
            Ok(())
        } else {
            Err(FieldError::PermissionDenied(
                "suppress-access-checks not granted",
            ))
        }
    }
}

static POLICY: OnceLock<Policy> = OnceLock::new();

/// Install the process policy. Returns false if one was already active.
pub fn install_policy(policy: Policy) -> bool {
    POLICY.set(policy).is_ok()
}

fn active_policy() -> Policy {
    *POLICY.get_or_init(Policy::allow_all)
}

/// The single chokepoint guarding access-check bypass.
///
/// Fails with `PermissionDenied` unless the active policy grants the
/// suppress-access-checks capability. Guards both handle construction for
/// non-public fields and [`acquire_raw`].
pub fn check_suppress_access_checks() -> Result<(), FieldError> {
    active_policy().check_suppress_access_checks()
}

// ─── Raw Facility ───────────────────────────────────────────────────────────

/// Handle to unchecked field storage access.
///
/// Reads and writes through this skip the per-call field search and every
/// bounds and kind check: just a pointer offset computed once at handle
/// construction. A wrong offset reads garbage or corrupts a neighbouring
/// field, which is why every call site must have validated the instance
/// first. Keep acquired handles private; never hand one to untrusted code.
#[derive(Debug)]
pub struct RawFacility {
    _priv: (),
}

static RAW_FACILITY: OnceLock<Option<RawFacility>> = OnceLock::new();

/// The cached facility, probed exactly once per process. Setting
/// `FASTFIELD_DISABLE_RAW` before the first probe disables raw access for
/// the life of the process.
pub(crate) fn raw_facility() -> Option<&'static RawFacility> {
    RAW_FACILITY
        .get_or_init(|| {
            if std::env::var_os("FASTFIELD_DISABLE_RAW").is_some() {
                None
            } else {
                Some(RawFacility { _priv: () })
            }
        })
        .as_ref()
}

/// Acquire the raw facility, or fail with `PermissionDenied`.
///
/// Re-validates the permission on every call but never re-probes: the
/// facility itself is acquired once at first use and cached. Intended only
/// for one-time setup of privileged access paths.
pub fn acquire_raw() -> Result<&'static RawFacility, FieldError> {
    check_suppress_access_checks()?;
    raw_facility().ok_or(FieldError::PermissionDenied(
        "raw memory facility unavailable",
    ))
}

impl RawFacility {
    /// Read an i32 at a precomputed byte offset. No bounds or kind checks.
    #[inline]
    pub(crate) fn read_i32(&self, storage: &FieldStorage, offset: usize) -> i32 {
        // SAFETY: offset was computed from the class layout at handle
        // construction and points at 4 in-bounds bytes.
        unsafe { (storage.prims.as_ptr().add(offset) as *const i32).read_unaligned() }
    }

    /// Write an i32 at a precomputed byte offset. No bounds or kind checks.
    #[inline]
    pub(crate) fn write_i32(&self, storage: &mut FieldStorage, offset: usize, value: i32) {
        // SAFETY: as for read_i32; exclusive access via the caller's guard.
        unsafe { (storage.prims.as_mut_ptr().add(offset) as *mut i32).write_unaligned(value) }
    }

    /// Read a reference slot without a bounds check.
    #[inline]
    pub(crate) fn read_ref(&self, storage: &FieldStorage, slot: usize) -> Value {
        // SAFETY: slot index validated against the layout at construction.
        unsafe { storage.refs.get_unchecked(slot).clone() }
    }

    /// Write a reference slot without a bounds check.
    #[inline]
    pub(crate) fn write_ref(&self, storage: &mut FieldStorage, slot: usize, value: Value) {
        // SAFETY: as for read_ref; exclusive access via the caller's guard.
        unsafe {
            *storage.refs.get_unchecked_mut(slot) = value;
        }
    }
}
