#![allow(clippy::missing_safety_doc)]
//! C-linkage surface over one process-wide [`Registry`].
//!
//! Every function reports failure through its return value. A null or
//! non-UTF-8 name is rejected without touching any poset. The registry is
//! built on first use from [`RegistryConfig::from_env`], with handles capped
//! to what fits in a C `unsigned long`.

use std::ffi::{c_char, c_ulong, CStr};

use parking_lot::{const_mutex, Mutex};
use tracing::{error, warn};

use crate::config::RegistryConfig;
use crate::error::PosetError;
use crate::id::PosetHandle;
use crate::registry::Registry;

/// One lock over the whole registry: every call, whatever poset it
/// addresses, runs alone.
static REGISTRY: Mutex<Option<Registry>> = const_mutex(None);

fn with_registry<R>(op: impl FnOnce(&mut Registry) -> R) -> R {
    let mut guard = REGISTRY.lock();
    let registry = guard.get_or_insert_with(|| {
        let mut config = RegistryConfig::from_env().unwrap_or_else(|err| {
            warn!("{err:#}; using default registry config");
            RegistryConfig::default()
        });
        config.max_handle = config.max_handle.min(u64::from(c_ulong::MAX));
        Registry::with_config(&config)
    });
    op(registry)
}

fn handle(id: c_ulong) -> PosetHandle {
    PosetHandle(u64::from(id))
}

unsafe fn name<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

/// Maps an outcome to the boolean surface. A broken invariant is not a
/// rejection and ends the process.
fn settle(result: Result<(), PosetError>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) if err.is_rejection() => false,
        Err(err) => {
            error!("{err}");
            std::process::abort()
        }
    }
}

#[no_mangle]
pub extern "C" fn poset_new() -> c_ulong {
    // Handles are drawn no higher than c_ulong::MAX.
    with_registry(|reg| reg.create().0 as c_ulong)
}

#[no_mangle]
pub extern "C" fn poset_delete(id: c_ulong) -> bool {
    settle(with_registry(|reg| reg.destroy(handle(id))))
}

#[no_mangle]
pub extern "C" fn poset_size(id: c_ulong) -> usize {
    with_registry(|reg| reg.size(handle(id)))
}

#[no_mangle]
pub unsafe extern "C" fn poset_insert(id: c_ulong, value: *const c_char) -> bool {
    let Some(value) = name(value) else {
        return settle(Err(PosetError::InvalidName));
    };
    settle(with_registry(|reg| reg.insert(handle(id), value)))
}

#[no_mangle]
pub unsafe extern "C" fn poset_remove(id: c_ulong, value: *const c_char) -> bool {
    let Some(value) = name(value) else {
        return settle(Err(PosetError::InvalidName));
    };
    settle(with_registry(|reg| reg.remove(handle(id), value)))
}

#[no_mangle]
pub unsafe extern "C" fn poset_add(
    id: c_ulong,
    value1: *const c_char,
    value2: *const c_char,
) -> bool {
    let (Some(lesser), Some(greater)) = (name(value1), name(value2)) else {
        return settle(Err(PosetError::InvalidName));
    };
    settle(with_registry(|reg| reg.add(handle(id), lesser, greater)))
}

#[no_mangle]
pub unsafe extern "C" fn poset_del(
    id: c_ulong,
    value1: *const c_char,
    value2: *const c_char,
) -> bool {
    let (Some(lesser), Some(greater)) = (name(value1), name(value2)) else {
        return settle(Err(PosetError::InvalidName));
    };
    settle(with_registry(|reg| reg.del(handle(id), lesser, greater)))
}

#[no_mangle]
pub unsafe extern "C" fn poset_test(
    id: c_ulong,
    value1: *const c_char,
    value2: *const c_char,
) -> bool {
    let (Some(lesser), Some(greater)) = (name(value1), name(value2)) else {
        return false;
    };
    with_registry(|reg| reg.test(handle(id), lesser, greater))
}

/// Empties the poset. Unknown handles are ignored.
#[no_mangle]
pub extern "C" fn poset_clear(id: c_ulong) {
    settle(with_registry(|reg| reg.clear(handle(id))));
}
