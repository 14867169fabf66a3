//! SQLite-vec extension initialization

use rusqlite::ffi::sqlite3_auto_extension;
use sqlite_vec::sqlite3_vec_init;
use std::sync::Once;

static INIT: Once = Once::new();

/// Register sqlite-vec for every connection opened afterwards.
///
/// Must run before the first connection is opened. Idempotent.
#[allow(clippy::missing_transmute_annotations)]
pub fn init_sqlite_vec() {
    INIT.call_once(|| {
        // SAFETY: `sqlite3_vec_init` has the entry-point signature sqlite expects for
        // auto extensions; the transmute only erases the concrete fn pointer type.
        unsafe {
            sqlite3_auto_extension(Some(std::mem::transmute(sqlite3_vec_init as *const ())));
        }
        tracing::debug!("sqlite-vec extension registered");
    });
}
