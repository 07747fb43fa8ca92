//! Thread-scoped active database used by [`StringId`](crate::bwdb::StringId)
//! and [`ResourceId`](crate::bwdb::ResourceId) to print themselves
//!
//! At most one database is active per thread. Activation hands back a guard;
//! dropping the guard deactivates the database again.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use tracing::debug;

use crate::bwdb::PrototypeDatabase;
use crate::error::{Error, Result};

thread_local! {
    static ACTIVE: RefCell<Option<Arc<PrototypeDatabase>>> = const { RefCell::new(None) };
}

/// Guard keeping a database active on the current thread
#[must_use = "the database is deactivated as soon as the guard is dropped"]
pub struct ActiveDatabase {
    db: Arc<PrototypeDatabase>,
    // The registration is thread-local, so the guard must stay on this thread.
    _not_send: PhantomData<*const ()>,
}

impl Deref for ActiveDatabase {
    type Target = PrototypeDatabase;

    fn deref(&self) -> &PrototypeDatabase {
        &self.db
    }
}

impl Drop for ActiveDatabase {
    fn drop(&mut self) {
        ACTIVE.with(|active| active.borrow_mut().take());
        debug!("prototype database deactivated");
    }
}

/// Make `db` the database handles resolve through on this thread.
///
/// Fails with [`Error::DatabaseAlreadyActive`] while another guard is alive.
pub fn activate(db: Arc<PrototypeDatabase>) -> Result<ActiveDatabase> {
    ACTIVE.with(|active| {
        let mut active = active.borrow_mut();
        if active.is_some() {
            return Err(Error::DatabaseAlreadyActive);
        }
        *active = Some(Arc::clone(&db));
        Ok(())
    })?;
    debug!("prototype database activated");
    Ok(ActiveDatabase {
        db,
        _not_send: PhantomData,
    })
}

pub fn is_active() -> bool {
    ACTIVE.with(|active| active.borrow().is_some())
}

/// Run `f` with the active database, if any
pub fn with_active<R>(f: impl FnOnce(Option<&PrototypeDatabase>) -> R) -> R {
    let db = ACTIVE.with(|active| active.borrow().clone());
    f(db.as_deref())
}
