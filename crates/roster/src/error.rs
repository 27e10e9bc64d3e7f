use core_types::CoreError;
use thiserror::Error;

/// Failure of a roster operation: either a business rule or the backing store.
#[derive(Error, Debug)]
pub enum RosterError<E> {
    #[error(transparent)]
    Rule(#[from] CoreError),

    #[error("Roster store failure: {0}")]
    Store(#[source] E),
}
