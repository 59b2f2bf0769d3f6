//! UUID helpers.

use uuid::Uuid;

/// Generate a new UUIDv7 (time-ordered) identifier.
///
/// Jobs and events use v7 so identifiers sort chronologically, which keeps
/// index pages warm and makes log correlation trivial.
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// True if the given UUID is version 7.
pub fn is_v7(id: &Uuid) -> bool {
    id.get_version_num() == 7
}
