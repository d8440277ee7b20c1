// handlers/elevated/admin/mod.rs - administration functions
//
// admin-users        → USER_ADMINISTRATORS (admin)
// admin-tournaments  → TOURNAMENT_MANAGERS (admin, moderator)

pub mod tournaments;
pub mod users;
