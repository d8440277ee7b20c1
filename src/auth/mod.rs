pub mod gate;
pub mod password;
pub mod session;
pub mod validation;

pub use gate::{authorize, require_role, TOURNAMENT_MANAGERS, USER_ADMINISTRATORS};
pub use session::{issue_session, validate_session, IssuedSession};
