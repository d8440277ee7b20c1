pub mod chess;
pub mod tournament;
pub mod user;

pub use chess::{FinishOutcome, GameDetails, GameSummary, MoveRecord, NewGame, NewMove, PlayerRecord};
pub use tournament::{NewTournament, PublicTournament, TournamentQuery, TournamentRecord};
pub use user::{AdminUserView, NewUser, UserProfile, UserRecord};
