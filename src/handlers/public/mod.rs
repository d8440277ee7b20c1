// handlers/public/mod.rs - Public functions (session optional or per action)
//
// Security Level: none at the function boundary. `auth` gates its admin
// actions individually; `chess-api` and `get-tournaments` are open.

pub mod auth;
pub mod chess;
pub mod tournaments;
