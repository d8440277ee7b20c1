// handlers/elevated/mod.rs - Elevated functions (role-gated)
//
// Security Level: a valid session whose role is in the function's policy.
// Every request is authorized before the method is looked at, so an
// anonymous caller gets 401 even for an unsupported method.

pub mod admin;
