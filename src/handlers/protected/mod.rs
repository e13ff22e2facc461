// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// The auth gate has already resolved the caller into an `AuthUser` extension.
// Cat mutations here are scoped to the caller unless the caller is an admin.

pub mod cats; // POST /cats, GET /cats/user, PUT|DELETE /cats/:id
pub mod users; // GET /users/token, PUT|DELETE /users
