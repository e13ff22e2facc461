// handlers/elevated/mod.rs - Elevated handlers (admin role required)
//
// Each handler checks the role explicitly and answers 403 "Admin only"
// before touching the store.

pub mod cats; // PUT|DELETE /cats/admin/:id
pub mod users; // PUT|DELETE /users/:id
