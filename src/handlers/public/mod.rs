// handlers/public/mod.rs - Public handlers (no authentication)
//
// Service info, login, registration and every read endpoint.

pub mod auth; // POST /auth/login
pub mod cats; // GET /cats, /cats/area, /cats/:id
pub mod system; // GET /, /health
pub mod users; // GET /users, /users/:id, POST /users
