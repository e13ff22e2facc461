// handlers/mod.rs - Three handler tiers
//
// Public (no auth) → Protected (bearer token) → Elevated (bearer token + admin role)

pub mod payloads;

pub mod elevated; // Admin-only account and cat management
pub mod protected; // Caller-scoped operations
pub mod public; // Reads, registration and login
