pub mod cat;
pub mod user;

pub use cat::{Cat, CatChanges, CatOutput, NewCat, OwnerRef, OwnerSummary};
pub use user::{NewUser, User, UserChanges, UserOutput};
