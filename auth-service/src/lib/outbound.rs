pub mod crypto;
pub mod events;
pub mod repositories;
