pub mod content;
pub mod delivery;
pub mod health;
pub mod submission;
