pub mod content;
pub mod delivery;
pub mod pipeline;
pub mod shared;
