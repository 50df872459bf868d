pub mod core;
pub mod exchange;
pub mod roster;
