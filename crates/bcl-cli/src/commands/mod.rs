pub mod common;
pub mod pool;
pub mod quote;
pub mod verify;
