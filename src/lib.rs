pub mod engine;
pub mod export;
pub mod persist;
pub mod remote;
pub mod state;
pub mod toss;
