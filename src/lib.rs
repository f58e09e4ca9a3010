pub mod config;
pub mod core;
pub mod display;
pub mod error;
pub mod game;
pub mod logic;
pub mod network;
pub mod selfplay;


pub use config::SessionConfig;
pub use game::{Session, SessionView};
