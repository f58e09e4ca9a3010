pub mod r#move;
pub mod types;

pub use r#move::Move;
pub use types::{Difficulty, Side};
