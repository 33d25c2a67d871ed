pub mod grid;
pub mod protocol;
pub mod snake;

pub use grid::{Direction, Point};
pub use protocol::Packet;
pub use snake::Snake;

pub const BOARD_WIDTH: i32 = 80;
pub const BOARD_HEIGHT: i32 = 60;
pub const SAFE_BORDER_PERCENT: i32 = 20;
pub const DEFAULT_MAX_LENGTH: usize = 10;
pub const DEFAULT_TICK_RATE: u32 = 5;
