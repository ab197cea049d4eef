mod config;
mod input;
mod motion;

pub use config::MotionConfig;
pub use input::DirectionKeys;
pub use motion::LocalPlayer;
