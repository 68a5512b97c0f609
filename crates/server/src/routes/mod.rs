pub mod health;
pub mod play_ws;
pub mod sessions;
