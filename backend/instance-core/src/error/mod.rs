pub mod channel;
pub mod config;
pub mod dispatch;
pub mod gate;
pub mod server;
pub mod window;
