mod client;
mod lifecycle;
mod server;
