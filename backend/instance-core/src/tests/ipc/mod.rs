mod dispatch;
mod message;
mod server_error;
