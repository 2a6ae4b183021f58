mod gate;
mod helpers;
mod ipc;
