mod ipc;
mod outcome;
mod window;
