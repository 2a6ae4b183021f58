mod activator;
mod fakes;
mod flags;
mod guard;
