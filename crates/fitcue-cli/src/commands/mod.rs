pub mod config;
pub mod hiit;
pub mod workout;

mod terminal;
