pub mod bootstrap;
pub mod commands;
pub mod events;
pub mod leaderboard;
pub mod recorder;
pub mod timer;
pub mod wheel;
