pub mod duration;
pub mod leaderboard;
pub mod models;
pub mod roster;
pub mod timer;
