//! Medicine bandits: patients of four gender and age categories are treated
//! one at a time with one of several medicines whose survival probabilities
//! are unknown to the player. The player's choices are compared with a
//! greedy and an epsilon-greedy baseline treating the same patients.

pub mod batch_runner;
pub mod config;
pub mod constants;
pub mod environments;
pub mod policies;
pub mod random_source;
pub mod session;
pub mod statistics_calculator;
