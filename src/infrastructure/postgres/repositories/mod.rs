pub mod credentials;
pub mod play_history;
pub mod queue;
pub mod rejections;
pub mod revenue;
pub mod venues;
