pub mod attendance;
pub mod role;
pub mod schedule;
pub mod user;
