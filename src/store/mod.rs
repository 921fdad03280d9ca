pub mod attendance;
pub mod schedule;
pub mod user;

pub use attendance::{AttendanceStore, ClockOutcome};
pub use schedule::{NewCustomSchedule, ScheduleStore};
pub use user::{NewUser, UserStore};
