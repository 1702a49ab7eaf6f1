pub mod employee;
pub mod project;
pub mod session;
pub mod submitted_period;
pub mod time_entry;
pub mod user;

pub use employee::Employee;
pub use project::Project;
pub use session::Session;
pub use submitted_period::SubmittedPeriod;
pub use time_entry::{TimeEntry, TimeEntryCandidate};
pub use user::User;
