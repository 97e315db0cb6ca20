pub mod events;
pub mod issues;
pub mod report;
pub mod sprints;
pub mod token;
pub mod users;
pub mod utils;
