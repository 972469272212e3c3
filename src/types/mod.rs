pub mod generated;
pub mod station;
pub mod year;
