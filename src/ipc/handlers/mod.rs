pub mod analytics;
pub mod assignments;
pub mod core;
pub mod grades;
pub mod students;
