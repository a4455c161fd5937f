pub mod auth;
pub mod course;
pub mod help_query;
pub mod publication;
pub mod report;
pub mod result;
pub mod shared;
pub mod student;
