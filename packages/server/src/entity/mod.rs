pub mod admin;
pub mod course;
pub mod exam_result;
pub mod help_query;
pub mod student;
