pub mod exam;
pub mod grading;

pub use exam::{ExamType, Gender, QueryStatus, ResultOutcome, SubjectStatus};
pub use grading::{Aggregate, CourseLink, GradingError, SubjectInput, SubjectLine};
