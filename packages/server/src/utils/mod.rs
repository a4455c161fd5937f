pub mod hash;
pub mod jwt;
pub mod publication;
pub mod ranking;
pub mod rate_limit;
pub mod result;
pub mod student;
