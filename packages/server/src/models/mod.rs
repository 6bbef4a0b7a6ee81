pub mod auth;
pub mod category;
pub mod course;
pub mod dashboard;
pub mod lesson;
pub mod shared;
