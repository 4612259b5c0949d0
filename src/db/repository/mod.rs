pub mod notification;
pub mod patient;
pub mod plan;
pub mod rating;
pub mod report;
pub mod session;
pub mod staff;
pub mod user;
