pub mod admin;
pub mod health;
pub mod review;
pub mod uploads;
