pub mod admin;
pub mod uploads;
