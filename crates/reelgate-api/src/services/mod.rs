pub mod discord;
pub mod email;
pub mod notify;
pub mod plex;
pub mod review;
