pub mod auth;
pub mod health;
pub mod profile;
pub mod requests;
pub mod uploads;
pub mod users;
