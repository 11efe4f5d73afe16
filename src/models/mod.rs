pub mod dealer_request;
pub mod telegram_user;
pub mod user_settings;
