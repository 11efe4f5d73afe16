pub mod profile_service;
pub mod request_service;
pub mod storage_service;
pub mod user_service;
