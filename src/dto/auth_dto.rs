use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ValidateUserRequest {
    #[serde(rename = "initData", alias = "init_data", default)]
    pub init_data: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidateUserResponse {
    pub success: bool,
}
