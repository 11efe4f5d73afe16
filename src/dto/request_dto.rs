use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::dealer_request::{Attachment, DealerRequest, RequestPriority, RequestStatus};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRequestPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default)]
    pub priority: RequestPriority,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub attachments: Vec<Attachment>,
}

impl CreateRequestPayload {
    /// Trims the title so length rules apply to what gets stored.
    pub fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateRequestPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub status: Option<RequestStatus>,
    pub priority: Option<RequestPriority>,
    #[validate(length(max = 20))]
    pub attachments: Option<Vec<Attachment>>,
}

impl UpdateRequestPayload {
    pub fn normalize(&mut self) {
        if let Some(title) = self.title.as_mut() {
            *title = title.trim().to_string();
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestListQuery {
    pub status: Option<RequestStatus>,
    pub priority: Option<RequestPriority>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DealerRequest> for RequestResponse {
    fn from(r: DealerRequest) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            status: r.status,
            priority: r.priority,
            attachments: r.attachments.0,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestListResponse {
    pub items: Vec<RequestResponse>,
    pub total: usize,
}

impl From<Vec<DealerRequest>> for RequestListResponse {
    fn from(items: Vec<DealerRequest>) -> Self {
        let items: Vec<RequestResponse> = items.into_iter().map(RequestResponse::from).collect();
        Self {
            total: items.len(),
            items,
        }
    }
}
