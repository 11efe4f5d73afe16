use crate::dto::request_dto::{CreateRequestPayload, RequestListQuery, UpdateRequestPayload};
use crate::error::{Error, Result};
use crate::models::dealer_request::DealerRequest;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

const REQUEST_COLUMNS: &str =
    "id, user_id, title, description, status, priority, attachments, created_at, updated_at";

#[derive(Clone)]
pub struct RequestService {
    pool: PgPool,
}

impl RequestService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, owner: Uuid, payload: CreateRequestPayload) -> Result<DealerRequest> {
        let query = format!(
            r#"
            INSERT INTO dealer_requests (user_id, title, description, status, priority, attachments)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        );

        let request = sqlx::query_as::<_, DealerRequest>(&query)
            .bind(owner)
            .bind(payload.title.trim())
            .bind(payload.description)
            .bind(payload.status.as_str())
            .bind(payload.priority.as_str())
            .bind(Json(payload.attachments))
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(request_id = %request.id, "dealer request created");
        Ok(request)
    }

    /// Newest first, optionally filtered by status and priority.
    pub async fn list(&self, owner: Uuid, query: RequestListQuery) -> Result<Vec<DealerRequest>> {
        let mut filters = vec!["user_id = $1".to_string()];
        let mut args: Vec<&'static str> = Vec::new();

        if let Some(status) = query.status {
            filters.push(format!("status = ${}", args.len() + 2));
            args.push(status.as_str());
        }
        if let Some(priority) = query.priority {
            filters.push(format!("priority = ${}", args.len() + 2));
            args.push(priority.as_str());
        }

        let items_query = format!(
            "SELECT {} FROM dealer_requests WHERE {} ORDER BY created_at DESC",
            REQUEST_COLUMNS,
            filters.join(" AND ")
        );

        let mut statement = sqlx::query_as::<_, DealerRequest>(&items_query).bind(owner);
        for value in args {
            statement = statement.bind(value);
        }
        let items = statement.fetch_all(&self.pool).await?;
        Ok(items)
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> Result<DealerRequest> {
        let query = format!(
            "SELECT {} FROM dealer_requests WHERE id = $1 AND user_id = $2",
            REQUEST_COLUMNS
        );
        sqlx::query_as::<_, DealerRequest>(&query)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Request not found".to_string()))
    }

    pub async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        payload: UpdateRequestPayload,
    ) -> Result<DealerRequest> {
        let query = format!(
            r#"
            UPDATE dealer_requests
            SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                priority = COALESCE($6, priority),
                attachments = COALESCE($7, attachments),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        );

        sqlx::query_as::<_, DealerRequest>(&query)
            .bind(id)
            .bind(owner)
            .bind(payload.title.as_deref().map(str::trim))
            .bind(payload.description)
            .bind(payload.status.map(|s| s.as_str()))
            .bind(payload.priority.map(|p| p.as_str()))
            .bind(payload.attachments.map(Json))
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Request not found".to_string()))
    }

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<()> {
        let res = sqlx::query("DELETE FROM dealer_requests WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Request not found".to_string()));
        }
        tracing::info!(request_id = %id, "dealer request deleted");
        Ok(())
    }
}
