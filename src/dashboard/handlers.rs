//! Request handlers. Every handler is a read through the `LedgerReader`.

use super::{errors::DashboardError, middleware::RequestId, models::*};
use crate::ledger::LedgerReader;
use axum::{extract::State, response::Html, Extension, Json};
use std::{fmt::Write, sync::Arc};

pub struct DashboardState {
    pub reader: LedgerReader,
}

impl DashboardState {
    fn snapshot(&self, request_id: &RequestId) -> Result<UsersSnapshot, DashboardError> {
        let records = self.reader.list_users().map_err(|e| {
            DashboardError::internal_error(request_id.0.clone(), format!("Failed to list users: {}", e))
        })?;
        Ok(UsersSnapshot::new(records))
    }
}

/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Running".to_string(),
    })
}

/// GET /api/users
pub async fn users_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<DashboardState>>,
) -> Result<Json<UsersSnapshot>, DashboardError> {
    state.snapshot(&request_id).map(Json)
}

/// GET /
pub async fn index_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<DashboardState>>,
) -> Result<Html<String>, DashboardError> {
    let snapshot = state.snapshot(&request_id)?;
    Ok(Html(render_users_page(&snapshot)))
}

pub fn render_users_page(snapshot: &UsersSnapshot) -> String {
    let mut page = String::from(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Coinbot users</title></head>\n<body>\n\
         <h1>Foydalanuvchilar</h1>\n",
    );

    // writing into a String cannot fail
    let _ = writeln!(
        page,
        "<p>Jami: {} foydalanuvchi, {} coin</p>",
        snapshot.total_users, snapshot.total_balance
    );
    page.push_str("<table border=\"1\">\n<tr><th>User ID</th><th>Balans</th><th>Referallar</th></tr>\n");
    for user in &snapshot.users {
        let _ = writeln!(
            page,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            user.user_id, user.balance, user.referral_count
        );
    }
    let _ = writeln!(
        page,
        "</table>\n<p><small>{}</small></p>\n</body>\n</html>",
        snapshot.generated_at.to_rfc3339()
    );

    page
}
