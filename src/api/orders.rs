use actix_web::{web, FromRequest, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use super::responses::{ApiResponse, AuthRequired};
use super::AppState;
use crate::domain::order::{OrderCommand, OrderError, OrderStatus};

// ============================================================================
// Order Handlers
// ============================================================================

/// Authenticated caller, identified by the external subject string.
///
/// Placeholder extractor: reads the `X-User-Id` header that the gateway in
/// front of this service injects after token validation. Resolution to an
/// internal user happens inside the workflow, not here.
#[derive(Debug)]
pub struct Requester {
    pub subject: String,
}

impl FromRequest for Requester {
    type Error = AuthRequired;
    type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let subject = req
            .headers()
            .get("X-User-Id")
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);

        match subject {
            Some(subject) => futures_util::future::ready(Ok(Requester { subject })),
            None => futures_util::future::ready(Err(AuthRequired)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CancelOrderRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
}

pub async fn cancel_order(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    payload: web::Json<CancelOrderRequest>,
    requester: Requester,
) -> Result<HttpResponse, OrderError> {
    let order_id = path.into_inner();

    let view = state
        .commands
        .handle(
            order_id,
            OrderCommand::Cancel {
                requested_by: requester.subject,
                reason: payload.into_inner().reason,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok("Order cancelled", view)))
}

pub async fn update_order_status(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse, OrderError> {
    let order_id = path.into_inner();
    let payload = payload.into_inner();

    let view = state
        .commands
        .handle(
            order_id,
            OrderCommand::UpdateStatus {
                target: payload.status,
                tracking_number: payload.tracking_number,
                carrier: payload.carrier,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok("Order status updated", view)))
}

pub async fn get_order_status(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, OrderError> {
    let view = state.queries.status(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok("Order status", view)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_requester_extractor_reads_subject_header() {
        let req = TestRequest::default()
            .insert_header(("X-User-Id", "auth0|u1"))
            .to_http_request();

        let requester = Requester::from_request(&req, &mut actix_web::dev::Payload::None)
            .await
            .unwrap();
        assert_eq!(requester.subject, "auth0|u1");
    }

    #[actix_web::test]
    async fn test_requester_extractor_rejects_missing_header() {
        let req = TestRequest::default().to_http_request();

        let result = Requester::from_request(&req, &mut actix_web::dev::Payload::None).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_update_request_accepts_snake_case_status() {
        let payload: UpdateOrderStatusRequest = serde_json::from_str(
            r#"{"status": "shipped", "tracking_number": "1Z999", "carrier": "UPS"}"#,
        )
        .unwrap();
        assert_eq!(payload.status, OrderStatus::Shipped);
        assert_eq!(payload.tracking_number.as_deref(), Some("1Z999"));
    }
}
