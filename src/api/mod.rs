use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::domain::order::{OrderCommandHandler, OrderQueryHandler};

mod orders;
mod responses;

pub use responses::{ApiResponse, AuthRequired};

// ============================================================================
// HTTP Surface
// ============================================================================
//
// Thin mapping from routes to workflow inputs. All business rules live in
// the domain layer; handlers only translate between HTTP and commands.
//
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub commands: Arc<OrderCommandHandler>,
    pub queries: Arc<OrderQueryHandler>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health))
            .service(
                web::scope("/orders")
                    .route("/{order_id}/cancel", web::post().to(orders::cancel_order))
                    .route(
                        "/{order_id}/status",
                        web::post().to(orders::update_order_status),
                    )
                    .route(
                        "/{order_id}/status",
                        web::get().to(orders::get_order_status),
                    ),
            ),
    );
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
