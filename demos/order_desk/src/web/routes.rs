// demos/order_desk/src/web/routes.rs

use actix_web::web;

use crate::state::AppState;
use crate::web::handlers::order_handlers;

async fn health_check_handler(app_state: web::Data<AppState>) -> actix_web::HttpResponse {
  let backend = if app_state.config.database_url.is_some() {
    "postgres"
  } else {
    "memory"
  };
  actix_web::HttpResponse::Ok().json(serde_json::json!({
    "status": "ok",
    "backend": backend,
    "orders": app_state.workflow.list().len(),
  }))
}

// Called from `main.rs` to configure services for the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/orders")
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("", web::post().to(order_handlers::create_order_handler))
          // Registered before "/{order_id}" so it is not taken for an id.
          .route("/counts", web::get().to(order_handlers::order_counts_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route(
            "/{order_id}/history",
            web::get().to(order_handlers::order_history_handler),
          )
          .route(
            "/{order_id}/deliver",
            web::post().to(order_handlers::deliver_order_handler),
          )
          .route(
            "/{order_id}/revision",
            web::post().to(order_handlers::request_revision_handler),
          )
          .route(
            "/{order_id}/complete",
            web::post().to(order_handlers::complete_order_handler),
          )
          .route("/{order_id}/cancel", web::post().to(order_handlers::cancel_order_handler)),
      ),
  );
}
