use axum::response::Response;

use crate::social::server::response::reply;

pub async fn health_handler() -> Response {
    reply("ok")
}
