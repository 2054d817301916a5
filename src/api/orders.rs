use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::ShopError;
use crate::services::OrderService;

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub method: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

pub async fn history(
    path: web::Path<i64>,
    service: web::Data<OrderService>,
) -> Result<HttpResponse, ShopError> {
    let orders = service.history(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(orders))
}

/// The body is optional; checkout without one records an "Unknown" payment
/// method.
pub async fn checkout(
    path: web::Path<i64>,
    body: Option<web::Json<PaymentRequest>>,
    service: web::Data<OrderService>,
) -> Result<HttpResponse, ShopError> {
    let method = body.and_then(|request| request.into_inner().method);
    let receipt = service.checkout(path.into_inner(), method).await?;
    Ok(HttpResponse::Ok().json(receipt))
}

pub async fn admin(service: web::Data<OrderService>) -> Result<HttpResponse, ShopError> {
    let orders = service.admin_list().await?;
    Ok(HttpResponse::Ok().json(orders))
}

pub async fn update_status(
    path: web::Path<i64>,
    body: web::Json<StatusUpdateRequest>,
    service: web::Data<OrderService>,
) -> Result<HttpResponse, ShopError> {
    service.update_status(path.into_inner(), &body.status).await?;
    Ok(HttpResponse::Ok().finish())
}
