use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::ShopError;
use crate::services::NotificationService;

pub async fn list(
    path: web::Path<i64>,
    service: web::Data<NotificationService>,
) -> Result<HttpResponse, ShopError> {
    let notifications = service.list(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

pub async fn unread_count(
    path: web::Path<i64>,
    service: web::Data<NotificationService>,
) -> Result<HttpResponse, ShopError> {
    let count = service.unread_count(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "count": count })))
}

pub async fn mark_all_read(
    path: web::Path<i64>,
    service: web::Data<NotificationService>,
) -> Result<HttpResponse, ShopError> {
    service.mark_all_read(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn delete_all(
    path: web::Path<i64>,
    service: web::Data<NotificationService>,
) -> Result<HttpResponse, ShopError> {
    service.delete_for_customer(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn delete_one(
    path: web::Path<i64>,
    service: web::Data<NotificationService>,
) -> Result<HttpResponse, ShopError> {
    service.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
