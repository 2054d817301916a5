use actix_web::{web, HttpResponse};

use crate::error::ShopError;
use crate::models::NewCartItem;
use crate::services::CartService;

pub async fn items(
    path: web::Path<i64>,
    service: web::Data<CartService>,
) -> Result<HttpResponse, ShopError> {
    let items = service.items(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn add_item(
    path: web::Path<i64>,
    body: web::Json<NewCartItem>,
    service: web::Data<CartService>,
) -> Result<HttpResponse, ShopError> {
    let stored = service.add_item(path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(stored))
}

pub async fn remove_item(
    path: web::Path<(i64, i64)>,
    service: web::Data<CartService>,
) -> Result<HttpResponse, ShopError> {
    let (customer_id, item_id) = path.into_inner();
    service.remove_item(customer_id, item_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
