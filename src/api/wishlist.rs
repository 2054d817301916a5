use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::api::UserId;
use crate::error::ShopError;
use crate::services::WishlistService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistRequest {
    pub product_id: i64,
}

pub async fn add(
    user: UserId,
    body: web::Json<WishlistRequest>,
    service: web::Data<WishlistService>,
) -> Result<HttpResponse, ShopError> {
    let (entry, count) = service.add(user.0, body.product_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Product added to wishlist",
        "wishlistItemId": entry.id,
        "wishlistCount": count,
    })))
}

pub async fn remove(
    user: UserId,
    path: web::Path<i64>,
    service: web::Data<WishlistService>,
) -> Result<HttpResponse, ShopError> {
    let count = service.remove(user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Product removed from wishlist",
        "wishlistCount": count,
    })))
}

pub async fn list(
    user: UserId,
    service: web::Data<WishlistService>,
) -> Result<HttpResponse, ShopError> {
    let items = service.list(user.0).await?;
    let total = items.len();
    Ok(HttpResponse::Ok().json(json!({
        "wishlistItems": items,
        "totalItems": total,
    })))
}

pub async fn check(
    user: UserId,
    path: web::Path<i64>,
    service: web::Data<WishlistService>,
) -> Result<HttpResponse, ShopError> {
    let present = service.contains(user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "isInWishlist": present })))
}

pub async fn count(
    user: UserId,
    service: web::Data<WishlistService>,
) -> Result<HttpResponse, ShopError> {
    let count = service.count(user.0).await?;
    Ok(HttpResponse::Ok().json(json!({ "count": count })))
}

pub async fn clear(
    user: UserId,
    service: web::Data<WishlistService>,
) -> Result<HttpResponse, ShopError> {
    service.clear(user.0).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Wishlist cleared" })))
}
