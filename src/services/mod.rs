// Private module declarations
mod cart;
mod notifications;
mod orders;
mod wishlist;

// Re-export for public API
pub use cart::CartService;
pub use notifications::NotificationService;
pub use orders::OrderService;
pub use wishlist::WishlistService;
