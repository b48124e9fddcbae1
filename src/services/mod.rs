pub mod blog_service;
pub mod category_service;
pub mod lifecycle_service;
pub mod posting_service;
pub mod seo_service;
pub mod sitemap_service;
pub mod slug_service;
pub mod sweep_service;
