pub mod blog_dto;
pub mod category_dto;
pub mod posting_dto;
pub mod seo_dto;
