pub mod blog_post;
pub mod lifecycle;
pub mod posting;
