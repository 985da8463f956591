pub mod comment;
pub mod feed;
