mod client;
mod image;
mod models;
pub mod queries;

pub use self::{
    client::{ContentSource, SanityClient},
    image::ImageUrlBuilder,
    models::{AssetRef, Author, Comment, ImageRef, NewComment, Post, PostSlug, Reference, Slug},
};
