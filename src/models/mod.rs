pub mod meeting;
pub mod project;
pub mod recording;
