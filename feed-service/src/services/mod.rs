/// Business logic layer
pub mod comments;
pub mod feed;
pub mod posts;

pub use comments::CommentService;
pub use feed::FeedService;
pub use posts::PostService;
