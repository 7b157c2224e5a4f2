/// Background consumers
pub mod comment_consumer;

pub use comment_consumer::CommentConsumer;
