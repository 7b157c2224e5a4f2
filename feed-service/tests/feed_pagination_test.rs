mod common;

use std::sync::Arc;

use common::{
    cache_config, comment_on, media_config, memory_cache, post_at_millis, MemoryStore,
};
use feed_service::cache::{ContentStore, FeedCache, MemoryBackend};
use feed_service::cursor;
use feed_service::services::FeedService;

fn feed_service(cache: FeedCache, store: Arc<MemoryStore>) -> FeedService {
    FeedService::new(cache, store, media_config())
}

#[tokio::test]
async fn capacity_two_evicts_oldest_and_pages_newest_first() {
    // P1(t=100), P2(t=200), P3(t=300) into a MaxSize=2 index: P1 goes.
    let cache = memory_cache(2);
    let store = Arc::new(MemoryStore::new());

    let p1 = post_at_millis(100);
    let p2 = post_at_millis(200);
    let p3 = post_at_millis(300);
    for p in [&p1, &p2, &p3] {
        cache.add_post(p).await.unwrap();
    }

    assert_eq!(cache.len().await.unwrap(), 2);

    let service = feed_service(cache, store.clone());
    let page = service.get_page(2, None).await.unwrap();

    let ids: Vec<_> = page.posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![p3.id, p2.id]);
    // Page came from the cache, not the fallback.
    assert_eq!(store.fallback_queries(), 0);
}

#[tokio::test]
async fn pages_descend_strictly_below_the_cursor() {
    let cache = memory_cache(100);
    let store = Arc::new(MemoryStore::new());

    let posts: Vec<_> = (1..=6).map(|i| post_at_millis(i * 1_000)).collect();
    for p in &posts {
        cache.add_post(p).await.unwrap();
    }

    let service = feed_service(cache, store);

    let first = service.get_page(3, None).await.unwrap();
    let first_times: Vec<_> = first.posts.iter().map(|p| p.created_at).collect();
    assert_eq!(first_times.len(), 3);
    assert!(first_times.windows(2).all(|w| w[0] > w[1]));

    // Second page continues strictly below the first page's cursor with no
    // repeated boundary item.
    let boundary = cursor::decode(Some(&first.next_cursor)).unwrap();
    let second = service.get_page(3, Some(&first.next_cursor)).await.unwrap();
    assert_eq!(second.posts.len(), 3);
    for post in &second.posts {
        assert!(post.created_at < boundary);
    }
    let all_times: Vec<_> = first_times
        .iter()
        .chain(second.posts.iter().map(|p| &p.created_at))
        .collect();
    assert!(all_times.windows(2).all(|w| w[0] > w[1]));
}

#[tokio::test]
async fn end_of_feed_repeats_the_cursor_with_no_items() {
    let cache = memory_cache(100);
    let store = Arc::new(MemoryStore::new());
    let p = post_at_millis(50_000);
    cache.add_post(&p).await.unwrap();

    let service = feed_service(cache, store);

    // Cursor pointing below everything in the feed.
    let token = cursor::encode(chrono::DateTime::from_timestamp_millis(10).unwrap());
    let page = service.get_page(5, Some(&token)).await.unwrap();

    assert!(page.posts.is_empty());
    assert_eq!(page.next_cursor, token);
}

#[tokio::test]
async fn malformed_cursor_is_rejected() {
    let service = feed_service(memory_cache(10), Arc::new(MemoryStore::new()));
    let err = service.get_page(5, Some("!!not-a-cursor!!")).await.unwrap_err();
    assert!(matches!(err, feed_service::AppError::Validation(_)));
}

#[tokio::test]
async fn hydration_miss_skips_the_item() {
    let backend: Arc<dyn feed_service::cache::CacheBackend> = Arc::new(MemoryBackend::new());
    let cache = FeedCache::new(backend.clone(), &cache_config(100));
    let store = Arc::new(MemoryStore::new());

    let p1 = post_at_millis(1_000);
    let p2 = post_at_millis(2_000);
    let p3 = post_at_millis(3_000);
    for p in [&p1, &p2, &p3] {
        cache.add_post(p).await.unwrap();
    }

    // Drop one body out from under the index, as a partial cache failure
    // would. The components share keys through the backend.
    ContentStore::new(backend, None)
        .remove_post(p2.id)
        .await
        .unwrap();

    let service = feed_service(cache, store);
    let page = service.get_page(3, None).await.unwrap();

    let ids: Vec<_> = page.posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![p3.id, p1.id]);
}

#[tokio::test]
async fn empty_cache_falls_back_to_the_database() {
    let cache = memory_cache(100);
    let store = Arc::new(MemoryStore::new());

    let p1 = post_at_millis(1_000);
    let p2 = post_at_millis(2_000);
    store.seed_post(p1.clone());
    store.seed_post(p2.clone());
    store.seed_comment(comment_on(p2.id, "first"));
    store.seed_comment(comment_on(p2.id, "second"));
    store.seed_comment(comment_on(p2.id, "third"));

    let service = feed_service(cache, store.clone());
    let page = service.get_page(10, None).await.unwrap();

    assert_eq!(store.fallback_queries(), 1);
    let ids: Vec<_> = page.posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![p2.id, p1.id]);
    // Fallback attaches at most two recent comments, like the cache path.
    assert_eq!(page.posts[0].recent_comments.len(), 2);
    // Image references are rewritten on the fallback path too.
    assert!(page.posts[0].image_url.contains("posts-processed"));
    assert!(!page.posts[0].image_url.contains("posts-original"));
}

#[tokio::test]
async fn cached_posts_hydrate_with_ring_comments() {
    let cache = memory_cache(100);
    let store = Arc::new(MemoryStore::new());

    let p = post_at_millis(1_000);
    cache.add_post(&p).await.unwrap();
    for i in 0..4 {
        cache
            .push_comment(&comment_on(p.id, &format!("c{}", i)))
            .await
            .unwrap();
    }

    let service = feed_service(cache, store);
    let page = service.get_page(1, None).await.unwrap();

    assert_eq!(page.posts.len(), 1);
    let comments = &page.posts[0].recent_comments;
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].content, "c3");
    assert_eq!(comments[1].content, "c2");
}
