/// In-process cache backend
///
/// Implements the same primitives as Redis over mutex-guarded maps. Used by
/// the test suite and for running the service without a cache deployment.
/// TTLs are accepted and ignored; expiry is a Redis concern.
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::backend::CacheBackend;
use crate::error::Result;

#[derive(Default)]
struct MemoryState {
    // Sorted sets kept ordered ascending by (score, member).
    zsets: HashMap<String, Vec<(String, f64)>>,
    strings: HashMap<String, String>,
    lists: HashMap<String, Vec<String>>,
}

/// Mutex-guarded in-memory backend.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

fn slice_bounds(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let resolve = |idx: isize| -> isize {
        if idx < 0 {
            len as isize + idx
        } else {
            idx
        }
    };
    let start = resolve(start).max(0) as usize;
    let stop = resolve(stop);
    if stop < 0 || start >= len {
        return None;
    }
    let stop = (stop as usize).min(len.saturating_sub(1));
    if start > stop {
        return None;
    }
    Some((start, stop))
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let zset = state.zsets.entry(key.to_string()).or_default();
        zset.retain(|(m, _)| m != member);
        zset.push((member.to_string(), score));
        zset.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        Ok(())
    }

    async fn zcard(&self, key: &str) -> Result<u64> {
        let state = self.state.lock().unwrap();
        Ok(state.zsets.get(key).map(|z| z.len() as u64).unwrap_or(0))
    }

    async fn zrem(&self, key: &str, members: &[String]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(zset) = state.zsets.get_mut(key) {
            zset.retain(|(m, _)| !members.contains(m));
        }
        Ok(())
    }

    async fn zrevrangebyscore(&self, key: &str, max: f64, limit: usize) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        let Some(zset) = state.zsets.get(key) else {
            return Ok(Vec::new());
        };
        Ok(zset
            .iter()
            .rev()
            .filter(|(_, score)| *score <= max)
            .take(limit)
            .map(|(m, _)| m.clone())
            .collect())
    }

    async fn zrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        let Some(zset) = state.zsets.get(key) else {
            return Ok(Vec::new());
        };
        let Some((start, stop)) = slice_bounds(zset.len(), start, stop) else {
            return Ok(Vec::new());
        };
        Ok(zset[start..=stop].iter().map(|(m, _)| m.clone()).collect())
    }

    async fn set(&self, key: &str, value: &str, _ttl: Option<Duration>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.strings.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let state = self.state.lock().unwrap();
        Ok(state.strings.get(key).cloned())
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.strings.remove(key);
        state.lists.remove(key);
        state.zsets.remove(key);
        Ok(())
    }

    async fn lpush(&self, key: &str, value: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .lists
            .entry(key.to_string())
            .or_default()
            .insert(0, value.to_string());
        Ok(())
    }

    async fn ltrim(&self, key: &str, start: isize, stop: isize) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(list) = state.lists.get_mut(key) {
            match slice_bounds(list.len(), start, stop) {
                Some((start, stop)) => {
                    *list = list[start..=stop].to_vec();
                }
                None => list.clear(),
            }
        }
        Ok(())
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        let Some(list) = state.lists.get(key) else {
            return Ok(Vec::new());
        };
        let Some((start, stop)) = slice_bounds(list.len(), start, stop) else {
            return Ok(Vec::new());
        };
        Ok(list[start..=stop].to_vec())
    }
}
