/// 短链接 id 的来源
///
/// 实现必须允许并发调用，不能让多个调用者拿到同一段序列。
pub trait IdSource: Send + Sync {
    fn next_id(&self) -> u64;
}

/// 均匀分布的随机 64 位 id，每个线程使用各自的生成器
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdSource;

impl IdSource for RandomIdSource {
    fn next_id(&self) -> u64 {
        rand::random::<u64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_random_ids_do_not_repeat() {
        let source = RandomIdSource;
        let ids: HashSet<u64> = (0..10_000).map(|_| source.next_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_concurrent_draws_are_independent() {
        let source: Arc<dyn IdSource> = Arc::new(RandomIdSource);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let source = source.clone();
                std::thread::spawn(move || (0..1000).map(|_| source.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(all.insert(id), "duplicate id {}", id);
            }
        }
        assert_eq!(all.len(), 4000);
    }
}
