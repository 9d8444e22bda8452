//! 后台过期清理任务
//!
//! 只对声明了 `clean_expired` 能力的后端启动。每个周期调用一次
//! `clean_expired`，单次失败只记日志，下个周期自然重试。

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::errors::Result;
use crate::storage::LinkBackend;

pub struct ExpiryCleaner;

impl ExpiryCleaner {
    /// 启动清理循环。第一次清理在一个周期之后执行。
    pub fn spawn(
        backend: Arc<dyn LinkBackend>,
        interval: Duration,
        token: CancellationToken,
    ) -> CleanerHandle {
        // interval 不接受 0
        let period = interval.max(Duration::from_millis(1));
        let task_token = token.clone();

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match backend.clean_expired().await {
                            Ok(0) => debug!("Expiry cleaner: nothing to remove"),
                            Ok(n) => info!("Expiry cleaner removed {} links from {}", n, backend.name()),
                            Err(e) => error!("Expiry cleaner tick failed: {}", e),
                        }
                    }
                    _ = task_token.cancelled() => {
                        break;
                    }
                }
            }

            info!("Expiry cleaner stopped");
        });

        info!("Expiry cleaner started (interval: {:?})", period);
        CleanerHandle { token, join }
    }
}

/// 清理任务句柄
pub struct CleanerHandle {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl CleanerHandle {
    /// 发出取消信号并等待任务退出，进行中的那次清理会先跑完
    pub async fn shutdown(self) -> Result<()> {
        self.token.cancel();
        self.join.await?;
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}
