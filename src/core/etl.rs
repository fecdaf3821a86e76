use crate::core::Pipeline;
use crate::utils::error::Result;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use tokio::sync::Mutex;

/// 同一時間只允許一次執行（排程與手動觸發共用同一把鎖）
pub struct PipelineRunner<P: Pipeline> {
    pipeline: P,
    lock: Mutex<()>,
}

impl<P: Pipeline> PipelineRunner<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            lock: Mutex::new(()),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run_for(&self, today: NaiveDate) -> Result<bool> {
        let _guard = self.lock.lock().await;
        tracing::info!("🚀 Checking for new publication ({})", today);
        let changed = self.pipeline.run_pipeline(today).await?;
        if changed {
            tracing::info!("✅ New inclusion list generated");
        } else {
            tracing::info!("No new inclusion list this cycle");
        }
        Ok(changed)
    }

    pub async fn run_once(&self) -> Result<bool> {
        self.run_for(Local::now().date_naive()).await
    }

    pub async fn list_artifacts(&self) -> Result<Vec<String>> {
        self.pipeline.list_artifacts().await
    }

    /// 啟動時先跑一次，之後每天在指定時間執行；單次失敗只記錄
    pub async fn run_daily(&self, hour: u32, minute: u32) -> Result<()> {
        if let Err(e) = self.run_once().await {
            tracing::error!("❌ Startup run failed: {} ({})", e, e.recovery_suggestion());
        }

        loop {
            let now = Local::now().naive_local();
            let next = next_run_after(now, hour, minute);
            let wait = (next - now).to_std().unwrap_or_default();
            tracing::info!("⏰ Next check at {}", next);
            tokio::time::sleep(wait).await;

            if let Err(e) = self.run_once().await {
                tracing::error!("❌ Scheduled run failed: {} ({})", e, e.recovery_suggestion());
            }
        }
    }
}

/// 下一個 `hour:minute`，若今天的時間已過則排到明天
pub fn next_run_after(now: NaiveDateTime, hour: u32, minute: u32) -> NaiveDateTime {
    let at = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}
