use std::sync::Arc;

use sonozen_core::SleepAnalysisRecord;
use tracing::{debug, warn};

use crate::{LocalStorage, StorageResult};

/// 分析历史固定存储键
pub const HISTORY_KEY: &str = "sleepAnalyses";

/// 分析历史（最新在前）
///
/// 整个数组读-改-写，没有跨进程锁：并发写入时后写者覆盖。
#[derive(Clone)]
pub struct AnalysisHistory {
    storage: Arc<dyn LocalStorage>,
}

impl AnalysisHistory {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self { storage }
    }

    /// 读取历史；缺失、不可读或损坏时返回空列表
    pub async fn load(&self) -> Vec<SleepAnalysisRecord> {
        let raw = match self.storage.get_item(HISTORY_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read analysis history, treating as empty: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!("Stored analysis history is corrupt, treating as empty: {}", e);
                Vec::new()
            }
        }
    }

    /// 把记录插到最前并整体写回
    pub async fn append(&self, record: SleepAnalysisRecord) -> StorageResult<()> {
        let mut records = self.load().await;
        records.insert(0, record);

        let content = serde_json::to_string(&records)?;
        self.storage.set_item(HISTORY_KEY, &content).await?;

        debug!("Analysis history now holds {} records", records.len());
        Ok(())
    }
}

impl std::fmt::Debug for AnalysisHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisHistory").finish_non_exhaustive()
    }
}
