use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use log::{debug, warn};
use sonozen_storage::AnalysisHistory;

use crate::client::AnalysisBackend;
use crate::router::Route;

/// 未输入描述就提交时的提示
pub const EMPTY_INPUT_MESSAGE: &str = "Please describe your sleep problems.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 已保存，跳转到该页面
    Navigate(Route),
    /// 失败，保留输入，原因见 `error()`
    Stay,
    /// 已有提交在进行中
    Busy,
}

/// 提交分析页状态
///
/// 同一时间最多一个提交，提交后不可取消
#[derive(Debug, Default)]
pub struct SubmitPage {
    input: Mutex<String>,
    error: Mutex<Option<String>>,
    in_flight: AtomicBool,
}

/// 提交结束时清除进行中标记
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SubmitPage {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: Mutex::new(input.into()),
            ..Self::default()
        }
    }

    pub fn input(&self) -> String {
        self.input.lock().map(|i| i.clone()).unwrap_or_default()
    }

    pub fn set_input(&self, input: impl Into<String>) {
        if let Ok(mut current) = self.input.lock() {
            *current = input.into();
        }
    }

    pub fn error(&self) -> Option<String> {
        self.error.lock().ok().and_then(|e| e.clone())
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// 提交按钮是否可用
    pub fn can_submit(&self) -> bool {
        !self.is_in_flight() && !self.input().trim().is_empty()
    }

    fn set_error(&self, error: Option<String>) {
        if let Ok(mut current) = self.error.lock() {
            *current = error;
        }
    }

    pub async fn submit(
        &self,
        backend: &dyn AnalysisBackend,
        history: &AnalysisHistory,
    ) -> SubmitOutcome {
        let message = self.input().trim().to_string();
        if message.is_empty() {
            self.set_error(Some(EMPTY_INPUT_MESSAGE.to_string()));
            return SubmitOutcome::Stay;
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Submission ignored, one is already in flight");
            return SubmitOutcome::Busy;
        }
        let _in_flight = InFlight(&self.in_flight);
        self.set_error(None);

        let record = match backend.analyze(&message).await {
            Ok(record) => record,
            Err(e) => {
                self.set_error(Some(e.to_string()));
                return SubmitOutcome::Stay;
            }
        };

        if let Err(e) = history.append(record).await {
            warn!("Failed to save analysis: {}", e);
            self.set_error(Some(format!("Failed to save analysis: {}", e)));
            return SubmitOutcome::Stay;
        }

        SubmitOutcome::Navigate(Route::Dashboard)
    }
}
