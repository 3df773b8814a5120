//! 会话协作者能力接口
//!
//! 页面逻辑只依赖 `SessionProvider`，不依赖具体的身份服务实现。

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::types::{AuthEvent, Session};

pub type AuthHandler = Box<dyn Fn(AuthEvent) + Send + Sync>;

#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// 当前会话，未登录时为 None
    async fn current_session(&self) -> Option<Session>;

    /// 订阅会话变化；返回值被 drop 或 `unsubscribe` 后不再回调
    fn on_change(&self, handler: AuthHandler) -> Subscription;

    /// 是否配置了真实的身份服务
    fn is_configured(&self) -> bool {
        true
    }

    async fn is_authenticated(&self) -> bool {
        self.current_session().await.is_some()
    }
}

/// 会话变化订阅句柄
#[derive(Debug, Default)]
pub struct Subscription {
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// 不会收到任何事件的订阅
    pub fn noop() -> Self {
        Self { task: None }
    }

    /// 在后台任务中把广播事件转发给 handler（需在 tokio runtime 中调用）
    pub fn spawn(mut rx: broadcast::Receiver<AuthEvent>, handler: AuthHandler) -> Self {
        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => handler(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Session listener lagged, skipped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Self { task: Some(task) }
    }

    pub fn unsubscribe(mut self) {
        self.stop();
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.stop();
    }
}

/// 未配置身份服务时的降级实现：永远未登录，从不通知
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredIdentity;

#[async_trait]
impl SessionProvider for UnconfiguredIdentity {
    async fn current_session(&self) -> Option<Session> {
        None
    }

    fn on_change(&self, _handler: AuthHandler) -> Subscription {
        Subscription::noop()
    }

    fn is_configured(&self) -> bool {
        false
    }
}
