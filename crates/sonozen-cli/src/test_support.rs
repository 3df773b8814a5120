//! 测试用会话协作者

use std::sync::Mutex;

use async_trait::async_trait;
use sonozen_session::{AuthEvent, AuthHandler, Session, SessionProvider, Subscription, User};
use tokio::sync::broadcast;

pub fn session() -> Session {
    Session {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        token_type: "bearer".to_string(),
        expires_at: i64::MAX / 2,
        user: User {
            id: "user-1".to_string(),
            email: Some("ana@example.com".to_string()),
        },
    }
}

pub struct TestSessions {
    session: Mutex<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
}

impl TestSessions {
    pub fn new(session: Option<Session>) -> Self {
        let (events, _) = broadcast::channel(8);
        Self {
            session: Mutex::new(session),
            events,
        }
    }

    pub fn emit(&self, event: AuthEvent) {
        *self.session.lock().unwrap() = event.session().cloned();
        let _ = self.events.send(event);
    }

    pub fn listener_count(&self) -> usize {
        self.events.receiver_count()
    }
}

#[async_trait]
impl SessionProvider for TestSessions {
    async fn current_session(&self) -> Option<Session> {
        self.session.lock().unwrap().clone()
    }

    fn on_change(&self, handler: AuthHandler) -> Subscription {
        Subscription::spawn(self.events.subscribe(), handler)
    }
}
