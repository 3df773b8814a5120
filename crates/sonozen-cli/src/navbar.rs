use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use colored::Colorize;
use sonozen_session::{SessionProvider, Subscription};

use crate::router::Route;

/// 导航项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Link { label: &'static str, route: Route },
    SignOut,
}

/// 导航栏：存活期间跟随会话变化
pub struct Navbar {
    current: Route,
    authenticated: Arc<AtomicBool>,
    _subscription: Subscription,
}

impl Navbar {
    /// 读取当前会话并订阅后续变化
    pub async fn attach(sessions: &dyn SessionProvider, current: Route) -> Self {
        let authenticated = Arc::new(AtomicBool::new(sessions.is_authenticated().await));

        let flag = Arc::clone(&authenticated);
        let subscription = sessions.on_change(Box::new(move |event| {
            flag.store(event.session().is_some(), Ordering::SeqCst);
        }));

        Self {
            current,
            authenticated,
            _subscription: subscription,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    pub fn items(&self) -> Vec<NavItem> {
        if self.is_authenticated() {
            vec![
                NavItem::Link {
                    label: "Analysis",
                    route: Route::Analysis,
                },
                NavItem::Link {
                    label: "Dashboard",
                    route: Route::Dashboard,
                },
                NavItem::SignOut,
            ]
        } else {
            vec![NavItem::Link {
                label: "Sign in",
                route: Route::Auth,
            }]
        }
    }

    pub fn render(&self) -> String {
        let items: Vec<String> = self
            .items()
            .into_iter()
            .map(|item| match item {
                NavItem::Link { label, route } if route == self.current => {
                    format!("[{}]", label).bold().to_string()
                }
                NavItem::Link { label, .. } => label.to_string(),
                NavItem::SignOut => "Sign out".dimmed().to_string(),
            })
            .collect();

        format!("{}  {}", "🌙 SonoZen".purple().bold(), items.join("  "))
    }
}
