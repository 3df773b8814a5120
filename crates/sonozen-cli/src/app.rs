//! 页面装配：会话、历史、分析后端与路由守卫

use std::sync::Arc;

use colored::Colorize;
use log::debug;
use sonozen_config::Config;
use sonozen_session::{IdentityClient, SessionProvider, UnconfiguredIdentity};
use sonozen_storage::{AnalysisHistory, LocalStorage};

use crate::client::{AnalysisBackend, AnalysisClient};
use crate::navbar::Navbar;
use crate::pages::{render_dashboard, render_landing, AuthPage, SubmitOutcome, SubmitPage};
use crate::router::{guard, Navigation, Route};

const MAX_REDIRECTS: usize = 3;

pub struct App {
    sessions: Arc<dyn SessionProvider>,
    identity: Option<Arc<IdentityClient>>,
    history: AnalysisHistory,
    backend: Arc<dyn AnalysisBackend>,
    auth_page: AuthPage,
}

/// 一次页面访问的结果
#[derive(Debug, Clone)]
pub struct Visit {
    pub route: Route,
    pub output: String,
}

impl App {
    /// 按配置装配；身份服务缺失时降级为未登录的说明模式
    pub fn from_config(config: &Config, storage: Arc<dyn LocalStorage>) -> Self {
        let identity = config.identity.resolve().map(|endpoint| {
            Arc::new(IdentityClient::new(
                endpoint.url,
                endpoint.anon_key,
                Arc::clone(&storage),
            ))
        });
        let sessions: Arc<dyn SessionProvider> = match &identity {
            Some(client) => Arc::clone(client) as Arc<dyn SessionProvider>,
            None => Arc::new(UnconfiguredIdentity),
        };

        Self {
            sessions,
            identity,
            history: AnalysisHistory::new(storage),
            backend: Arc::new(AnalysisClient::new(config.client.server_url.as_str())),
            auth_page: AuthPage::new(
                config.identity.url_env.as_str(),
                config.identity.anon_key_env.as_str(),
            ),
        }
    }

    pub fn from_parts(
        sessions: Arc<dyn SessionProvider>,
        identity: Option<Arc<IdentityClient>>,
        history: AnalysisHistory,
        backend: Arc<dyn AnalysisBackend>,
        auth_page: AuthPage,
    ) -> Self {
        Self {
            sessions,
            identity,
            history,
            backend,
            auth_page,
        }
    }

    pub fn sessions(&self) -> &dyn SessionProvider {
        self.sessions.as_ref()
    }

    pub fn identity(&self) -> Option<&IdentityClient> {
        self.identity.as_deref()
    }

    pub fn history(&self) -> &AnalysisHistory {
        &self.history
    }

    /// 应用路由守卫，返回最终落地的页面
    pub async fn resolve(&self, route: Route) -> Route {
        let configured = self.sessions.is_configured();
        let authenticated = self.sessions.is_authenticated().await;

        let mut current = route;
        for _ in 0..MAX_REDIRECTS {
            match guard(current, configured, authenticated) {
                Navigation::Render(target) => return target,
                Navigation::Redirect(target) => {
                    debug!("Redirect {} -> {}", current, target);
                    current = target;
                }
            }
        }
        current
    }

    /// 访问页面：守卫 + 导航栏 + 页面内容
    pub async fn visit(&self, route: Route) -> Visit {
        let target = self.resolve(route).await;
        let mut output = String::new();
        if target != route {
            output.push_str(&format!("{}\n", format!("→ {}", target).dimmed()));
        }
        output.push_str(&self.render(target).await);
        Visit {
            route: target,
            output,
        }
    }

    async fn render(&self, route: Route) -> String {
        let navbar = Navbar::attach(self.sessions.as_ref(), route).await;
        let body = match route {
            Route::Landing => render_landing(),
            Route::Auth => self.render_auth(),
            Route::Analysis => render_analysis_prompt(),
            Route::Dashboard => render_dashboard(&self.history.load().await),
        };
        format!("{}\n\n{}", navbar.render(), body)
    }

    fn render_auth(&self) -> String {
        if self.sessions.is_configured() {
            format!(
                "{}\n{} {}\n",
                self.auth_page.render_header(),
                "Sign in with:".dimmed(),
                "sonozen auth login --email <EMAIL>".green()
            )
        } else {
            self.auth_page.render_unconfigured()
        }
    }

    /// 提交分析；成功后跳转到 dashboard
    pub async fn analyze(&self, page: &SubmitPage) -> (SubmitOutcome, Option<Visit>) {
        let outcome = page.submit(self.backend.as_ref(), &self.history).await;
        match outcome {
            SubmitOutcome::Navigate(route) => {
                let visit = self.visit(route).await;
                (outcome, Some(visit))
            }
            _ => (outcome, None),
        }
    }

    /// 会话状态描述
    pub async fn status(&self) -> String {
        if !self.sessions.is_configured() {
            return format!(
                "{} set {} and {} to enable sign-in",
                "Identity provider not configured:".yellow(),
                self.auth_page.url_env,
                self.auth_page.anon_key_env
            );
        }
        match self.sessions.current_session().await {
            Some(session) => format!(
                "{} {}",
                "Signed in as".green(),
                session.email().unwrap_or(&session.user.id)
            ),
            None => "Not signed in".dimmed().to_string(),
        }
    }
}

fn render_analysis_prompt() -> String {
    format!(
        "{}\n{}\n\n  {}\n  {}\n",
        "Tell us about your sleep".bold(),
        "Describe what is keeping you from sleeping well and get a personalized plan.",
        "sonozen analyze \"I wake up at 3am and can't fall back asleep\"".green(),
        "echo \"...\" | sonozen analyze".green()
    )
}
