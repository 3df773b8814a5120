//! 页面路由与访问控制

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Auth,
    Analysis,
    Dashboard,
}

/// 页面访问级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// 已登录用户会被重定向到 dashboard
    PublicOnly,
    /// 需要登录（身份服务未配置时开放）
    Protected,
}

/// 访问某页面的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

impl Route {
    pub const ALL: [Route; 4] = [Route::Landing, Route::Auth, Route::Analysis, Route::Dashboard];

    pub fn path(self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Auth => "/auth",
            Route::Analysis => "/analise",
            Route::Dashboard => "/dashboard",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.path() == path)
    }

    pub fn access(self) -> Access {
        match self {
            Route::Landing | Route::Auth => Access::PublicOnly,
            Route::Analysis | Route::Dashboard => Access::Protected,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// 根据会话状态决定渲染还是重定向
pub fn guard(route: Route, identity_configured: bool, authenticated: bool) -> Navigation {
    match route.access() {
        Access::PublicOnly if authenticated => Navigation::Redirect(Route::Dashboard),
        Access::Protected if identity_configured && !authenticated => {
            Navigation::Redirect(Route::Auth)
        }
        _ => Navigation::Render(route),
    }
}
