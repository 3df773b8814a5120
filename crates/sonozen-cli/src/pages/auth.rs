use colored::Colorize;

/// 登录页
#[derive(Debug, Clone)]
pub struct AuthPage {
    /// 身份服务 URL 与公钥对应的环境变量名
    pub url_env: String,
    pub anon_key_env: String,
}

impl AuthPage {
    pub fn new(url_env: impl Into<String>, anon_key_env: impl Into<String>) -> Self {
        Self {
            url_env: url_env.into(),
            anon_key_env: anon_key_env.into(),
        }
    }

    /// 未配置身份服务时的提示
    pub fn render_unconfigured(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}\n", "⚠️  Configuration required".yellow().bold()));
        out.push_str("To use sign-in you need to configure your identity provider credentials.\n\n");
        out.push_str("Set these environment variables:\n");
        out.push_str(&format!("  • {}\n", self.url_env));
        out.push_str(&format!("  • {}\n", self.anon_key_env));
        out.push_str(&format!(
            "\n{}\n",
            "or set identity.url and identity.anon_key with `sonozen config set`.".dimmed()
        ));
        out.push_str(&format!(
            "{}\n",
            "Analysis and dashboard stay available without an account.".dimmed()
        ));
        out
    }

    pub fn render_header(&self) -> String {
        format!(
            "{}\n{}\n",
            "Sign in to SonoZen".bold(),
            "Your journey to peaceful nights starts here".dimmed()
        )
    }
}
