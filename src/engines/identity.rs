// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 未配置User-Agent时使用的默认值
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/110.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
];

/// 出站身份
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_agent: String,
    pub proxy: Option<String>,
}

/// 身份轮换器
///
/// 每次调用独立地均匀随机选取User-Agent和代理，调用之间不保留状态
#[derive(Debug, Clone)]
pub struct IdentityRotator {
    user_agents: Vec<String>,
    proxies: Vec<String>,
}

impl IdentityRotator {
    /// 创建身份轮换器
    ///
    /// # 参数
    ///
    /// * `user_agents` - User-Agent列表，为空时回退到内置列表
    /// * `proxies` - 代理列表，可为空
    pub fn new(user_agents: Vec<String>, proxies: Vec<String>) -> Self {
        let user_agents = if user_agents.is_empty() {
            DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect()
        } else {
            user_agents
        };

        Self {
            user_agents,
            proxies,
        }
    }

    /// 随机选取一个出站身份
    pub fn pick_identity(&self) -> Identity {
        let user_agent =
            self.user_agents[rand::random_range(0..self.user_agents.len())].clone();
        let proxy = if self.proxies.is_empty() {
            None
        } else {
            Some(self.proxies[rand::random_range(0..self.proxies.len())].clone())
        };

        Identity { user_agent, proxy }
    }
}

impl Default for IdentityRotator {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}
