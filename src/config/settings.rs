// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含控制服务器、页面、加载器、评分服务、分析与指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 控制服务器配置
    pub server: ServerSettings,
    /// 目标页面配置
    pub page: PageSettings,
    /// 加载器配置
    pub loader: LoaderSettings,
    /// 评分服务配置
    pub rater: RaterSettings,
    /// 分析配置
    pub analysis: AnalysisSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 目标页面配置设置
///
/// 选择器是与宿主页面标记的外部约定，页面改版时只需修改配置
#[derive(Debug, Clone, Deserialize)]
pub struct PageSettings {
    /// 要打开的视频页面
    pub url: String,
    /// 评论容器选择器
    pub container_selector: String,
    /// 评论文本节点选择器
    pub comment_selector: String,
    /// 汇总区域插入位置（容器之前）
    pub summary_id: String,
    /// 远程 Chrome 调试地址（可选）
    pub remote_debugging_url: Option<String>,
    /// 是否无头运行
    pub headless: bool,
    /// 页面导航超时时间（秒）
    pub navigation_timeout_secs: u64,
}

/// 加载器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LoaderSettings {
    /// 轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 连续无增长多少次后放弃
    pub max_stall_retries: u32,
}

impl LoaderSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// 评分服务配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RaterSettings {
    /// 评分服务基础URL
    pub base_url: String,
    /// 单次请求超时时间（秒）
    pub timeout_secs: u64,
    /// 传输失败时的最大重试次数
    pub max_retries: u32,
    /// 初始退避时间（毫秒）
    pub initial_backoff_ms: u64,
}

impl RaterSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 分析配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSettings {
    /// 默认目标评论数
    pub default_target_count: u32,
    /// 允许的最大目标评论数
    pub max_target_count: u32,
    /// 是否在启动时开启观察器
    pub watch: bool,
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 导出监听地址
    pub address: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加默认值、`config/default`、`config/{APP_ENVIRONMENT}` 与
    /// `COMMENTRS__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            // Default page settings
            .set_default("page.url", "about:blank")?
            .set_default("page.container_selector", "#comments")?
            .set_default("page.comment_selector", "#content-text")?
            .set_default("page.summary_id", "commentrs-summary")?
            .set_default("page.headless", true)?
            .set_default("page.navigation_timeout_secs", 30)?
            // Default loader settings
            .set_default("loader.poll_interval_ms", 500)?
            .set_default("loader.max_stall_retries", 10)?
            // Default rater settings
            .set_default("rater.base_url", "http://127.0.0.1:5000")?
            .set_default("rater.timeout_secs", 30)?
            .set_default("rater.max_retries", 2)?
            .set_default("rater.initial_backoff_ms", 500)?
            // Default analysis settings
            .set_default("analysis.default_target_count", 100)?
            .set_default("analysis.max_target_count", 5000)?
            .set_default("analysis.watch", true)?
            // Default metrics settings
            .set_default("metrics.enabled", false)?
            .set_default("metrics.address", "127.0.0.1:9000")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("COMMENTRS").separator("__"));

        builder.build()?.try_deserialize()
    }
}
