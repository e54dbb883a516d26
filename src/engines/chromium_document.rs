// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::PageSettings;
use crate::domain::models::rating::{RatingResult, RatingSummary};
use crate::engines::traits::{
    CommentDocument, CommentNode, DocumentError, DocumentEvent, DocumentEventStream, NodeHandle,
};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::cdp::js_protocol::runtime::{AddBindingParams, EventBindingCalled};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// 页面回调绑定名
const BINDING_NAME: &str = "__commentrsNotify";
/// 节点上的评分标记（data-commentrs-rated）
const RATED_MARKER: &str = "commentrsRated";
/// 节点上的稳定编号（data-commentrs-id）
const NODE_ID_ATTR: &str = "data-commentrs-id";
const BADGE_CLASS: &str = "commentrs-badge";

/// 评论页面选择器
///
/// 与宿主页面标记的外部约定，由配置注入
#[derive(Debug, Clone)]
pub struct PageSelectors {
    pub container: String,
    pub comment: String,
    pub summary_id: String,
}

impl PageSelectors {
    pub fn from_settings(settings: &PageSettings) -> Self {
        Self {
            container: settings.container_selector.clone(),
            comment: settings.comment_selector.clone(),
            summary_id: settings.summary_id.clone(),
        }
    }

    fn container_js(&self) -> String {
        js_string(&self.container)
    }

    fn comment_js(&self) -> String {
        js_string(&self.comment)
    }

    /// 按稳定编号取评论节点的脚本片段，不存在时为 null
    fn node_js(&self, handle: NodeHandle) -> String {
        format!(
            "(document.querySelector({}) || null)",
            js_string(&format!("[{}=\"{}\"]", NODE_ID_ATTR, handle.0))
        )
    }
}

#[derive(Deserialize)]
struct RawNode {
    id: u64,
    text: String,
    rated: bool,
}

/// 基于 chromiumoxide 的评论页面
///
/// 所有读写都通过在页面中执行脚本完成。读取评论时给每个节点打上
/// `data-commentrs-id` 编号，句柄就是这个编号，所以展开回复等中间插入
/// 不会让句柄指向别的节点。结构变化通过 `MutationObserver` 调用 CDP
/// 运行时绑定上报。
pub struct ChromiumDocument {
    browser: Mutex<Browser>,
    page: Page,
    selectors: PageSelectors,
    handler: JoinHandle<()>,
}

impl ChromiumDocument {
    /// 启动（或连接）浏览器并打开配置的页面
    pub async fn open(settings: &PageSettings) -> Result<Self, DocumentError> {
        let (browser, mut handler) = if let Some(url) = &settings.remote_debugging_url {
            info!("Connecting to remote Chrome instance at: {}", url);
            Browser::connect(url.as_str()).await.map_err(|e| {
                DocumentError::Browser(format!("Failed to connect to remote Chrome: {}", e))
            })?
        } else {
            let mut builder = BrowserConfig::builder()
                .no_sandbox()
                .request_timeout(Duration::from_secs(settings.navigation_timeout_secs))
                .arg("--disable-gpu")
                .arg("--disable-dev-shm-usage");
            if !settings.headless {
                builder = builder.with_head();
            }

            Browser::launch(builder.build().map_err(DocumentError::Browser)?)
                .await
                .map_err(|e| DocumentError::Browser(e.to_string()))?
        };

        // Spawn a handler to process browser events
        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = tokio::time::timeout(
            Duration::from_secs(settings.navigation_timeout_secs),
            async {
                let page = browser
                    .new_page(settings.url.as_str())
                    .await
                    .map_err(|e| DocumentError::Browser(e.to_string()))?;
                page.wait_for_navigation()
                    .await
                    .map_err(|e| DocumentError::Browser(e.to_string()))?;
                Ok::<_, DocumentError>(page)
            },
        )
        .await
        .map_err(|_| DocumentError::Browser(format!("Timed out opening {}", settings.url)))??;

        info!("Opened {}", settings.url);

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            selectors: PageSelectors::from_settings(settings),
            handler,
        })
    }

    /// 关闭浏览器
    pub async fn close(&self) {
        if let Err(e) = self.browser.lock().await.close().await {
            warn!("Failed to close browser: {}", e);
        }
        self.handler.abort();
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> Result<T, DocumentError> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| DocumentError::Script(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| DocumentError::Script(e.to_string()))
    }

    /// 对句柄对应节点执行脚本，节点不存在时返回 NodeDetached
    async fn with_node(&self, handle: NodeHandle, body: &str) -> Result<(), DocumentError> {
        let script = format!(
            "(() => {{ const el = {}; if (!el) return false; {} return true; }})()",
            self.selectors.node_js(handle),
            body
        );
        if self.eval::<bool>(script).await? {
            Ok(())
        } else {
            Err(DocumentError::NodeDetached(handle))
        }
    }
}

/// 观察评论容器的脚本：容器出现时上报 appeared，子树变化时上报 changed
fn observer_script(selectors: &PageSelectors) -> String {
    format!(
        r#"(() => {{
  if (window.__commentrsObserver) return true;
  const notify = (kind) => {{ try {{ window.{binding}(kind); }} catch (_) {{}} }};
  let attached = null;
  const attach = () => {{
    const container = document.querySelector({container});
    if (!container || container === attached) return;
    attached = container;
    notify('appeared');
    new MutationObserver(() => notify('changed'))
      .observe(container, {{ childList: true, subtree: true }});
  }};
  window.__commentrsObserver = new MutationObserver(attach);
  window.__commentrsObserver.observe(document, {{ childList: true, subtree: true }});
  attach();
  return true;
}})()"#,
        binding = BINDING_NAME,
        container = selectors.container_js(),
    )
}

#[async_trait]
impl CommentDocument for ChromiumDocument {
    async fn count_comments(&self) -> Result<usize, DocumentError> {
        self.eval(format!(
            "document.querySelectorAll({}).length",
            self.selectors.comment_js()
        ))
        .await
    }

    async fn comment_nodes(&self) -> Result<Vec<CommentNode>, DocumentError> {
        let raw: Vec<RawNode> = self
            .eval(format!(
                "Array.from(document.querySelectorAll({})).map((el) => {{ \
                 if (!el.dataset.commentrsId) {{ \
                   window.__commentrsNextId = (window.__commentrsNextId || 0) + 1; \
                   el.dataset.commentrsId = String(window.__commentrsNextId); \
                 }} \
                 return {{ id: Number(el.dataset.commentrsId), \
                   text: el.innerText || el.textContent || '', \
                   rated: el.dataset.{} === '1' }}; }})",
                self.selectors.comment_js(),
                RATED_MARKER
            ))
            .await?;

        Ok(raw
            .into_iter()
            .map(|node| CommentNode {
                handle: NodeHandle(node.id),
                text: node.text,
                rated: node.rated,
            })
            .collect())
    }

    async fn scroll_step(&self) -> Result<(), DocumentError> {
        self.eval::<bool>(
            "(() => { window.scrollTo(0, document.documentElement.scrollHeight); return true; })()"
                .to_string(),
        )
        .await
        .map(|_| ())
    }

    async fn restore_scroll(&self) -> Result<(), DocumentError> {
        self.eval::<bool>("(() => { window.scrollTo(0, 0); return true; })()".to_string())
            .await
            .map(|_| ())
    }

    async fn is_rated(&self, handle: NodeHandle) -> Result<bool, DocumentError> {
        let rated: Option<bool> = self
            .eval(format!(
                "(() => {{ const el = {}; return el ? el.dataset.{} === '1' : null; }})()",
                self.selectors.node_js(handle),
                RATED_MARKER
            ))
            .await?;
        rated.ok_or(DocumentError::NodeDetached(handle))
    }

    async fn append_badge(
        &self,
        handle: NodeHandle,
        rating: &RatingResult,
    ) -> Result<(), DocumentError> {
        let body = format!(
            "const badge = document.createElement('span'); \
             badge.className = {class}; \
             badge.textContent = {label}; \
             badge.style.marginLeft = '8px'; \
             badge.style.color = 'gold'; \
             (el.parentNode || el).appendChild(badge);",
            class = js_string(BADGE_CLASS),
            label = js_string(&format!(" {}", rating.badge_label())),
        );
        self.with_node(handle, &body).await
    }

    async fn mark_rated(&self, handle: NodeHandle) -> Result<(), DocumentError> {
        self.with_node(handle, &format!("el.dataset.{} = '1';", RATED_MARKER))
            .await
    }

    async fn write_summary(&self, summary: &RatingSummary) -> Result<(), DocumentError> {
        let written: bool = self
            .eval(format!(
                "(() => {{ \
                 let slot = document.getElementById({id}); \
                 if (!slot) {{ \
                   const container = document.querySelector({container}); \
                   if (!container || !container.parentNode) return false; \
                   slot = document.createElement('div'); \
                   slot.id = {id}; \
                   container.parentNode.insertBefore(slot, container); \
                 }} \
                 slot.textContent = {text}; \
                 return true; }})()",
                id = js_string(&self.selectors.summary_id),
                container = self.selectors.container_js(),
                text = js_string(&summary.to_string()),
            ))
            .await?;

        if written {
            Ok(())
        } else {
            Err(DocumentError::ContainerMissing)
        }
    }

    async fn container_present(&self) -> Result<bool, DocumentError> {
        self.eval(format!(
            "document.querySelector({}) !== null",
            self.selectors.container_js()
        ))
        .await
    }

    async fn subscribe(&self) -> Result<DocumentEventStream, DocumentError> {
        self.page
            .execute(AddBindingParams::new(BINDING_NAME))
            .await
            .map_err(|e| DocumentError::Browser(e.to_string()))?;

        let listener = self
            .page
            .event_listener::<EventBindingCalled>()
            .await
            .map_err(|e| DocumentError::Browser(e.to_string()))?;

        let script = observer_script(&self.selectors);
        // Re-install after in-page navigations, then once for the current document.
        self.page
            .execute(AddScriptToEvaluateOnNewDocumentParams::new(script.clone()))
            .await
            .map_err(|e| DocumentError::Browser(e.to_string()))?;
        self.eval::<bool>(script).await?;

        debug!("Mutation observer installed");

        Ok(listener
            .filter_map(|event| {
                let mapped = if event.name == BINDING_NAME {
                    match event.payload.as_str() {
                        "appeared" => Some(DocumentEvent::ContainerAppeared),
                        "changed" => Some(DocumentEvent::ContainerChanged),
                        _ => None,
                    }
                } else {
                    None
                };
                futures::future::ready(mapped)
            })
            .boxed())
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

/// 把任意字符串编码成 JS 字符串字面量
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
