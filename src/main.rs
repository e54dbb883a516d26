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

use commentrs::application::use_cases::analysis_use_case::AnalysisController;
use commentrs::config::settings::Settings;
use commentrs::domain::services::loader::CommentLoader;
use commentrs::domain::services::pipeline::Pipeline;
use commentrs::domain::services::rater::{CommentRater, HttpRater};
use commentrs::engines::chromium_document::ChromiumDocument;
use commentrs::presentation::routes;
use commentrs::utils::telemetry;
use commentrs::workers::manager::WorkerManager;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting commentrs...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    if settings.metrics.enabled {
        commentrs::infrastructure::metrics::init_metrics(&settings.metrics)?;
    }

    // 3. Open the comment page
    let document = Arc::new(ChromiumDocument::open(&settings.page).await?);

    // 4. Initialize Components
    let rater = HttpRater::new(&settings.rater)?;
    info!("Rating service at {} ({})", rater.endpoint(), rater.name());

    let pipeline = Arc::new(Pipeline::new(
        document.clone(),
        Arc::new(rater),
        CommentLoader::from_settings(&settings.loader),
    ));
    let controller = Arc::new(AnalysisController::new(pipeline, &settings.analysis));

    // 5. Start Workers
    let shutdown = CancellationToken::new();
    let mut worker_manager = WorkerManager::new(shutdown.clone());
    if settings.analysis.watch {
        worker_manager.start_watcher(controller.clone());
    }

    // 6. Start HTTP server
    let app = routes::routes(controller.clone());
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Shutdown signal received"),
                Err(err) => error!("Unable to listen for shutdown signal: {}", err),
            }
            server_shutdown.cancel();
        })
        .await?;

    let _ = controller.cancel();
    worker_manager.shutdown().await;
    document.close().await;

    info!("commentrs stopped");
    Ok(())
}
