//! 分析リクエストの世代管理
//!
//! アクティビティの連続切り替えなどで評価が重なった場合、最新の世代の結果だけを公開する。
//! 古い世代の評価は中断され、遅れて届いた結果は破棄される。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::ai::pipeline::AnalysisPipeline;
use crate::ai::types::{AnalysisRequest, AnalysisResponse};

/// 公開済みの分析結果
#[derive(Debug, Clone)]
pub struct AnalysisSnapshot {
    /// この結果を生んだリクエストの世代
    pub generation: u64,
    pub request: AnalysisRequest,
    pub response: AnalysisResponse,
    pub completed_at: DateTime<Local>,
}

pub struct AnalysisCoordinator {
    pipeline: Arc<AnalysisPipeline>,
    debounce: Duration,
    generation: Arc<AtomicU64>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
    publisher: Arc<watch::Sender<Option<AnalysisSnapshot>>>,
}

impl AnalysisCoordinator {
    pub fn new(pipeline: Arc<AnalysisPipeline>, debounce: Duration) -> Self {
        let (publisher, _) = watch::channel(None);
        Self {
            pipeline,
            debounce,
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: Mutex::new(None),
            publisher: Arc::new(publisher),
        }
    }

    /// 新しいリクエストを投入し、その世代番号を返す。
    ///
    /// 実行中の評価は中断される。`debounce` の間に次のリクエストが来れば、
    /// このリクエストは生成サービスを呼ばずに終わる。
    pub fn submit(&self, request: AnalysisRequest) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.abort_in_flight();

        let pipeline = Arc::clone(&self.pipeline);
        let current = Arc::clone(&self.generation);
        let publisher = Arc::clone(&self.publisher);
        let debounce = self.debounce;

        debug!(
            generation,
            activity = %request.activity(),
            debounce_ms = debounce.as_millis() as u64,
            "Analysis request submitted"
        );

        let handle = tokio::spawn(async move {
            if !debounce.is_zero() {
                tokio::time::sleep(debounce).await;
            }
            if current.load(Ordering::SeqCst) != generation {
                debug!(generation, "Request superseded during debounce");
                return;
            }

            let response = pipeline.evaluate(&request).await;

            let published = publisher.send_if_modified(|slot| {
                if current.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *slot = Some(AnalysisSnapshot {
                    generation,
                    request,
                    response,
                    completed_at: Local::now(),
                });
                true
            });

            if published {
                debug!(generation, "Analysis result published");
            } else {
                debug!(generation, "Discarding result from superseded request");
            }
        });

        if let Ok(mut slot) = self.in_flight.lock() {
            *slot = Some(handle);
        }
        generation
    }

    /// 実行中の評価を取り消す。結果は公開されない。
    pub fn cancel(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.abort_in_flight();
        debug!(generation, "In-flight analysis cancelled");
    }

    /// 最後に投入（または取り消し）された世代
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// 最新の公開済み結果
    pub fn latest(&self) -> Option<AnalysisSnapshot> {
        self.publisher.borrow().clone()
    }

    /// 結果の公開を監視するレシーバー
    pub fn subscribe(&self) -> watch::Receiver<Option<AnalysisSnapshot>> {
        self.publisher.subscribe()
    }

    /// 指定した世代の結果が公開されるまで待つ。
    /// より新しい世代に置き換えられた場合は `None` を返す。
    pub async fn wait_for(&self, generation: u64) -> Option<AnalysisSnapshot> {
        let mut receiver = self.subscribe();
        loop {
            {
                let current = receiver.borrow_and_update();
                if let Some(snapshot) = current.as_ref() {
                    if snapshot.generation == generation {
                        return Some(snapshot.clone());
                    }
                }
            }
            if self.current_generation() != generation {
                return None;
            }
            if receiver.changed().await.is_err() {
                return None;
            }
        }
    }

    fn abort_in_flight(&self) {
        if let Ok(mut slot) = self.in_flight.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}

impl Drop for AnalysisCoordinator {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}
