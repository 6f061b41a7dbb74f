//! Real-time change notifications
//! 变更日志写入后推送刷新信号（SSE）

use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::error::{AppError, Result};
use crate::models::RecordKind;

/// 心跳间隔
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// 实时事件类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeEvent {
    /// 一次追加写入了新的变更日志
    ChangeLogAppended {
        entity_kind: RecordKind,
        code: String,
        count: usize,
    },
    /// 某类记录的列表需要重新拉取
    RecordsChanged { kind: RecordKind },
    /// 心跳信号（保持连接活跃）
    Heartbeat,
}

impl RealtimeEvent {
    /// 转换为SSE格式的数据
    pub fn to_sse_data(&self) -> String {
        match self {
            RealtimeEvent::ChangeLogAppended {
                entity_kind,
                code,
                count,
            } => serde_json::json!({
                "type": self.event_type(),
                "data": {
                    "entity_kind": entity_kind,
                    "code": code,
                    "count": count,
                }
            })
            .to_string(),
            RealtimeEvent::RecordsChanged { kind } => serde_json::json!({
                "type": self.event_type(),
                "data": { "kind": kind }
            })
            .to_string(),
            RealtimeEvent::Heartbeat => serde_json::json!({
                "type": self.event_type(),
                "data": {
                    "timestamp": chrono::Utc::now().to_rfc3339()
                }
            })
            .to_string(),
        }
    }

    /// 获取事件类型名称
    pub fn event_type(&self) -> &'static str {
        match self {
            RealtimeEvent::ChangeLogAppended { .. } => "change_log_appended",
            RealtimeEvent::RecordsChanged { .. } => "records_changed",
            RealtimeEvent::Heartbeat => "heartbeat",
        }
    }

    /// 完整的 SSE 帧
    pub fn to_sse_frame(&self) -> String {
        format!("event: {}\ndata: {}\n\n", self.event_type(), self.to_sse_data())
    }

    fn concerns(&self, kind: Option<RecordKind>) -> bool {
        match (self, kind) {
            (_, None) | (RealtimeEvent::Heartbeat, _) => true,
            (RealtimeEvent::ChangeLogAppended { entity_kind, .. }, Some(kind)) => {
                *entity_kind == kind
            }
            (RealtimeEvent::RecordsChanged { kind: changed }, Some(kind)) => *changed == kind,
        }
    }
}

/// 事件总线
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<RealtimeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// 发布事件；没有订阅者时返回错误
    pub fn publish(&self, event: RealtimeEvent) -> Result<()> {
        self.sender
            .send(event)
            .map_err(|e| AppError::Internal(format!("Failed to publish event: {}", e)))?;
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// 订阅变更日志事件，可按记录类型过滤
    pub fn subscribe_to_change_logs(&self, kind: Option<RecordKind>) -> ChangeLogEventStream {
        ChangeLogEventStream {
            receiver: self.subscribe(),
            kind,
        }
    }
}

/// 变更日志事件流
pub struct ChangeLogEventStream {
    receiver: broadcast::Receiver<RealtimeEvent>,
    kind: Option<RecordKind>,
}

impl ChangeLogEventStream {
    /// 转换为SSE文本流
    pub fn into_sse_stream(
        mut self,
    ) -> impl futures::Stream<Item = std::result::Result<String, Infallible>> {
        let (tx, rx) = tokio::sync::mpsc::channel(100);

        // 心跳定时器
        let heartbeat_tx = tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(HEARTBEAT_INTERVAL);
            loop {
                interval.tick().await;
                if heartbeat_tx
                    .send(Ok(RealtimeEvent::Heartbeat.to_sse_frame()))
                    .await
                    .is_err()
                {
                    break;
                }
            }
        });

        // 事件转发任务
        tokio::spawn(async move {
            loop {
                let event = match self.receiver.recv().await {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "SSE subscriber lagged behind");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };

                if event.concerns(self.kind) && tx.send(Ok(event.to_sse_frame())).await.is_err() {
                    break;
                }
            }
        });

        tokio_stream::wrappers::ReceiverStream::new(rx)
    }
}
