use crate::domain::event::LedgerEvent;
use crate::domain::ports::EventSink;
use crate::error::Result;
use async_trait::async_trait;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

/// Keeps every emitted event, in order. Clones share the same log.
#[derive(Default, Clone)]
pub struct InMemoryEventLog {
    events: Arc<RwLock<Vec<LedgerEvent>>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<LedgerEvent> {
        self.events.read().await.clone()
    }

    pub async fn clear(&self) {
        self.events.write().await.clear();
    }
}

#[async_trait]
impl EventSink for InMemoryEventLog {
    async fn emit(&self, event: LedgerEvent) -> Result<()> {
        self.events.write().await.push(event);
        Ok(())
    }
}

/// Writes one JSON object per event, one event per line.
pub struct JsonLinesEventSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesEventSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W: Write + Send + 'static> EventSink for JsonLinesEventSink<W> {
    async fn emit(&self, event: LedgerEvent) -> Result<()> {
        let mut writer = self.writer.lock().await;
        serde_json::to_writer(&mut *writer, &event)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Reports every event as a structured log line.
#[derive(Default, Clone, Copy)]
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: LedgerEvent) -> Result<()> {
        let payload = serde_json::to_string(&event)?;
        info!(event = event.name(), %payload, "Ledger event");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::asset::Symbol;
    use crate::domain::identity::Identity;

    fn deposited(amount: i64) -> LedgerEvent {
        LedgerEvent::Deposited {
            address: Identity::organization("aa"),
            symbol: Symbol::new("ELF"),
            amount,
        }
    }

    #[tokio::test]
    async fn test_in_memory_log_keeps_order() {
        let log = InMemoryEventLog::new();
        log.emit(deposited(1)).await.unwrap();
        log.emit(deposited(2)).await.unwrap();
        assert_eq!(log.events().await, vec![deposited(1), deposited(2)]);
        log.clear().await;
        assert!(log.events().await.is_empty());
    }

    #[tokio::test]
    async fn test_json_lines_sink() {
        let sink = JsonLinesEventSink::new(Vec::new());
        sink.emit(deposited(5)).await.unwrap();
        sink.emit(deposited(6)).await.unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: LedgerEvent = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first, deposited(5));
        assert!(lines[1].contains("\"event\":\"Deposited\""));
    }
}
