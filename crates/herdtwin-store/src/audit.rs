//! Operation audit trail
//!
//! Append-only record of every mint and mirror attempt, successful or
//! not. The trail is what lets an operator reconcile "transaction hash
//! was logged but the row never landed" incidents after a crash.

use chrono::{DateTime, Utc};
use herdtwin_core::{EntityId, NetworkId, TxHash};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventType {
    PrimaryMinted,
    Mirrored,
    MintFailed,
    MirrorFailed,
}

/// One audit trail entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub entity_id: EntityId,
    pub event_type: AuditEventType,
    pub network_id: NetworkId,
    /// Present when the chain got far enough to assign a hash
    pub transaction_hash: Option<TxHash>,
    pub description: String,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        entity_id: EntityId,
        event_type: AuditEventType,
        network_id: NetworkId,
        transaction_hash: Option<TxHash>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity_id,
            event_type,
            network_id,
            transaction_hash,
            description: description.into(),
            recorded_at: Utc::now(),
        }
    }
}

/// Destination for audit events. Sinks must never fail the calling
/// workflow; losing an event is preferable to failing a mint.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// In-memory sink, also the test double
pub struct MemoryAuditSink {
    events: RwLock<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
        }
    }

    /// Full trail in insertion order
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().clone()
    }

    /// Trail filtered to one entity
    pub fn events_for(&self, entity: &EntityId) -> Vec<AuditEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| &e.entity_id == entity)
            .cloned()
            .collect()
    }
}

impl Default for MemoryAuditSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        self.events.write().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_filtered_per_entity() {
        let sink = MemoryAuditSink::new();
        sink.record(AuditEvent::new(
            EntityId::new("E1"),
            AuditEventType::PrimaryMinted,
            NetworkId::new("POLY"),
            Some(TxHash::new("0xaa")),
            "minted token 1",
        ));
        sink.record(AuditEvent::new(
            EntityId::new("E2"),
            AuditEventType::MintFailed,
            NetworkId::new("POLY"),
            None,
            "execution reverted",
        ));

        assert_eq!(sink.events().len(), 2);
        let e1 = sink.events_for(&EntityId::new("E1"));
        assert_eq!(e1.len(), 1);
        assert_eq!(e1[0].event_type, AuditEventType::PrimaryMinted);
        assert!(e1[0].transaction_hash.is_some());
    }
}
