//! Stock event handlers: audit trail and metrics.
//!
//! Both are pure side effects — they observe committed facts and can never
//! influence the write that produced them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use finledger_accounting::{LedgerEvent, LedgerEventKind};
use finledger_events::{Event, EventBus, EventHandler};

/// Register one handler for every ledger event kind.
pub fn subscribe_all(bus: &EventBus<LedgerEvent>, handler: Arc<dyn EventHandler<LedgerEvent>>) {
    for kind in LedgerEventKind::ALL {
        bus.subscribe(kind, handler.clone());
    }
}

/// Writes a structured audit record for every committed mutation.
///
/// The audit trail is append-only by construction: it only ever sees events,
/// and events are only published after a successful commit.
#[derive(Debug, Default)]
pub struct AuditLogHandler;

impl AuditLogHandler {
    pub fn new() -> Self {
        Self
    }
}

impl EventHandler<LedgerEvent> for AuditLogHandler {
    fn name(&self) -> &str {
        "audit-log"
    }

    fn handle(&self, event: &LedgerEvent) -> anyhow::Result<()> {
        let payload = serde_json::to_string(event)?;
        tracing::info!(
            target: "finledger::audit",
            event_type = event.event_type(),
            occurred_at = %event.occurred_at(),
            %payload,
            "domain event"
        );
        Ok(())
    }
}

/// Counts committed events per type.
#[derive(Debug, Default)]
pub struct MetricsHandler {
    counts: Mutex<HashMap<&'static str, u64>>,
}

impl MetricsHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of event counts keyed by event type name.
    pub fn counts(&self) -> HashMap<&'static str, u64> {
        match self.counts.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn count_of(&self, event_type: &str) -> u64 {
        self.counts().get(event_type).copied().unwrap_or(0)
    }
}

impl EventHandler<LedgerEvent> for MetricsHandler {
    fn name(&self) -> &str {
        "metrics"
    }

    fn handle(&self, event: &LedgerEvent) -> anyhow::Result<()> {
        let mut counts = self
            .counts
            .lock()
            .map_err(|_| anyhow::anyhow!("metrics counters poisoned"))?;
        *counts.entry(event.event_type()).or_insert(0) += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use finledger_accounting::{AccountCreated, AccountType, CurrencyCode};
    use finledger_core::AccountId;

    fn created_event() -> LedgerEvent {
        LedgerEvent::AccountCreated(AccountCreated {
            account_id: AccountId::new(),
            code: "Assets:Checking".into(),
            account_type: AccountType::Asset,
            currency: CurrencyCode::new("USD").unwrap(),
            occurred_at: Utc::now(),
        })
    }

    #[test]
    fn metrics_handler_counts_per_event_type() {
        let metrics = Arc::new(MetricsHandler::new());
        let bus: EventBus<LedgerEvent> = EventBus::new();
        subscribe_all(&bus, metrics.clone());
        for kind in LedgerEventKind::ALL {
            assert_eq!(bus.handler_count(kind), 1);
        }

        bus.publish(&created_event());
        bus.publish(&created_event());

        assert_eq!(metrics.count_of("ledger.account.created"), 2);
        assert_eq!(metrics.count_of("ledger.transaction.recorded"), 0);
    }

    #[test]
    fn audit_handler_serializes_every_event() {
        let audit = AuditLogHandler::new();
        assert!(audit.handle(&created_event()).is_ok());
    }
}
