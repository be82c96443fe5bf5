use std::{collections::BTreeMap, time::SystemTime};

use tracing::{info, Level};
use tracing_subscriber::Layer;

use super::{EventSpan, LogEvent};

/// Aggregates `LogEvent`s emitted through `log_event!` into the enclosing
/// span and logs a single entry when a top-level span closes.
#[derive(Default)]
pub struct CatalogLogsLayer;

impl<S> Layer<S> for CatalogLogsLayer
where
    S: tracing::Subscriber,
    S: for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_new_span(
        &self,
        _attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        if *span.metadata().level() > Level::INFO {
            return;
        }

        let mut extensions = span.extensions_mut();
        extensions.insert(EventSpan::new(span.name()));
        extensions.insert(StartTime(SystemTime::now()));
    }

    fn on_close(&self, id: tracing::span::Id, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        if *span.metadata().level() > Level::INFO {
            return;
        }

        let mut extensions = span.extensions_mut();
        if let Some(mut event_span) = extensions.remove::<EventSpan>() {
            event_span.latency = match extensions.remove::<StartTime>() {
                Some(start) => SystemTime::now()
                    .duration_since(start.0)
                    .map(|elapsed| elapsed.as_millis() as u64)
                    .unwrap_or_default(),
                None => 0,
            };

            // Attach to the closest ancestor that aggregates events. Spans
            // below INFO carry no `EventSpan` and are skipped.
            for ancestor in span.scope().skip(1) {
                let mut extensions = ancestor.extensions_mut();
                if let Some(parent_event_span) = extensions.get_mut::<EventSpan>() {
                    parent_event_span.children.push(event_span);
                    return;
                }
            }

            if !event_span.is_empty() {
                info!(
                    labels.log_type = "catalog_logs",
                    entry = serde_json::to_string(&event_span).unwrap_or_default(),
                    "log entry",
                )
            }
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut fields = BTreeMap::new();
        let mut visitor = JsonVisitor(&mut fields);
        event.record(&mut visitor);

        let Some(log) = fields
            .get("event")
            .and_then(|e| e.as_str())
            .and_then(LogEvent::decode)
        else {
            return;
        };

        if let Some(scope) = ctx.event_scope(event) {
            for span in scope {
                let mut extensions = span.extensions_mut();
                if let Some(event_span) = extensions.get_mut::<EventSpan>() {
                    event_span.add(log);
                    return;
                }
            }
        }
    }
}

struct StartTime(SystemTime);

struct JsonVisitor<'a>(&'a mut BTreeMap<String, serde_json::Value>);

impl<'a> tracing::field::Visit for JsonVisitor<'a> {
    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(
            field.name().to_string(),
            serde_json::json!(format!("{:?}", value)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::SessionAuth,
        cache::{
            testing::{catalog_offer, FakeCatalogApi},
            OfferCatalog,
        },
        storage::MemoryStore,
    };
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };
    use tracing_subscriber::layer::SubscriberExt;

    /// Collects the `entry` field of every `catalog_logs` line.
    #[derive(Clone, Default)]
    struct Entries(Arc<Mutex<Vec<String>>>);

    impl<S: tracing::Subscriber> Layer<S> for Entries {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let mut fields = BTreeMap::new();
            event.record(&mut JsonVisitor(&mut fields));
            if fields.get("labels.log_type").and_then(|v| v.as_str()) != Some("catalog_logs") {
                return;
            }
            if let Some(entry) = fields.get("entry").and_then(|v| v.as_str()) {
                self.0.lock().unwrap().push(entry.to_owned());
            }
        }
    }

    #[tokio::test]
    async fn one_entry_per_catalog_operation() {
        let entries = Entries::default();
        let subscriber = tracing_subscriber::registry()
            .with(CatalogLogsLayer)
            .with(entries.clone());
        let _guard = tracing::subscriber::set_default(subscriber);

        let api = Arc::new(FakeCatalogApi::new());
        api.add_public_offer(catalog_offer("OFR-1", "Game"), 1000);
        let catalog = OfferCatalog::new(
            api.clone(),
            Arc::new(MemoryStore::new()),
            Arc::new(SessionAuth::new()),
            "en_US",
            "/default.jpg",
        )
        .unwrap();

        catalog.get_offer("OFR-1").await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        catalog.invalidate("OFR-1").await.unwrap();
        catalog.get_offer("OFR-1").await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let entries = entries.0.lock().unwrap().clone();
        assert_eq!(entries.len(), 3);

        let first: EventSpan = serde_json::from_str(&entries[0]).unwrap();
        assert_eq!(first.name, "catalog::get_offer");
        assert!(first.events.iter().any(|event| matches!(
            event,
            LogEvent::Catalog(catalog_event) if catalog_event.fetch.is_some()
        )));

        let second: EventSpan = serde_json::from_str(&entries[1]).unwrap();
        assert_eq!(second.name, "catalog::invalidate");
        assert!(!second.is_empty());
    }

    #[test]
    fn spans_below_info_are_folded_into_ancestor() {
        let entries = Entries::default();
        let subscriber = tracing_subscriber::registry()
            .with(CatalogLogsLayer)
            .with(entries.clone());

        tracing::subscriber::with_default(subscriber, || {
            let outer = tracing::info_span!("outer");
            let _outer = outer.enter();
            {
                let inner = tracing::trace_span!("inner");
                let _inner = inner.enter();
                crate::logging::CatalogEvent::cache_hit("OFR-1");
            }
            let child = tracing::info_span!("child");
            let _child = child.enter();
            crate::logging::CatalogEvent::coalesced("OFR-2");
        });

        let entries = entries.0.lock().unwrap().clone();
        assert_eq!(entries.len(), 1);
        let entry: EventSpan = serde_json::from_str(&entries[0]).unwrap();
        assert_eq!(entry.name, "outer");
        assert_eq!(entry.events.len(), 1);
        assert_eq!(entry.children.len(), 1);
        assert_eq!(entry.children[0].name, "child");
    }
}
