//! sports-mapper: resolves id-encoded sports events into readable labels.
//!
//! Single-binary Tokio application that:
//! 1. Polls the mapping feed into a temporal mapping store
//! 2. Lets the store evict mappings the feed stopped refreshing
//! 3. Optionally verifies and transforms a file of persisted events

mod config;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use chrono::{SecondsFormat, Utc};
use clap::Parser;
use serde_json::json;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use common::{AppConfig, PersistedSportEvent, SportEvent};
use event_mapping::{EventMappingService, HttpMappingSource};
use mapping_store::TemporalMappingStore;

/// Sports event mapping service
#[derive(Parser)]
#[command(name = "sports-mapper", about = "Resolve sports feed ids into labels")]
struct Cli {
    /// Fetch mappings once, report the store size, then exit.
    #[arg(long)]
    once: bool,

    /// Transform a JSON-lines file of persisted events after the first
    /// mapping refresh, printing one JSON line per event, then exit.
    #[arg(long, value_name = "PATH")]
    events: Option<PathBuf>,
}

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn build_service(cfg: &AppConfig) -> Result<EventMappingService, common::Error> {
    let store = Arc::new(TemporalMappingStore::new(
        Duration::from_millis(cfg.max_age_ms),
        Duration::from_millis(cfg.store_sweep_interval_ms),
    ));
    let source = Arc::new(HttpMappingSource::new(cfg.mappings_api.clone())?);
    Ok(EventMappingService::new(store, source))
}

/// Verify then transform every JSON line from `reader`, handing each
/// display-ready event to `emit`. Returns (transformed, rejected).
async fn transform_lines<R: AsyncBufRead + Unpin>(
    service: &EventMappingService,
    reader: R,
    mut emit: impl FnMut(&SportEvent),
) -> Result<(usize, usize), common::Error> {
    let mut lines = reader.lines();
    let (mut line_no, mut transformed, mut rejected) = (0usize, 0usize, 0usize);

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let persisted: PersistedSportEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(e) => {
                warn!("Line {}: not a persisted event: {}", line_no, e);
                rejected += 1;
                continue;
            }
        };

        let result = service
            .verify_event_mappings(&persisted)
            .and_then(|()| service.transform_event(&persisted));
        match result {
            Ok(event) => {
                emit(&event);
                transformed += 1;
            }
            Err(e) => {
                warn!("Event {} not processable yet: {}", persisted.id, e);
                rejected += 1;
            }
        }
    }

    Ok((transformed, rejected))
}

async fn transform_file(
    service: &EventMappingService,
    path: &Path,
) -> Result<(usize, usize), common::Error> {
    let file = tokio::fs::File::open(path).await?;
    transform_lines(service, BufReader::new(file), |event| {
        println!("{}", json!({ "ts": now_iso(), "event": event }));
    })
    .await
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "sports_mapper=info,event_mapping=info,mapping_store=info,common=info".into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    info!("Sports mapper starting up...");

    // Load configuration.
    let cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Mappings: {} every {}ms (max_age={}ms, sweep={}ms)",
        cfg.mappings_api, cfg.polling_interval_ms, cfg.max_age_ms, cfg.store_sweep_interval_ms,
    );
    info!("Events feed: {}", cfg.sports_events_api);

    let service = match build_service(&cfg) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to initialize mapping service: {}", e);
            std::process::exit(1);
        }
    };

    // ── One-shot modes ───────────────────────────────────────────────
    if cli.once || cli.events.is_some() {
        let written = service.update_mappings().await;
        info!(
            "Mapping refresh wrote {} entries; store holds {}",
            written,
            service.store().len()
        );

        let mut exit_code = 0;
        if let Some(path) = &cli.events {
            match transform_file(&service, path).await {
                Ok((transformed, rejected)) => {
                    info!("Transformed {} event(s), rejected {}", transformed, rejected);
                }
                Err(e) => {
                    error!("Failed to read {}: {}", path.display(), e);
                    exit_code = 1;
                }
            }
        }

        service.stop_polling();
        if exit_code != 0 {
            std::process::exit(exit_code);
        }
        return;
    }

    // ── Poll until shutdown ──────────────────────────────────────────
    service.start_polling(Duration::from_millis(cfg.polling_interval_ms));

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // First tick completes immediately.
    heartbeat.tick().await;

    info!("Sports mapper is running. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            _ = heartbeat.tick() => {
                info!(
                    "HEARTBEAT: mappings={} polling={}",
                    service.store().len(),
                    service.is_polling()
                );
            }
        }
    }

    service.stop_polling();
    info!("Sports mapper stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENTS: &str = r#"{"id":"e1","sportId":"s1","competitionId":"c1","startTime":"2024-01-01T00:00:00Z","homeCompetitorId":"h1","awayCompetitorId":"a1","statusId":"st1","scores":"p1@1:0"}

not json
{"id":"e2","sportId":"s404","competitionId":"c1","homeCompetitorId":"h1","awayCompetitorId":"a1","statusId":"st1","scores":""}
{"id":"e3","sportId":"s1","competitionId":"c1","homeCompetitorId":"h1","awayCompetitorId":"a1","statusId":"st1","scores":""}
"#;

    fn seeded_service() -> EventMappingService {
        let store = Arc::new(TemporalMappingStore::new(
            Duration::from_secs(60),
            Duration::from_secs(5),
        ));
        for (id, label) in [
            ("s1", "FOOTBALL"),
            ("c1", "Premier League"),
            ("st1", "LIVE"),
            ("h1", "Team A"),
            ("a1", "Team B"),
            ("p1", "CURRENT"),
        ] {
            store.set(id, label);
        }
        let source = HttpMappingSource::new("http://127.0.0.1:9/mappings")
            .expect("client should build");
        EventMappingService::new(store, Arc::new(source))
    }

    #[tokio::test]
    async fn test_transform_lines_counts_and_emits() {
        let service = seeded_service();
        let mut emitted = Vec::new();

        let (transformed, rejected) =
            transform_lines(&service, EVENTS.as_bytes(), |event| emitted.push(event.clone()))
                .await
                .expect("in-memory read cannot fail");

        assert_eq!((transformed, rejected), (2, 2));
        let ids: Vec<&str> = emitted.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e3"]);
        assert_eq!(emitted[0].sport, "FOOTBALL");
        assert_eq!(emitted[1].scores, common::SportEventScores::NotAvailable);

        service.stop_polling();
    }

    #[tokio::test]
    async fn test_transform_file_missing_path_is_io_error() {
        let service = seeded_service();
        let err = transform_file(&service, Path::new("/nonexistent/events.jsonl"))
            .await
            .unwrap_err();
        assert!(matches!(err, common::Error::Io(_)));

        service.stop_polling();
    }
}
