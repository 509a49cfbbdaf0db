use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info, warn};
use serde::Deserialize;

use super::notification::LogNotifier;
use super::pipeline::{DeliveryOutcome, RoundPipeline};
use crate::config::settings::AppConfig;
use crate::database::{self, events, series, DbConn};
use crate::domain::{EventSpec, Round, SeriesSpec};
use crate::errors::{LedgerError, LedgerResult};

/// Deliveries of one round while some rivalry pairs keep failing
const REDELIVERY_ATTEMPTS: u32 = 3;

/// Batch file accepted by `ingest`: registrations first, then round
/// deliveries in file order.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestBatch {
    #[serde(default)]
    pub series: Vec<SeriesSpec>,
    #[serde(default)]
    pub events: Vec<EventSpec>,
    #[serde(default)]
    pub rounds: Vec<Round>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub delivered: usize,
    pub discarded: usize,
    pub finalized: usize,
    /// Rounds whose event still has rivalry pairs left to apply
    pub incomplete: usize,
}

pub struct IngestionService {
    pipeline: RoundPipeline,
}

impl IngestionService {
    pub fn new(config: AppConfig) -> Result<Self> {
        let pool = database::create_pool(&config.database)?;
        let conn = database::get_connection(&pool)?;
        database::setup::ensure_schema(&conn)?;

        Ok(Self::with_pipeline(RoundPipeline::new(pool, config, Arc::new(LogNotifier))))
    }

    pub fn with_pipeline(pipeline: RoundPipeline) -> Self {
        Self { pipeline }
    }

    pub fn run(&self, path: &Path) -> Result<()> {
        info!("=== Starting Ingestion ===\n");

        let batch = Self::load_batch(path)?;
        info!(
            "  → Loaded {} series, {} events, {} rounds\n",
            batch.series.len(),
            batch.events.len(),
            batch.rounds.len()
        );

        let summary = self.ingest(&batch)?;
        info!(
            "  → {} rounds delivered, {} discarded, {} events finalized\n",
            summary.delivered, summary.discarded, summary.finalized
        );
        if summary.incomplete > 0 {
            warn!(
                "  → {} rounds left rivalry pairs unapplied; ingest the batch again to resume\n",
                summary.incomplete
            );
        }

        info!("=== Ingestion Complete ===");
        Ok(())
    }

    fn load_batch(path: &Path) -> Result<IngestBatch> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse batch file {}", path.display()))
    }

    pub fn ingest(&self, batch: &IngestBatch) -> Result<IngestSummary> {
        let mut conn = database::get_connection(self.pipeline.pool())?;
        self.register(&mut conn, batch)?;
        drop(conn);

        let mut summary = IngestSummary::default();
        for round in &batch.rounds {
            match self.deliver(round) {
                Ok(outcome) => {
                    summary.delivered += 1;
                    if outcome.finalized {
                        summary.finalized += 1;
                    }
                }
                Err(e) if e.is_fatal_for_delivery() => {
                    error!("Round {} discarded: {}", round.round_id, e);
                    summary.discarded += 1;
                }
                Err(e @ LedgerError::PartialRivalryFailure { .. }) => {
                    error!("Round {} incomplete: {}", round.round_id, e);
                    summary.incomplete += 1;
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to deliver round {}", round.round_id));
                }
            }
        }

        Ok(summary)
    }

    // Redelivers while rivalry pairs fail; finished pairs are skipped each time
    fn deliver(&self, round: &Round) -> LedgerResult<DeliveryOutcome> {
        let mut attempt = 1;
        loop {
            match self.pipeline.handle_round(round) {
                Err(e @ LedgerError::PartialRivalryFailure { .. })
                    if attempt < REDELIVERY_ATTEMPTS =>
                {
                    warn!(
                        "Round {} attempt {}/{}: {}",
                        round.round_id, attempt, REDELIVERY_ATTEMPTS, e
                    );
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    fn register(&self, conn: &mut DbConn, batch: &IngestBatch) -> Result<()> {
        for spec in &batch.series {
            if !series::insert_series(conn, spec)? {
                info!("  Series {} already registered", spec.series_id);
            }
        }

        for spec in &batch.events {
            if !events::insert_event(conn, spec)? {
                info!("  Event {} already registered", spec.event_id);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::setup::test_support::temp_pool;

    fn service(label: &str) -> IngestionService {
        let notifier = Arc::new(LogNotifier);
        let pipeline = RoundPipeline::new(temp_pool(label), AppConfig::new(), notifier);
        IngestionService::with_pipeline(pipeline)
    }

    const BATCH: &str = r#"{
        "events": [
            {
                "eventId": "sat",
                "name": "Saturday Outing",
                "groups": [
                    {"groupId": "g1", "playerIds": ["amy", "ben"]},
                    {"groupId": "g2", "playerIds": ["cal"]}
                ]
            }
        ],
        "rounds": [
            {
                "roundId": "sat-g1",
                "eventId": "sat",
                "groupId": "g1",
                "status": "complete",
                "context": {
                    "course": "Pebble",
                    "playedAt": "2026-05-02T08:00:00Z",
                    "holePars": [4, 3, 5]
                },
                "players": [
                    {"playerId": "amy", "displayName": "Amy", "holeStrokes": [4, 3, 5], "handicapStrokes": 0},
                    {"playerId": "ben", "displayName": "Ben", "holeStrokes": [5, 4, 6], "handicapStrokes": 2}
                ]
            },
            {
                "roundId": "nowhere-g1",
                "eventId": "nowhere",
                "groupId": "g1",
                "status": "complete",
                "context": {"course": "Pebble", "playedAt": "2026-05-02T08:00:00Z", "holePars": []},
                "players": []
            },
            {
                "roundId": "sat-g2",
                "eventId": "sat",
                "groupId": "g2",
                "status": "complete",
                "context": {
                    "course": "Pebble",
                    "playedAt": "2026-05-02T08:10:00Z",
                    "holePars": [4, 3, 5]
                },
                "players": [
                    {"playerId": "cal", "displayName": "Cal", "holeStrokes": [4, 4, 5], "handicapStrokes": 0, "onPlatform": false}
                ]
            }
        ]
    }"#;

    #[test]
    fn test_batch_is_delivered_in_order() {
        let service = service("ingest");
        let batch: IngestBatch = serde_json::from_str(BATCH).unwrap();

        let summary = service.ingest(&batch).unwrap();
        assert_eq!(
            summary,
            IngestSummary {
                delivered: 2,
                discarded: 1,
                finalized: 1,
                incomplete: 0,
            }
        );

        let conn = database::get_connection(service.pipeline.pool()).unwrap();
        let event = events::find_event(&conn, "sat").unwrap().unwrap();
        let board = event.final_leaderboard.unwrap();
        assert_eq!(board.len(), 3);
        assert_eq!(board[0].player_id, "amy");
        assert_eq!(board[0].rank, 1);
    }

    #[test]
    fn test_failing_pair_is_redelivered_then_resumed_by_next_ingest() {
        let service = service("ingest_partial");
        let batch: IngestBatch = serde_json::from_str(BATCH).unwrap();
        let conn = database::get_connection(service.pipeline.pool()).unwrap();
        conn.execute_batch(
            "CREATE TRIGGER reject_amy_ben BEFORE INSERT ON rivalry_applications
             WHEN NEW.pair_key = 'amy_ben'
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .unwrap();

        let summary = service.ingest(&batch).unwrap();
        assert_eq!(summary.incomplete, 1);
        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.discarded, 1);

        let event = events::find_event(&conn, "sat").unwrap().unwrap();
        assert!(event.final_leaderboard.is_some());
        assert!(!event.rivalries_processed);

        conn.execute_batch("DROP TRIGGER reject_amy_ben;").unwrap();
        let again = service.ingest(&batch).unwrap();
        assert_eq!(again.incomplete, 0);
        assert_eq!(again.delivered, 2);

        let event = events::find_event(&conn, "sat").unwrap().unwrap();
        assert!(event.rivalries_processed);
        let shared = database::opponents::shared_rounds(&conn, "amy", "ben").unwrap();
        assert_eq!(shared, 1);
    }
}
