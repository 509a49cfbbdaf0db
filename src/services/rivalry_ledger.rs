use std::collections::HashMap;

use log::{debug, error, info, warn};
use rusqlite::{Connection, TransactionBehavior};

use crate::config::settings::RivalrySettings;
use crate::database::{self, opponents, rivalries, DbPool};
use crate::domain::{LeaderboardEntry, Round, RoundContext};
use crate::errors::LedgerResult;
use crate::leaderboard::on_platform_entries;
use crate::rivalry::{
    detect_changes, formed_change, order_changes, record_match, start_rivalry, Matchup,
    RivalryChange,
};

/// What happened to one pair for one event
#[derive(Debug, Clone, PartialEq)]
pub enum PairApplication {
    /// Counters bumped; changes are empty below the threshold
    Applied(Vec<RivalryChange>),
    /// This pair was already recorded for this event
    AlreadyApplied,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RivalryReport {
    pub changes: Vec<RivalryChange>,
    pub applied: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub skipped_by_cap: usize,
}

impl RivalryReport {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Applies one shared round to a pair.
///
/// The marker check, both shared-round counters, the rivalry write and the
/// marker insert share one transaction, so a pair is either fully applied
/// for the event or not at all.
pub fn apply_matchup(
    conn: &mut Connection,
    matchup: &Matchup,
    settings: &RivalrySettings,
) -> LedgerResult<PairApplication> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    if rivalries::is_applied(&tx, &matchup.pair_key, matchup.event_id)? {
        return Ok(PairApplication::AlreadyApplied);
    }

    let player_a = &matchup.player_a.player_id;
    let player_b = &matchup.player_b.player_id;
    let shared_a = opponents::increment_shared_rounds(&tx, player_a, player_b)?;
    let shared_b = opponents::increment_shared_rounds(&tx, player_b, player_a)?;
    let shared = shared_a.min(shared_b);

    let changes = match rivalries::find_by_key(&tx, &matchup.pair_key)? {
        Some(before) => {
            let after = record_match(&before, matchup, settings);
            rivalries::update_rivalry(&tx, &after, before.version)?;
            detect_changes(&before, &after, settings)
        }
        None if shared >= settings.min_shared_rounds => {
            let created = start_rivalry(matchup, settings);
            rivalries::insert_rivalry(&tx, &created)?;
            vec![formed_change(&created, shared)]
        }
        None => {
            debug!(
                "Pair {} has {} shared rounds; below threshold",
                matchup.pair_key, shared
            );
            Vec::new()
        }
    };

    rivalries::mark_applied(&tx, &matchup.pair_key, matchup.event_id)?;
    tx.commit()?;

    Ok(PairApplication::Applied(changes))
}

/// Every unordered pair of on-platform players, best placed first, truncated
/// to `max_pairs`. Returns the pairs and how many were dropped.
pub fn select_pairs(
    leaderboard: &[LeaderboardEntry],
    max_pairs: usize,
) -> (Vec<(&LeaderboardEntry, &LeaderboardEntry)>, usize) {
    let players = on_platform_entries(leaderboard);
    let mut pairs = Vec::new();

    for (i, first) in players.iter().enumerate() {
        for second in &players[i + 1..] {
            if first.player_id != second.player_id {
                pairs.push((*first, *second));
            }
        }
    }

    let total = pairs.len();
    pairs.truncate(max_pairs);
    let skipped = total - pairs.len();
    (pairs, skipped)
}

pub struct RivalryLedger<'a> {
    pool: &'a DbPool,
    settings: &'a RivalrySettings,
    max_attempts: u32,
}

impl<'a> RivalryLedger<'a> {
    pub fn new(pool: &'a DbPool, settings: &'a RivalrySettings, max_attempts: u32) -> Self {
        Self {
            pool,
            settings,
            max_attempts,
        }
    }

    /// Updates every eligible pair of a finalized event. A failing pair is
    /// logged and counted; the other pairs still go through.
    pub fn process_event(
        &self,
        event_id: &str,
        leaderboard: &[LeaderboardEntry],
        rounds: &[Round],
    ) -> LedgerResult<RivalryReport> {
        let Some(fallback) = rounds.first().map(|r| &r.context) else {
            return Ok(RivalryReport::default());
        };
        let contexts: HashMap<&str, &RoundContext> = rounds
            .iter()
            .map(|r| (r.group_id.as_str(), &r.context))
            .collect();

        let cap = self.settings.max_pairs_per_event;
        let (pairs, skipped_by_cap) = select_pairs(leaderboard, cap);
        if skipped_by_cap > 0 {
            info!(
                "Event {}: pair cap {} reached, {} pairs skipped",
                event_id, cap, skipped_by_cap
            );
        }

        let mut report = RivalryReport {
            skipped_by_cap,
            ..RivalryReport::default()
        };

        for (first, second) in pairs {
            let context = contexts
                .get(first.group_id.as_str())
                .copied()
                .unwrap_or(fallback);
            let matchup = Matchup::new(event_id, context, first, second);

            match self.apply_with_retry(&matchup) {
                Ok(PairApplication::Applied(changes)) => {
                    report.applied += 1;
                    report.changes.extend(changes);
                }
                Ok(PairApplication::AlreadyApplied) => {
                    debug!("Pair {} already applied for event {}", matchup.pair_key, event_id);
                    report.duplicates += 1;
                }
                Err(e) => {
                    error!("Pair {} failed for event {}: {}", matchup.pair_key, event_id, e);
                    report.failed += 1;
                }
            }
        }

        order_changes(&mut report.changes);
        if report.failed > 0 {
            warn!(
                "Event {}: {} pairs failed; they will be retried on redelivery",
                event_id, report.failed
            );
        }

        Ok(report)
    }

    fn apply_with_retry(&self, matchup: &Matchup) -> LedgerResult<PairApplication> {
        let label = format!("rivalry {}", matchup.pair_key);
        database::with_retry(self.max_attempts, &label, || {
            let mut conn = self.pool.get()?;
            apply_matchup(&mut conn, matchup, self.settings)
        })
    }
}
