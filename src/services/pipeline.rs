use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;

use super::notification::Notifier;
use super::rivalry_ledger::RivalryLedger;
use super::standings::rebuild_standings;
use crate::config::settings::AppConfig;
use crate::database::{self, events, feed, rounds, DbPool, EventRecord};
use crate::domain::{LeaderboardEntry, Round, RoundStatus};
use crate::errors::{LedgerError, LedgerResult};
use crate::leaderboard::build_leaderboard;
use crate::rivalry::{notifiable, select_feed_cards, FeedCard, RivalryChange};

/// Result of one round delivery, as reported back to the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOutcome {
    pub event_id: String,
    pub group_id: String,
    pub completed_groups: u32,
    pub total_groups: u32,
    /// The group had already been recorded by an earlier delivery
    pub duplicate: bool,
    /// This delivery materialized the final leaderboard
    pub finalized: bool,
    pub rivalry_changes: usize,
    pub standings_updated: bool,
}

struct Finalization {
    event: EventRecord,
    leaderboard: Vec<LeaderboardEntry>,
    finalized_now: bool,
}

/// Runs one finished round through barrier, leaderboard, rivalries and
/// standings. Every step can be repeated safely, so a failed delivery is
/// simply delivered again.
#[derive(Clone)]
pub struct RoundPipeline {
    pool: DbPool,
    config: AppConfig,
    notifier: Arc<dyn Notifier>,
}

impl RoundPipeline {
    pub fn new(pool: DbPool, config: AppConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            pool,
            config,
            notifier,
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn handle_round(&self, round: &Round) -> LedgerResult<DeliveryOutcome> {
        if round.status == RoundStatus::Live {
            return Err(LedgerError::RoundNotFinished(round.round_id.clone()));
        }

        let attempts = self.config.database.max_attempts;
        let label = format!("barrier {}/{}", round.event_id, round.group_id);
        let barrier = database::with_retry(attempts, &label, || {
            let mut conn = self.pool.get()?;
            events::complete_group(&mut conn, round)
        })?;

        let mut outcome = DeliveryOutcome {
            event_id: round.event_id.clone(),
            group_id: round.group_id.clone(),
            completed_groups: barrier.completed_groups,
            total_groups: barrier.total_groups,
            duplicate: !barrier.newly_completed,
            ..DeliveryOutcome::default()
        };

        if barrier.newly_completed {
            info!(
                "Event {}: group {} complete ({}/{})",
                round.event_id, round.group_id, barrier.completed_groups, barrier.total_groups
            );
        } else {
            info!(
                "Event {}: duplicate signal for group {} ignored",
                round.event_id, round.group_id
            );
        }

        if !barrier.is_complete() {
            return Ok(outcome);
        }

        let finalization = self.finalize(&round.event_id)?;
        outcome.finalized = finalization.finalized_now;
        if finalization.finalized_now {
            self.notifier
                .announce_leaderboard(&round.event_id, &finalization.leaderboard);
        }

        let mut pairs_failed = 0;
        if !finalization.event.rivalries_processed {
            let event_id = &round.event_id;
            let (changes, failed) = self.process_rivalries(event_id, &finalization.leaderboard)?;
            outcome.rivalry_changes = changes;
            pairs_failed = failed;
        }

        if finalization.finalized_now {
            outcome.standings_updated = self.update_standings(&finalization.event);
        }

        if pairs_failed > 0 {
            return Err(LedgerError::PartialRivalryFailure {
                event_id: round.event_id.clone(),
                failed: pairs_failed,
            });
        }

        Ok(outcome)
    }

    // Materializes the leaderboard once; later callers read the stored one
    fn finalize(&self, event_id: &str) -> LedgerResult<Finalization> {
        let label = format!("finalize {}", event_id);
        database::with_retry(self.config.database.max_attempts, &label, || {
            let mut conn = self.pool.get()?;
            let event = events::find_event(&conn, event_id)?
                .ok_or_else(|| LedgerError::EventNotFound(event_id.to_string()))?;

            if event.is_complete() {
                let leaderboard = event.final_leaderboard.clone().unwrap_or_default();
                return Ok(Finalization {
                    event,
                    leaderboard,
                    finalized_now: false,
                });
            }

            let stored_rounds = rounds::list_for_event(&conn, event_id)?;
            let leaderboard = build_leaderboard(&stored_rounds);
            let claimed =
                events::claim_finalization(&mut conn, event_id, event.version, &leaderboard)?;

            if claimed {
                info!(
                    "Event {} finalized with {} leaderboard entries",
                    event_id,
                    leaderboard.len()
                );
                return Ok(Finalization {
                    event,
                    leaderboard,
                    finalized_now: true,
                });
            }

            let stored = events::find_event(&conn, event_id)?
                .ok_or_else(|| LedgerError::EventNotFound(event_id.to_string()))?;
            let leaderboard = stored.final_leaderboard.clone().unwrap_or_default();
            Ok(Finalization {
                event: stored,
                leaderboard,
                finalized_now: false,
            })
        })
    }

    fn process_rivalries(
        &self,
        event_id: &str,
        leaderboard: &[LeaderboardEntry],
    ) -> LedgerResult<(usize, usize)> {
        let stored_rounds = {
            let conn = self.pool.get()?;
            rounds::list_for_event(&conn, event_id)?
        };

        let ledger = RivalryLedger::new(
            &self.pool,
            &self.config.rivalry,
            self.config.database.max_attempts,
        );
        let report = ledger.process_event(event_id, leaderboard, &stored_rounds)?;
        info!(
            "Event {}: {} pairs applied, {} already applied, {} failed, {} changes",
            event_id,
            report.applied,
            report.duplicates,
            report.failed,
            report.changes.len()
        );

        self.announce_changes(event_id, &report.changes);

        if report.is_complete() {
            let conn = self.pool.get()?;
            events::mark_rivalries_processed(&conn, event_id)?;
        }

        Ok((report.changes.len(), report.failed))
    }

    fn announce_changes(&self, event_id: &str, changes: &[RivalryChange]) {
        let alerts = notifiable(changes);
        if !alerts.is_empty() {
            self.notifier.push_rivalry_alerts(event_id, &alerts);
        }

        let cards = select_feed_cards(changes, self.config.feed.max_cards_per_user);
        if cards.is_empty() {
            return;
        }

        match self.reserve_cards(event_id, cards) {
            Ok(cards) if !cards.is_empty() => self.notifier.publish_feed_cards(event_id, &cards),
            Ok(_) => debug!("Event {}: feed quota already used up", event_id),
            Err(e) => warn!("Event {}: feed cards not published: {}", event_id, e),
        }
    }

    // The cap counts every card issued for the event, across passes
    fn reserve_cards(
        &self,
        event_id: &str,
        cards: Vec<FeedCard>,
    ) -> LedgerResult<Vec<FeedCard>> {
        let conn = self.pool.get()?;
        let cap = self.config.feed.max_cards_per_user as u32;

        let mut kept = Vec::with_capacity(cards.len());
        for card in cards {
            if feed::reserve_card(&conn, event_id, &card.recipient, cap)? {
                kept.push(card);
            }
        }
        Ok(kept)
    }

    // A standings failure never undoes the finalized event
    fn update_standings(&self, event: &EventRecord) -> bool {
        let (Some(series_id), Some(round_index)) = (&event.series_id, event.round_index) else {
            return false;
        };

        let rebuilt = self
            .pool
            .get()
            .map_err(LedgerError::from)
            .and_then(|conn| rebuild_standings(&conn, series_id, round_index));

        match rebuilt {
            Ok(snapshot) => {
                self.notifier.publish_standings(&snapshot);
                true
            }
            Err(e) => {
                warn!(
                    "Standings for series {} not updated after event {}: {}",
                    series_id, event.event_id, e
                );
                false
            }
        }
    }
}
