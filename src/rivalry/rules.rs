use std::collections::VecDeque;

use super::key::canonical_pair;
use super::types::{MatchRecord, MatchResult, RivalSide, Rivalry, Streak};
use crate::config::settings::RivalrySettings;
use crate::domain::{LeaderboardEntry, PlayerId, RoundContext};

/// Two on-platform leaderboard entries from the same event, in canonical
/// (sorted id) order regardless of how they were supplied.
#[derive(Debug, Clone)]
pub struct Matchup<'a> {
    pub pair_key: String,
    pub event_id: &'a str,
    pub context: &'a RoundContext,
    pub player_a: &'a LeaderboardEntry,
    pub player_b: &'a LeaderboardEntry,
}

impl<'a> Matchup<'a> {
    pub fn new(
        event_id: &'a str,
        context: &'a RoundContext,
        first: &'a LeaderboardEntry,
        second: &'a LeaderboardEntry,
    ) -> Self {
        let (low, _) = canonical_pair(&first.player_id, &second.player_id);
        let (player_a, player_b) = if low == first.player_id {
            (first, second)
        } else {
            (second, first)
        };

        Self {
            pair_key: super::key::pair_key(&player_a.player_id, &player_b.player_id),
            event_id,
            context,
            player_a,
            player_b,
        }
    }

    pub fn result(&self) -> MatchResult {
        MatchResult {
            event_id: self.event_id.to_string(),
            winner: decide_winner(self.player_a, self.player_b).cloned(),
            player_a_net: self.player_a.net,
            player_b_net: self.player_b.net,
            player_a_gross: self.player_a.gross,
            player_b_gross: self.player_b.gross,
            course: self.context.course.clone(),
            region: self.context.region.clone(),
            played_at: self.context.played_at,
        }
    }
}

/// Lower net wins; a net tie falls back to lower gross; equal gross is a tie.
pub fn decide_winner<'e>(
    first: &'e LeaderboardEntry,
    second: &'e LeaderboardEntry,
) -> Option<&'e PlayerId> {
    let by_net = first.net.cmp(&second.net);
    let ordering = by_net.then_with(|| first.gross.cmp(&second.gross));

    match ordering {
        std::cmp::Ordering::Less => Some(&first.player_id),
        std::cmp::Ordering::Greater => Some(&second.player_id),
        std::cmp::Ordering::Equal => None,
    }
}

/// Creates the rivalry record, seeded with the outcome of the match that
/// reached the shared-round threshold.
pub fn start_rivalry(matchup: &Matchup, settings: &RivalrySettings) -> Rivalry {
    let result = matchup.result();
    let mut rivalry = Rivalry {
        pair_key: matchup.pair_key.clone(),
        player_a: side(matchup.player_a),
        player_b: side(matchup.player_b),
        record: MatchRecord::default(),
        recent_results: VecDeque::with_capacity(settings.recent_results_cap),
        current_streak: Streak::default(),
        longest_streak: Streak::default(),
        belt_holder: None,
        total_matches: 0,
        first_match_at: result.played_at,
        last_match_at: result.played_at,
        version: 0,
    };

    apply_result(&mut rivalry, result, settings);
    rivalry
}

/// Returns the record after adding one more shared round. The input is
/// left untouched so the caller can diff before and after.
pub fn record_match(before: &Rivalry, matchup: &Matchup, settings: &RivalrySettings) -> Rivalry {
    let mut after = before.clone();
    after.player_a.display_name = matchup.player_a.display_name.clone();
    after.player_b.display_name = matchup.player_b.display_name.clone();
    apply_result(&mut after, matchup.result(), settings);
    after
}

fn side(entry: &LeaderboardEntry) -> RivalSide {
    RivalSide {
        player_id: entry.player_id.clone(),
        display_name: entry.display_name.clone(),
    }
}

fn apply_result(rivalry: &mut Rivalry, result: MatchResult, settings: &RivalrySettings) {
    match result.winner.as_deref() {
        Some(winner) if winner == rivalry.player_a.player_id => rivalry.record.wins += 1,
        Some(_) => rivalry.record.losses += 1,
        None => rivalry.record.ties += 1,
    }
    rivalry.total_matches += 1;

    rivalry.current_streak = next_streak(&rivalry.current_streak, result.winner.as_ref());
    if rivalry.current_streak.count > rivalry.longest_streak.count {
        rivalry.longest_streak = rivalry.current_streak.clone();
    }

    if result.played_at < rivalry.first_match_at {
        rivalry.first_match_at = result.played_at;
    }
    if result.played_at > rivalry.last_match_at {
        rivalry.last_match_at = result.played_at;
    }

    push_recent(&mut rivalry.recent_results, result, settings.recent_results_cap);

    rivalry.belt_holder = compute_belt(
        &rivalry.recent_results,
        rivalry.belt_holder.take(),
        &rivalry.player_a.player_id,
        &rivalry.player_b.player_id,
        settings.belt_window,
    );
}

/// Ties leave the streak exactly as it was.
fn next_streak(current: &Streak, winner: Option<&PlayerId>) -> Streak {
    match winner {
        None => current.clone(),
        Some(winner) if current.held_by(winner) => Streak {
            player_id: Some(winner.clone()),
            count: current.count + 1,
        },
        Some(winner) => Streak {
            player_id: Some(winner.clone()),
            count: 1,
        },
    }
}

fn push_recent(recent: &mut VecDeque<MatchResult>, result: MatchResult, cap: usize) {
    recent.push_front(result);
    recent.truncate(cap);
}

/// Better record over the newest `window` results; a level window keeps
/// whoever held the belt before.
fn compute_belt(
    recent: &VecDeque<MatchResult>,
    previous: Option<PlayerId>,
    player_a: &str,
    player_b: &str,
    window: usize,
) -> Option<PlayerId> {
    let (a_wins, b_wins) = recent
        .iter()
        .take(window)
        .fold((0u32, 0u32), |(a, b), r| match r.winner.as_deref() {
            Some(w) if w == player_a => (a + 1, b),
            Some(w) if w == player_b => (a, b + 1),
            _ => (a, b),
        });

    match a_wins.cmp(&b_wins) {
        std::cmp::Ordering::Greater => Some(player_a.to_string()),
        std::cmp::Ordering::Less => Some(player_b.to_string()),
        std::cmp::Ordering::Equal => previous,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    pub(crate) fn entry(id: &str, net: i32, gross: i32) -> LeaderboardEntry {
        LeaderboardEntry {
            rank: 0,
            player_id: id.to_string(),
            display_name: id.to_uppercase(),
            on_platform: true,
            group_id: "g1".to_string(),
            gross,
            net,
            to_par: 0,
            holes_completed: 18,
        }
    }

    pub(crate) fn context(day: i64) -> RoundContext {
        RoundContext {
            course: "Old Course".to_string(),
            played_at: Utc.with_ymd_and_hms(2026, 4, 1, 8, 0, 0).unwrap() + Duration::days(day),
            region: Some("Fife".to_string()),
            hole_pars: vec![],
        }
    }

    /// Plays a sequence of outcomes: 'A' = player a wins, 'B' = player b wins, 'T' = tie
    pub(crate) fn play(sequence: &str) -> Rivalry {
        let settings = RivalrySettings::default();
        let mut rivalry: Option<Rivalry> = None;

        for (idx, outcome) in sequence.chars().enumerate() {
            let (a_net, b_net) = match outcome {
                'A' => (70, 72),
                'B' => (72, 70),
                _ => (71, 71),
            };
            let a = entry("a", a_net, 80);
            let b = entry("b", b_net, 80);
            let ctx = context(idx as i64);
            let event_id = format!("e{}", idx);
            let matchup = Matchup::new(&event_id, &ctx, &a, &b);

            rivalry = Some(match rivalry {
                None => start_rivalry(&matchup, &settings),
                Some(before) => record_match(&before, &matchup, &settings),
            });
        }

        rivalry.expect("sequence must not be empty")
    }

    #[test]
    fn test_matchup_is_canonical_regardless_of_order() {
        let ctx = context(0);
        let x = entry("zoe", 70, 75);
        let y = entry("adam", 72, 75);
        let m = Matchup::new("e1", &ctx, &x, &y);
        assert_eq!(m.pair_key, "adam_zoe");
        assert_eq!(m.player_a.player_id, "adam");
        assert_eq!(m.result().winner.as_deref(), Some("zoe"));
    }

    #[test]
    fn test_winner_falls_back_to_gross_then_tie() {
        let a = entry("a", 70, 80);
        let b = entry("b", 70, 78);
        assert_eq!(decide_winner(&a, &b).map(String::as_str), Some("b"));

        let c = entry("c", 70, 78);
        assert_eq!(decide_winner(&b, &c), None);
    }

    #[test]
    fn test_creation_seeds_record_and_streak() {
        let rivalry = play("B");
        assert_eq!(rivalry.record, MatchRecord { wins: 0, losses: 1, ties: 0 });
        assert_eq!(rivalry.total_matches, 1);
        assert_eq!(rivalry.current_streak.player_id.as_deref(), Some("b"));
        assert_eq!(rivalry.current_streak.count, 1);
        assert_eq!(rivalry.belt_holder.as_deref(), Some("b"));
    }

    #[test]
    fn test_streak_extends_then_resets_on_new_winner() {
        let rivalry = play("AAA");
        assert_eq!(rivalry.current_streak.player_id.as_deref(), Some("a"));
        assert_eq!(rivalry.current_streak.count, 3);

        let rivalry = play("AAAB");
        assert_eq!(rivalry.current_streak.player_id.as_deref(), Some("b"));
        assert_eq!(rivalry.current_streak.count, 1);
        assert_eq!(rivalry.longest_streak.player_id.as_deref(), Some("a"));
        assert_eq!(rivalry.longest_streak.count, 3);
    }

    #[test]
    fn test_ties_are_streak_neutral() {
        let rivalry = play("AAAAT");
        assert_eq!(rivalry.current_streak.count, 4);
        assert_eq!(rivalry.record.ties, 1);

        let rivalry = play("AAAATA");
        assert_eq!(rivalry.current_streak.count, 5);
        assert_eq!(rivalry.longest_streak.count, 5);
    }

    #[test]
    fn test_longest_streak_only_replaced_when_exceeded() {
        let rivalry = play("AAABBB");
        assert_eq!(rivalry.longest_streak.player_id.as_deref(), Some("a"));
        assert_eq!(rivalry.longest_streak.count, 3);

        let rivalry = play("AAABBBB");
        assert_eq!(rivalry.longest_streak.player_id.as_deref(), Some("b"));
        assert_eq!(rivalry.longest_streak.count, 4);
    }

    #[test]
    fn test_recent_results_ring_buffer_is_capped() {
        let rivalry = play("ABABABABABABA");
        let cap = RivalrySettings::default().recent_results_cap;
        assert_eq!(rivalry.recent_results.len(), cap);
        assert_eq!(rivalry.total_matches, 13);
        // newest first
        assert_eq!(rivalry.recent_results[0].event_id, "e12");
        assert_eq!(rivalry.recent_results[cap - 1].event_id, "e3");
    }

    #[test]
    fn test_belt_kept_on_level_window() {
        // window after AAABB: A A A B B -> a leads 3-2
        let rivalry = play("AAABB");
        assert_eq!(rivalry.belt_holder.as_deref(), Some("a"));

        // window after AAABBT: T B B A A -> 2-2, a keeps the belt
        let rivalry = play("AAABBT");
        assert_eq!(rivalry.belt_holder.as_deref(), Some("a"));

        // window after AAABBTB: B T B B A -> b leads 3-1
        let rivalry = play("AAABBTB");
        assert_eq!(rivalry.belt_holder.as_deref(), Some("b"));
    }

    #[test]
    fn test_belt_only_counts_last_five() {
        // newest first: A B A A B -> a 3-2
        let rivalry = play("BBAABA");
        assert_eq!(rivalry.belt_holder.as_deref(), Some("a"));
        // newest first: B A B A A -> a 3-2
        let rivalry = play("BBAABAB");
        assert_eq!(rivalry.belt_holder.as_deref(), Some("a"));
        // newest first: B B A B A -> b 3-2
        let rivalry = play("BBAABABB");
        assert_eq!(rivalry.belt_holder.as_deref(), Some("b"));
    }

    #[test]
    fn test_first_tie_leaves_no_belt() {
        let rivalry = play("T");
        assert_eq!(rivalry.belt_holder, None);
        assert_eq!(rivalry.current_streak, Streak::default());
    }
}
