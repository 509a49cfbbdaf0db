use serde::{Deserialize, Serialize};

use super::types::{MatchRecord, RivalSide, Rivalry};
use crate::config::settings::RivalrySettings;
use crate::domain::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    LeadChange,
    BeltClaimed,
    StreakBroken,
    RivalryFormed,
    TiedUp,
    StreakExtended,
    Milestone,
}

impl ChangeKind {
    /// Lower value is announced first
    pub fn priority(&self) -> u8 {
        match self {
            ChangeKind::LeadChange => 1,
            ChangeKind::BeltClaimed => 2,
            ChangeKind::StreakBroken => 3,
            ChangeKind::RivalryFormed => 4,
            ChangeKind::TiedUp => 5,
            ChangeKind::StreakExtended => 6,
            ChangeKind::Milestone => 7,
        }
    }

    /// Kinds worth a push alert; everything is eligible for the feed
    pub fn is_notifiable(&self) -> bool {
        matches!(
            self,
            ChangeKind::LeadChange
                | ChangeKind::BeltClaimed
                | ChangeKind::StreakBroken
                | ChangeKind::RivalryFormed
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            ChangeKind::LeadChange => "lead_change",
            ChangeKind::BeltClaimed => "belt_claimed",
            ChangeKind::StreakBroken => "streak_broken",
            ChangeKind::RivalryFormed => "rivalry_formed",
            ChangeKind::TiedUp => "tied_up",
            ChangeKind::StreakExtended => "streak_extended",
            ChangeKind::Milestone => "milestone",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RivalryChange {
    pub kind: ChangeKind,
    pub priority: u8,
    pub pair_key: String,
    pub player_a: RivalSide,
    pub player_b: RivalSide,
    /// Player the change is about (new leader, belt holder, streak owner...)
    pub subject: Option<PlayerId>,
    pub message: String,
    pub record: MatchRecord,
    pub total_matches: u32,
}

impl RivalryChange {
    fn new(kind: ChangeKind, after: &Rivalry, subject: Option<&PlayerId>, message: String) -> Self {
        Self {
            kind,
            priority: kind.priority(),
            pair_key: after.pair_key.clone(),
            player_a: after.player_a.clone(),
            player_b: after.player_b.clone(),
            subject: subject.cloned(),
            message,
            record: after.record,
            total_matches: after.total_matches,
        }
    }
}

/// The single change emitted when a rivalry record is first created.
/// `shared_rounds` counts every round the pair has played together,
/// including those before the record existed.
pub fn formed_change(after: &Rivalry, shared_rounds: u32) -> RivalryChange {
    let message = format!(
        "A rivalry is born: {} vs {} after {} rounds together",
        after.player_a.display_name, after.player_b.display_name, shared_rounds
    );
    RivalryChange::new(ChangeKind::RivalryFormed, after, None, message)
}

/// Compares a rivalry before and after one more shared round and reports
/// every transition worth announcing, highest priority first.
pub fn detect_changes(
    before: &Rivalry,
    after: &Rivalry,
    settings: &RivalrySettings,
) -> Vec<RivalryChange> {
    let winner = after.latest_result().and_then(|r| r.winner.as_ref());
    let mut changes = Vec::new();

    if let Some(change) = lead_change(before, after, winner) {
        changes.push(change);
    }
    if let Some(change) = tied_up(before, after) {
        changes.push(change);
    }
    if let Some(change) = streak_broken(before, after, winner, settings) {
        changes.push(change);
    }
    if let Some(change) = streak_extended(before, after, settings) {
        changes.push(change);
    }
    if let Some(change) = belt_claimed(before, after) {
        changes.push(change);
    }
    if let Some(change) = milestone(after, settings) {
        changes.push(change);
    }

    changes.sort_by_key(|c| c.priority);
    changes
}

fn lead_change(
    before: &Rivalry,
    after: &Rivalry,
    winner: Option<&PlayerId>,
) -> Option<RivalryChange> {
    winner?;
    let new_leader = after.leader()?;
    let old_leader = before.leader().map(|s| &s.player_id);
    if old_leader == Some(&new_leader.player_id) {
        return None;
    }

    let message = format!(
        "{} takes the lead over {} ({})",
        new_leader.display_name,
        after.opponent_of(&new_leader.player_id).display_name,
        leader_line(after, &new_leader.player_id)
    );
    Some(RivalryChange::new(
        ChangeKind::LeadChange,
        after,
        Some(&new_leader.player_id),
        message,
    ))
}

fn tied_up(before: &Rivalry, after: &Rivalry) -> Option<RivalryChange> {
    if before.leader().is_none() || after.leader().is_some() {
        return None;
    }

    let message = format!(
        "{} and {} are all square at {}",
        after.player_a.display_name,
        after.player_b.display_name,
        after.score_line()
    );
    let subject = after.latest_result().and_then(|r| r.winner.as_ref());
    Some(RivalryChange::new(ChangeKind::TiedUp, after, subject, message))
}

fn streak_broken(
    before: &Rivalry,
    after: &Rivalry,
    winner: Option<&PlayerId>,
    settings: &RivalrySettings,
) -> Option<RivalryChange> {
    let winner = winner?;
    let holder = before.current_streak.player_id.as_ref()?;
    if before.current_streak.count < settings.streak_broken_min || holder == winner {
        return None;
    }

    let message = format!(
        "{} snapped {}'s {}-round winning streak",
        after.name_of(winner),
        after.name_of(holder),
        before.current_streak.count
    );
    Some(RivalryChange::new(
        ChangeKind::StreakBroken,
        after,
        Some(winner),
        message,
    ))
}

fn streak_extended(
    before: &Rivalry,
    after: &Rivalry,
    settings: &RivalrySettings,
) -> Option<RivalryChange> {
    let holder = after.current_streak.player_id.as_ref()?;
    if after.current_streak.count < settings.streak_extended_min
        || after.current_streak.count <= before.current_streak.count
    {
        return None;
    }

    let message = format!(
        "{} has now beaten {} {} rounds running",
        after.name_of(holder),
        after.opponent_of(holder).display_name,
        after.current_streak.count
    );
    Some(RivalryChange::new(
        ChangeKind::StreakExtended,
        after,
        Some(holder),
        message,
    ))
}

fn belt_claimed(before: &Rivalry, after: &Rivalry) -> Option<RivalryChange> {
    before.belt_holder.as_ref()?;
    let holder = after.belt_holder.as_ref()?;
    if before.belt_holder.as_ref() == Some(holder) {
        return None;
    }

    let message = format!(
        "{} claims the belt from {}",
        after.name_of(holder),
        after.opponent_of(holder).display_name
    );
    Some(RivalryChange::new(
        ChangeKind::BeltClaimed,
        after,
        Some(holder),
        message,
    ))
}

fn milestone(after: &Rivalry, settings: &RivalrySettings) -> Option<RivalryChange> {
    if settings.milestone_every == 0
        || after.total_matches == 0
        || after.total_matches % settings.milestone_every != 0
    {
        return None;
    }

    let message = format!(
        "{} and {} have now played {} rounds together",
        after.player_a.display_name, after.player_b.display_name, after.total_matches
    );
    Some(RivalryChange::new(ChangeKind::Milestone, after, None, message))
}

fn leader_line(rivalry: &Rivalry, leader: &str) -> String {
    let record = rivalry.record;
    if rivalry.player_a.player_id == leader {
        format!("{}-{}-{}", record.wins, record.losses, record.ties)
    } else {
        format!("{}-{}-{}", record.losses, record.wins, record.ties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rivalry::rules::tests::play;

    fn kinds_between(before: &str, after_outcome: char) -> Vec<ChangeKind> {
        let before_rivalry = play(before);
        let after_rivalry = play(&format!("{}{}", before, after_outcome));
        detect_changes(&before_rivalry, &after_rivalry, &RivalrySettings::default())
            .into_iter()
            .map(|c| c.kind)
            .collect()
    }

    #[test]
    fn test_two_one_lead_levelled_is_tied_up_not_lead_change() {
        // a leads 2-1, then b wins
        let kinds = kinds_between("ABA", 'B');
        assert!(kinds.contains(&ChangeKind::TiedUp));
        assert!(!kinds.contains(&ChangeKind::LeadChange));
    }

    #[test]
    fn test_taking_the_lead_from_level() {
        let kinds = kinds_between("AB", 'B');
        assert_eq!(kinds.first(), Some(&ChangeKind::LeadChange));
    }

    #[test]
    fn test_tie_result_never_changes_lead() {
        let kinds = kinds_between("AB", 'T');
        assert!(!kinds.contains(&ChangeKind::LeadChange));
        assert!(!kinds.contains(&ChangeKind::TiedUp));
    }

    #[test]
    fn test_streak_of_three_broken() {
        let before = play("AAA");
        let after = play("AAAB");
        let changes = detect_changes(&before, &after, &RivalrySettings::default());
        let broken = changes
            .iter()
            .find(|c| c.kind == ChangeKind::StreakBroken)
            .expect("streak_broken expected");
        assert_eq!(broken.subject.as_deref(), Some("b"));
        assert!(broken.message.contains("3-round"));
        assert_eq!(after.current_streak.count, 1);
    }

    #[test]
    fn test_streak_of_two_broken_is_silent() {
        let kinds = kinds_between("AA", 'B');
        assert!(!kinds.contains(&ChangeKind::StreakBroken));
    }

    #[test]
    fn test_tie_after_long_streak_breaks_nothing() {
        let kinds = kinds_between("AAAA", 'T');
        assert!(!kinds.contains(&ChangeKind::StreakBroken));
        assert!(!kinds.contains(&ChangeKind::StreakExtended));
    }

    #[test]
    fn test_streak_extended_from_four() {
        assert!(!kinds_between("AA", 'A').contains(&ChangeKind::StreakExtended));
        assert!(kinds_between("AAA", 'A').contains(&ChangeKind::StreakExtended));
        assert!(kinds_between("AAAA", 'A').contains(&ChangeKind::StreakExtended));
    }

    #[test]
    fn test_belt_claimed_needs_previous_holder() {
        // AAABBB: belt moves to b on the sixth round (window B B B A A)
        let kinds = kinds_between("AAABB", 'B');
        assert!(kinds.contains(&ChangeKind::BeltClaimed));

        // first decisive result after a tie hands out the belt silently
        let kinds = kinds_between("T", 'A');
        assert!(!kinds.contains(&ChangeKind::BeltClaimed));
    }

    #[test]
    fn test_milestone_on_every_tenth_match() {
        assert!(kinds_between("ABABABABA", 'T').contains(&ChangeKind::Milestone));
        assert!(!kinds_between("ABABABAB", 'T').contains(&ChangeKind::Milestone));
    }

    #[test]
    fn test_changes_sorted_by_priority() {
        // a leads 3-2 and holds the belt; b levels at 3-3 and takes the belt
        let before = play("AAABB");
        let after = play("AAABBB");
        let changes = detect_changes(&before, &after, &RivalrySettings::default());
        let priorities: Vec<u8> = changes.iter().map(|c| c.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
        assert!(changes.len() >= 2);
        assert_eq!(changes[0].kind, ChangeKind::BeltClaimed);
    }

    #[test]
    fn test_formed_change_is_notifiable() {
        let rivalry = play("A");
        let change = formed_change(&rivalry, 3);
        assert_eq!(change.kind, ChangeKind::RivalryFormed);
        assert!(change.kind.is_notifiable());
        assert!(!ChangeKind::Milestone.is_notifiable());
        assert!(change.message.ends_with("after 3 rounds together"));
        assert_eq!(change.total_matches, 1);
    }
}
