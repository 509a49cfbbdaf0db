use rusqlite::{params, Connection};

use crate::errors::LedgerResult;

/// Takes one of `recipient`'s feed slots for an event. Returns `false` once
/// `cap` cards have been issued, however many passes asked for them.
pub fn reserve_card(
    conn: &Connection,
    event_id: &str,
    recipient: &str,
    cap: u32,
) -> LedgerResult<bool> {
    if cap == 0 {
        return Ok(false);
    }

    let changed = conn.execute(
        "INSERT INTO feed_card_quota (event_id, recipient, issued) VALUES (?1, ?2, 1)
         ON CONFLICT(event_id, recipient) DO UPDATE SET issued = issued + 1
         WHERE issued < ?3",
        params![event_id, recipient, cap],
    )?;
    Ok(changed > 0)
}
