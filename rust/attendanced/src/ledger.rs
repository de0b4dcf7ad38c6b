use crate::store::{KvStore, LEDGER_KEY};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Weeks in a term; also the ceiling of every ledger cell.
pub const MAX_WEEKS: u8 = 14;

/// courseId -> studentId -> weeks attended.
pub type AttendanceLedger = BTreeMap<String, BTreeMap<String, u8>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AttendanceBand {
    Good,
    Fair,
    Poor,
}

/// Current ledger. Absent, unreadable or corrupt data all read as empty.
pub fn get(store: &dyn KvStore) -> AttendanceLedger {
    let raw = match store.load(LEDGER_KEY) {
        Ok(Some(v)) => v,
        Ok(None) => return AttendanceLedger::new(),
        Err(e) => {
            warn!("attendance ledger read failed, treating as empty: {e:#}");
            return AttendanceLedger::new();
        }
    };
    parse_ledger(&raw).unwrap_or_else(|| {
        warn!("attendance ledger blob is corrupt, treating as empty");
        AttendanceLedger::new()
    })
}

// Counts outside 0..=14 in a hand-edited blob are clamped; cells that are
// not numbers, and courses that are not objects, are dropped on their own.
fn parse_ledger(raw: &str) -> Option<AttendanceLedger> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let courses = value.as_object()?;
    let mut ledger = AttendanceLedger::new();
    let mut skipped = 0usize;
    for (course_id, students) in courses {
        let Some(students) = students.as_object() else {
            skipped += 1;
            continue;
        };
        let cells = ledger.entry(course_id.clone()).or_default();
        for (student_id, count) in students {
            match count.as_f64() {
                Some(n) => {
                    cells.insert(student_id.clone(), n.clamp(0.0, f64::from(MAX_WEEKS)) as u8);
                }
                None => skipped += 1,
            }
        }
    }
    if skipped > 0 {
        warn!(skipped, "dropped unreadable attendance ledger entries");
    }
    Some(ledger)
}

pub fn weeks(ledger: &AttendanceLedger, course_id: &str, student_id: &str) -> u8 {
    ledger
        .get(course_id)
        .and_then(|cells| cells.get(student_id))
        .copied()
        .unwrap_or(0)
}

/// Moves one cell up (attended) or down by a week, clamped to `0..=MAX_WEEKS`,
/// and rewrites the whole ledger. Returns the new count.
pub fn record_attendance(
    store: &mut dyn KvStore,
    course_id: &str,
    student_id: &str,
    attended: bool,
) -> anyhow::Result<u8> {
    let mut ledger = get(store);
    let cell = ledger
        .entry(course_id.to_string())
        .or_default()
        .entry(student_id.to_string())
        .or_insert(0);
    *cell = if attended {
        cell.saturating_add(1).min(MAX_WEEKS)
    } else {
        cell.saturating_sub(1)
    };
    let updated = *cell;

    let blob = serde_json::to_string(&ledger)?;
    store.save(LEDGER_KEY, &blob)?;
    debug!(course_id, student_id, attended, weeks = updated, "attendance recorded");
    Ok(updated)
}

pub fn attendance_percent(weeks: u8) -> u8 {
    let w = f64::from(weeks.min(MAX_WEEKS));
    (w / f64::from(MAX_WEEKS) * 100.0).round() as u8
}

pub fn band(percent: u8) -> AttendanceBand {
    if percent >= 70 {
        AttendanceBand::Good
    } else if percent >= 40 {
        AttendanceBand::Fair
    } else {
        AttendanceBand::Poor
    }
}
