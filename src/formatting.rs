/*!
 * Cue formatting and timeline shifting.
 *
 * Turns parsed cues into SRT text: shift by the configured offset (clamped at
 * zero), strip lines per policy, drop cues that collapsed to zero length or
 * lost all their text, renumber from 1 and serialize with CRLF line endings.
 */

use log::debug;

use crate::app_config::LineStrip;
use crate::subtitle_processor::Cue;

/// Shift a timestamp by `offset_ms`, never going below zero
pub fn shift_ms(ms: u64, offset_ms: i64) -> u64 {
    if offset_ms >= 0 {
        ms.saturating_add(offset_ms as u64)
    } else {
        ms.saturating_sub(offset_ms.unsigned_abs())
    }
}

/// Shift, strip and renumber cues, keeping their order
pub fn prepare(cues: Vec<Cue>, offset_ms: i64, lines: LineStrip) -> Vec<Cue> {
    let total = cues.len();
    let prepared: Vec<Cue> = cues
        .into_iter()
        .filter_map(|cue| {
            let start_ms = shift_ms(cue.start_ms, offset_ms);
            let end_ms = shift_ms(cue.end_ms, offset_ms);
            if end_ms <= start_ms {
                return None;
            }
            let lines = lines.strip(cue.lines);
            if lines.iter().all(|line| line.trim().is_empty()) {
                return None;
            }
            Some(Cue::new(0, start_ms, end_ms, lines))
        })
        .enumerate()
        .map(|(i, mut cue)| {
            cue.index = i + 1;
            cue
        })
        .collect();

    if prepared.len() < total {
        debug!(
            "Dropped {} cues with no remaining duration or text",
            total - prepared.len()
        );
    }
    prepared
}

/// Serialize cues as SRT
pub fn to_srt(cues: &[Cue]) -> String {
    cues.iter().map(Cue::to_string).collect()
}

/// Shift, strip, renumber and serialize in one step
pub fn format(cues: Vec<Cue>, offset_ms: i64, lines: LineStrip) -> (String, usize) {
    let cues = prepare(cues, offset_ms, lines);
    (to_srt(&cues), cues.len())
}
