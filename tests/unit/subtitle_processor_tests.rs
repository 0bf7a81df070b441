/*!
 * Tests for ASS/SSA parsing
 */

use asstosrt::errors::ParseError;
use asstosrt::subtitle_processor::{self, Cue, Field, LineIssue};
use crate::common;

#[test]
fn test_parse_withSampleScript_shouldSortAndSkipEffects() {
    let parsed = subtitle_processor::parse(common::SAMPLE_ASS, true).unwrap();

    assert_eq!(parsed.cues.len(), 2);
    assert_eq!(
        parsed.cues[0],
        Cue::new(
            1,
            1_000,
            4_000,
            vec!["Hello, world!".to_string(), "How are you?".to_string()]
        )
    );
    assert_eq!(parsed.cues[1], Cue::new(2, 5_000, 7_500, vec!["Second line".to_string()]));
    assert!(parsed.diagnostics.is_empty());
}

#[test]
fn test_parse_withKeepEffects_shouldIncludeEffectEvent() {
    let parsed = subtitle_processor::parse(common::SAMPLE_ASS, false).unwrap();
    let texts: Vec<String> = parsed.cues.iter().map(|c| c.text()).collect();
    assert_eq!(
        texts,
        vec!["Hello, world!\nHow are you?", "la la la", "Second line"]
    );
    let indices: Vec<usize> = parsed.cues.iter().map(|c| c.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
}

#[test]
fn test_parse_withNoDialogue_shouldFailWithNoCues() {
    assert_eq!(
        subtitle_processor::parse(common::EMPTY_EVENTS_ASS, true).unwrap_err(),
        ParseError::NoCues
    );
}

#[test]
fn test_parse_withoutEventsSection_shouldFailWithNoFormatLine() {
    let script = "[Script Info]\nTitle: nothing here\n";
    assert_eq!(
        subtitle_processor::parse(script, true).unwrap_err(),
        ParseError::NoFormatLine
    );
}

#[test]
fn test_parse_withFormatMissingEnd_shouldFailWithField() {
    let script = "[Events]\nFormat: Layer, Start, Style, Text\nDialogue: 0,0:00:01.00,Default,hi\n";
    assert_eq!(
        subtitle_processor::parse(script, true).unwrap_err(),
        ParseError::NoFormatLineField(Field::End)
    );
}

#[test]
fn test_parse_withBadLines_shouldReportDiagnosticsAndKeepGoodOnes() {
    let script = "\
[Events]
Format: Layer, Start, End, Style, Text
Dialogue: 0,0:00:01.00,0:00:02.00,Default,good
Dialogue: 0,broken,0:00:02.00,Default,bad time
Dialogue: 0,0:00:05.00,0:00:04.00,Default,backwards
Dialogue: 0,0:00:03.00
Comment: 0,0:00:03.00,0:00:04.00,Default,not a cue
";
    let parsed = subtitle_processor::parse(script, true).unwrap();

    assert_eq!(parsed.cues.len(), 1);
    assert_eq!(parsed.cues[0].text(), "good");

    let issues: Vec<(usize, LineIssue)> = parsed
        .diagnostics
        .iter()
        .map(|d| (d.line, d.issue.clone()))
        .collect();
    assert_eq!(
        issues,
        vec![
            (4, LineIssue::Time("broken".to_string())),
            (5, LineIssue::NegativeDuration),
            (6, LineIssue::NoField(Field::End)),
        ]
    );
}

#[test]
fn test_parse_withCrOnlyLineEndings_shouldStillParse() {
    let script = "[Events]\rFormat: Start, End, Text\rDialogue: 0:00:01.00,0:00:02.00,cr only\r";
    let parsed = subtitle_processor::parse(script, true).unwrap();
    assert_eq!(parsed.cues[0].text(), "cr only");
}

#[test]
fn test_parse_withEqualStartTimes_shouldKeepDocumentOrder() {
    let script = "\
[Events]
Format: Start, End, Text
Dialogue: 0:00:01.00,0:00:03.00,first
Dialogue: 0:00:01.00,0:00:02.00,second
Dialogue: 0:00:00.50,0:00:02.00,earliest
";
    let parsed = subtitle_processor::parse(script, true).unwrap();
    let texts: Vec<String> = parsed.cues.iter().map(|c| c.text()).collect();
    assert_eq!(texts, vec!["earliest", "first", "second"]);
}

#[test]
fn test_parse_withOnlyMarkupText_shouldDropEvent() {
    let script = "\
[Events]
Format: Start, End, Text
Dialogue: 0:00:01.00,0:00:02.00,{\\p1}m 0 0 l 100 0 100 100{\\p0}
Dialogue: 0:00:02.00,0:00:03.00,{\\an8}visible
";
    let parsed = subtitle_processor::parse(script, true).unwrap();
    assert_eq!(parsed.cues.len(), 1);
    assert_eq!(parsed.cues[0].text(), "visible");
    assert_eq!(parsed.cues[0].index, 1);
}

#[test]
fn test_parse_withSectionAfterEvents_shouldStopAtNextSection() {
    let script = "\
[Events]
Format: Start, End, Text
Dialogue: 0:00:01.00,0:00:02.00,inside
[Fonts]
Dialogue: 0:00:03.00,0:00:04.00,outside
";
    let parsed = subtitle_processor::parse(script, true).unwrap();
    assert_eq!(parsed.cues.len(), 1);
}

#[test]
fn test_cueDisplay_withTwoLines_shouldRenderSrtBlock() {
    let cue = Cue::new(7, 3_723_004, 3_724_000, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(
        cue.to_string(),
        "7\r\n01:02:03,004 --> 01:02:04,000\r\na\r\nb\r\n\r\n"
    );
}
