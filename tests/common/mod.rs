/*!
 * Common test utilities for the asstosrt test suite
 */

use std::fs;
use std::path::{Path, PathBuf};
use anyhow::Result;
use tempfile::TempDir;

/// Minimal script with three dialogue events, one of them a karaoke effect
pub const SAMPLE_ASS: &str = "\
[Script Info]
Title: Sample
ScriptType: v4.00+

[V4+ Styles]
Format: Name, Fontname, Fontsize
Style: Default,Arial,20

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
Dialogue: 0,0:00:05.00,0:00:07.50,Default,,0,0,0,,{\\i1}Second line{\\i0}
Dialogue: 0,0:00:01.00,0:00:04.00,Default,,0,0,0,,Hello, world!\\NHow are you?
Dialogue: 0,0:00:02.00,0:00:03.00,Default,,0,0,0,Karaoke,{\\k20}la la la
";

/// Expected SRT for [`SAMPLE_ASS`] with default options
pub const SAMPLE_SRT: &str = "\
1\r\n\
00:00:01,000 --> 00:00:04,000\r\n\
Hello, world!\r\n\
How are you?\r\n\
\r\n\
2\r\n\
00:00:05,000 --> 00:00:07,500\r\n\
Second line\r\n\
\r\n";

/// Script with a valid `[Events]` section but no dialogue
pub const EMPTY_EVENTS_ASS: &str = "\
[Script Info]
Title: Empty

[Events]
Format: Layer, Start, End, Style, Text
";

/// Script whose single dialogue is in Traditional Chinese
pub const CHINESE_ASS: &str = "\
[Events]
Format: Layer, Start, End, Style, Text
Dialogue: 0,0:00:01.00,0:00:02.00,Default,頭髮很漂亮
";

/// Tiny Traditional to Simplified dictionary
pub const T2S_DICT: &str = "頭髮\t头发\n髮\t发\n漂亮\t漂亮\n";

/// Build a script with `count` sequential one-second cues
pub fn generate_ass(count: usize) -> String {
    let mut script = String::from(
        "[Events]\nFormat: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
    );
    for i in 0..count {
        let start = i as u64;
        script.push_str(&format!(
            "Dialogue: 0,{}:{:02}:{:02}.00,{}:{:02}:{:02}.50,Default,,0,0,0,,Line {}\\N{{\\b1}}second{{\\b0}}\n",
            start / 3600,
            (start / 60) % 60,
            start % 60,
            start / 3600,
            (start / 60) % 60,
            start % 60,
            i
        ));
    }
    script
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates the sample script in the specified directory
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, SAMPLE_ASS.as_bytes())
}

/// Route library logs to the test harness
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
