//! Product name and file version extraction.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use bottler_core::ports::{ToolInvocation, ToolRunner};
use regex::Regex;
use tracing::debug;

/// Strings mined from a binary before giving up on a product name.
pub const STRING_SCAN_LIMIT: usize = 400;

/// Shortest run of printable bytes treated as a string.
const MIN_STRING_RUN: usize = 4;

/// Text every PE stub carries; never a product name.
const DOS_STUB: &str = "this program cannot be run in dos mode";

static PRODUCT_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?im)ProductName\s*[:=]?\s*(.+)$").ok());
static FILE_VERSION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?im)FileVersion\s*[:=]?\s*(.+)$").ok());

/// Version-resource fields of an executable. Empty when unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeMetadata {
    pub product_name: String,
    pub file_version: String,
}

fn capture(re: &LazyLock<Option<Regex>>, text: &str) -> String {
    re.as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().trim_matches('"').trim().to_string())
        .unwrap_or_default()
}

/// Pull `ProductName` / `FileVersion` out of a resource dump.
pub fn parse_version_fields(dump: &str) -> PeMetadata {
    PeMetadata {
        product_name: capture(&PRODUCT_NAME, dump),
        file_version: capture(&FILE_VERSION, dump),
    }
}

fn is_printable(byte: u8) -> bool {
    byte == b'\t' || (0x20..0x7f).contains(&byte)
}

fn take_run(run: &mut Vec<u8>, strings: &mut Vec<String>) {
    if run.len() >= MIN_STRING_RUN {
        strings.push(String::from_utf8_lossy(run).into_owned());
    }
    run.clear();
}

/// Printable runs from a byte stream, at most `limit` of them.
///
/// Both single-byte runs and UTF-16LE runs (a printable byte followed by a
/// zero byte, at either alignment) are collected, since version resources
/// store their strings as UTF-16LE.
pub fn mine_strings<R: Read>(reader: R, limit: usize) -> Vec<String> {
    let mut strings = Vec::new();
    let mut narrow = Vec::new();
    let mut wide: [Vec<u8>; 2] = [Vec::new(), Vec::new()];
    let mut prev: Option<u8> = None;

    for (index, byte) in BufReader::new(reader).bytes().enumerate() {
        let Ok(byte) = byte else { break };
        if is_printable(byte) {
            narrow.push(byte);
        } else {
            take_run(&mut narrow, &mut strings);
        }
        if let Some(low) = prev {
            let lane = &mut wide[(index - 1) % 2];
            if is_printable(low) && byte == 0 {
                lane.push(low);
            } else {
                take_run(lane, &mut strings);
            }
        }
        prev = Some(byte);
        if strings.len() >= limit {
            strings.truncate(limit);
            return strings;
        }
    }

    take_run(&mut narrow, &mut strings);
    for lane in &mut wide {
        take_run(lane, &mut strings);
    }
    strings.truncate(limit);
    strings
}

fn looks_like_path(s: &str) -> bool {
    let bytes = s.as_bytes();
    let drive = bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && &bytes[1..3] == b":\\";
    drive || s.contains('/') || s.contains('\\')
}

/// First mined string plausible as a product name.
pub fn pick_product_string<I, S>(strings: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    strings.into_iter().find_map(|s| {
        let s = s.as_ref().trim();
        let plausible = (3..=64).contains(&s.len())
            && s.chars().any(char::is_alphabetic)
            && !looks_like_path(s)
            && !s.starts_with('.')
            && !s.to_ascii_lowercase().contains(DOS_STUB);
        plausible.then(|| s.to_string())
    })
}

/// Reads version metadata with the binary-dump tool, falling back to the
/// raw string table.
pub struct MetadataProbe {
    winedump: Vec<String>,
    runner: Arc<dyn ToolRunner>,
    timeout: Duration,
}

impl MetadataProbe {
    pub fn new(winedump: Vec<String>, runner: Arc<dyn ToolRunner>, timeout: Duration) -> Self {
        Self {
            winedump,
            runner,
            timeout,
        }
    }

    pub async fn probe(&self, exe: &Path) -> PeMetadata {
        let invocation = ToolInvocation::new(
            &self.winedump,
            [
                "-j".to_string(),
                "resource".to_string(),
                exe.to_string_lossy().into_owned(),
            ],
            self.timeout,
        );
        let mut meta = match self.runner.run(invocation).await {
            Ok(out) => parse_version_fields(&format!("{}\n{}", out.stdout, out.stderr)),
            Err(e) => {
                debug!(exe = %exe.display(), error = %e, "Resource dump unavailable");
                PeMetadata::default()
            }
        };

        if meta.product_name.is_empty() {
            let path: PathBuf = exe.to_path_buf();
            let mined = tokio::task::spawn_blocking(move || {
                File::open(&path)
                    .map(|f| mine_strings(f, STRING_SCAN_LIMIT))
                    .unwrap_or_default()
            })
            .await
            .unwrap_or_default();
            if let Some(name) = pick_product_string(&mined) {
                meta.product_name = name;
            }
        }
        meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedRunner, exit};

    #[test]
    fn test_parse_version_fields() {
        let dump = "\
  StringFileInfo
    CompanyName     \"Acme\"
    ProductName     \"Space Game\"
    FileVersion: 1.2.3.4
";
        let meta = parse_version_fields(dump);
        assert_eq!(meta.product_name, "Space Game");
        assert_eq!(meta.file_version, "1.2.3.4");
        assert_eq!(parse_version_fields("nothing here"), PeMetadata::default());
    }

    #[test]
    fn test_mine_strings_respects_limit() {
        let bytes = b"MZ\x00\x00abcd\x00efgh\x01ij\x00klmnop";
        let strings = mine_strings(&bytes[..], 10);
        assert_eq!(strings, vec!["abcd", "efgh", "klmnop"]);
        assert_eq!(mine_strings(&bytes[..], 1), vec!["abcd"]);
    }

    #[test]
    fn test_mine_strings_reads_utf16le_runs() {
        let mut bytes = b"\x01\x02".to_vec();
        bytes.extend("Space Game".encode_utf16().flat_map(u16::to_le_bytes));
        bytes.extend(b"\x00\x00\x07odd");
        bytes.extend("Racer".encode_utf16().flat_map(u16::to_le_bytes));
        let strings = mine_strings(&bytes[..], 10);
        assert!(strings.contains(&"Space Game".to_string()));
        assert!(strings.contains(&"Racer".to_string()));
        assert!(strings.iter().all(|s| !s.contains('\0')));
    }

    #[tokio::test]
    async fn test_probe_falls_back_to_utf16_strings() {
        let tmp = tempfile::TempDir::new().unwrap();
        let exe = tmp.path().join("g.exe");
        let mut bytes = b"MZ\x00\x00".to_vec();
        bytes.extend("Nebula Drift".encode_utf16().flat_map(u16::to_le_bytes));
        bytes.extend(b"\x00\x00");
        std::fs::write(&exe, bytes).unwrap();
        let runner = Arc::new(ScriptedRunner::new().reply("winedump", exit(1, "", "")));
        let probe = MetadataProbe::new(vec!["winedump".into()], runner, Duration::from_secs(1));
        assert_eq!(probe.probe(&exe).await.product_name, "Nebula Drift");
    }

    #[test]
    fn test_pick_product_string() {
        let strings = [
            "!This program cannot be run in DOS mode.",
            ".text",
            "1234",
            "C:\\build\\out\\game.pdb",
            "usr/lib/thing",
            "Space Game",
        ];
        assert_eq!(pick_product_string(strings).as_deref(), Some("Space Game"));
        assert_eq!(pick_product_string(["12", "9999"]), None);
    }

    #[tokio::test]
    async fn test_probe_falls_back_to_strings() {
        let tmp = tempfile::TempDir::new().unwrap();
        let exe = tmp.path().join("g.exe");
        std::fs::write(&exe, b"MZ\x00\x00!This program cannot be run in DOS mode.\x00\x00Orbital Racer\x00").unwrap();
        let runner = Arc::new(ScriptedRunner::new().reply("winedump", exit(1, "", "")));
        let probe = MetadataProbe::new(vec!["winedump".into()], runner, Duration::from_secs(1));
        let meta = probe.probe(&exe).await;
        assert_eq!(meta.product_name, "Orbital Racer");
        assert!(meta.file_version.is_empty());
    }

    #[tokio::test]
    async fn test_probe_prefers_dump() {
        let tmp = tempfile::TempDir::new().unwrap();
        let exe = tmp.path().join("g.exe");
        std::fs::write(&exe, b"MZ").unwrap();
        let runner = Arc::new(
            ScriptedRunner::new().reply("winedump", exit(0, "ProductName=Orbital\nFileVersion=2.0\n", "")),
        );
        let probe = MetadataProbe::new(vec!["winedump".into()], runner, Duration::from_secs(1));
        let meta = probe.probe(&exe).await;
        assert_eq!(meta.product_name, "Orbital");
        assert_eq!(meta.file_version, "2.0");
    }
}
