//! Text parsing of binary-dump and module-load trace output.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use bottler_core::DllLoadClass;
use regex::Regex;

const DLL_NAME: &str = r#"['"]?([A-Za-z0-9_\-\.]+\.dll)['"]?"#;

/// Ordered trace classification table. The first pattern matching a line
/// decides its class.
const TRACE_PATTERNS: &[(&str, DllLoadClass)] = &[
    (r"load(?:ed)?\s+library\s+", DllLoadClass::Loaded),
    (r"Loaded module\s+", DllLoadClass::Loaded),
    (r#"Loaded\s+L?"[^"]*?[\\/]"#, DllLoadClass::Loaded),
    (r"err:module:.*?\s+", DllLoadClass::Failed),
    (r"Could not load\s+", DllLoadClass::Failed),
    (r"failed to (?:open|load).*?", DllLoadClass::Failed),
    (r"cannot open.*?", DllLoadClass::Failed),
];

static TRACE_TABLE: LazyLock<Vec<(Regex, DllLoadClass)>> = LazyLock::new(|| {
    TRACE_PATTERNS
        .iter()
        .filter_map(|(head, class)| {
            Regex::new(&format!("(?i){head}{DLL_NAME}"))
                .ok()
                .map(|re| (re, *class))
        })
        .collect()
});

static IMPORT_LINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)DLL Name:\s+([^\s]+\.dll)").ok());

/// DLL names declared in a binary-dump import listing, lower-cased.
pub fn parse_import_table(dump: &str) -> BTreeSet<String> {
    let Some(re) = IMPORT_LINE.as_ref() else {
        return BTreeSet::new();
    };
    re.captures_iter(dump)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
        .collect()
}

/// Classify one trace line, returning the class and the lower-cased DLL.
pub fn classify_trace_line(line: &str) -> Option<(DllLoadClass, String)> {
    TRACE_TABLE.iter().find_map(|(re, class)| {
        re.captures(line)
            .and_then(|c| c.get(1))
            .map(|m| (*class, m.as_str().to_ascii_lowercase()))
    })
}

/// DLLs seen in a module-load trace, split by classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceSummary {
    pub loaded: BTreeSet<String>,
    pub failed: BTreeSet<String>,
}

impl TraceSummary {
    /// Every DLL mentioned, loaded or not.
    pub fn all(&self) -> BTreeSet<String> {
        self.loaded.union(&self.failed).cloned().collect()
    }
}

/// Parse a full trace, line by line.
pub fn parse_trace(trace: &str) -> TraceSummary {
    let mut summary = TraceSummary::default();
    for (class, dll) in trace.lines().filter_map(classify_trace_line) {
        match class {
            DllLoadClass::Loaded => summary.loaded.insert(dll),
            DllLoadClass::Failed => summary.failed.insert(dll),
        };
    }
    summary
}
