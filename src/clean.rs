// src/clean.rs
//! Cleanup of raw generator output: known preambles, code fences, whitespace.

use once_cell::sync::OnceCell;
use regex::Regex;

fn preamble_res() -> &'static [Regex] {
    static RES: OnceCell<Vec<Regex>> = OnceCell::new();
    RES.get_or_init(|| {
        [
            r"(?im)^here['’]?s?\s+an?\s+engaging\s+facebook\s+post.*?:",
            r"(?im)^here['’]?s?\s+a\s+facebook\s+post.*?:",
            r"(?im)^here['’]?s?\s+the\s+post.*?:",
            r"(?im)^here['’]?s?\s+an?\s+.*?post.*?:",
            r"(?im)^here['’]?s?\s+the\s+.*?post.*?:",
            r"(?im)^facebook\s+post.*?:",
            r"(?im)^post.*?:",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

fn fence_res() -> &'static (Regex, Regex) {
    static RES: OnceCell<(Regex, Regex)> = OnceCell::new();
    RES.get_or_init(|| {
        (
            // opening fence with optional language tag
            Regex::new(r"^```[^\n]*(\n|$)").unwrap(),
            Regex::new(r"(^|\n)```\s*$").unwrap(),
        )
    })
}

fn clean_pass(text: &str) -> String {
    let mut out = text.trim().to_string();
    for re in preamble_res() {
        out = re.replace_all(&out, "").into_owned();
    }
    out = out.trim().to_string();

    let (open, close) = fence_res();
    out = open.replace(&out, "").into_owned();
    out = close.replace(&out, "").into_owned();
    out.trim().to_string()
}

/// Strip AI preambles and code fences, then trim.
///
/// Passes repeat until nothing changes, so `clean(clean(x)) == clean(x)`.
/// Every pass only removes text, so the loop terminates.
pub fn clean(raw: &str) -> String {
    let mut current = clean_pass(raw);
    loop {
        let next = clean_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}
