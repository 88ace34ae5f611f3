//! Human-readable freshness reports.  The wording here is relied on by
//! tooling that scrapes our output, so treat it as fixed.

use crate::check::{OutputUpdateInfo, RuleCheck};
use crate::fs::FileSystem;
use std::fmt;

impl fmt::Display for OutputUpdateInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.exists {
            write!(f, "\"{}\" nonexistent, needs update.", self.output)
        } else if let Some(input) = self.input {
            write!(
                f,
                "\"{}\" is older than \"{}\", needs update.",
                self.output, input
            )
        } else {
            write!(f, "\"{}\" is newest, does not need update.", self.output)
        }
    }
}

impl<'a, F: FileSystem> RuleCheck<'a, F> {
    /// One line: `{ins} -> {outs} via {commands} (status)`.
    pub fn summary(&self) -> std::io::Result<String> {
        let rule = self.rule();
        let status = match self.update_needed()? {
            Some(true) => "needs update",
            Some(false) => "does not need update",
            None => "invalid!",
        };
        Ok(format!(
            "{{{}}} -> {{{}}} via {{{}}} ({})",
            rule.ins().join(" "),
            rule.outs().join(" "),
            rule.commands().join(", "),
            status
        ))
    }

    /// The summary followed by one `* ` line per output, unless the rule is
    /// invalid.
    pub fn explain(&self) -> std::io::Result<String> {
        let mut text = self.summary()?;
        if !self.invalid()? {
            for info in self.update_info()? {
                text.push_str(&format!("\n* {}", info?));
            }
        }
        Ok(text)
    }
}
