//! Rule freshness: decides whether a rule's outputs are stale relative to its
//! inputs by comparing modification times.
//!
//! A RuleCheck binds one Rule to one FileSystem and memoizes what it learns.
//! Each cached value reflects the filesystem as it was at first access and is
//! never refreshed: to re-evaluate after files change, drop the RuleCheck and
//! create a new one.

use crate::fs::{FileSystem, MTime};
use crate::rule::Rule;
use std::sync::OnceLock;
use std::time::SystemTime;
use tracing::{debug, warn};

/// Why freshness couldn't be decided.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Indeterminate {
    /// At least one declared input doesn't exist.
    MissingInput,
    /// The rule declares no inputs, so there is nothing to be stale against.
    NoInputs,
}

/// The three-valued freshness verdict.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
    Indeterminate(Indeterminate),
}

impl Freshness {
    /// Some(true) if stale, Some(false) if fresh, None if indeterminate.
    pub fn update_needed(&self) -> Option<bool> {
        match self {
            Freshness::Fresh => Some(false),
            Freshness::Stale => Some(true),
            Freshness::Indeterminate(_) => None,
        }
    }
}

/// Per-output explanation of whether it needs updating.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OutputUpdateInfo<'a> {
    pub output: &'a str,
    /// The first declared input newer than the output, if any.
    pub input: Option<&'a str>,
    pub needs_update: bool,
    pub exists: bool,
}

/// Like OnceLock::get_or_try_init, which isn't stable.  If two threads race
/// on the first computation, both compute and the first stored value wins.
fn memo<T>(
    cell: &OnceLock<T>,
    compute: impl FnOnce() -> std::io::Result<T>,
) -> std::io::Result<&T> {
    if let Some(val) = cell.get() {
        return Ok(val);
    }
    let val = compute()?;
    Ok(cell.get_or_init(|| val))
}

pub struct RuleCheck<'a, F: FileSystem> {
    rule: &'a Rule,
    fs: &'a F,
    /// One mtime per input, in declaration order; None if any input is missing.
    input_times: OnceLock<Option<Vec<SystemTime>>>,
    freshness: OnceLock<Freshness>,
}

impl<'a, F: FileSystem> RuleCheck<'a, F> {
    pub fn new(rule: &'a Rule, fs: &'a F) -> Self {
        RuleCheck {
            rule,
            fs,
            input_times: OnceLock::new(),
            freshness: OnceLock::new(),
        }
    }

    pub fn rule(&self) -> &'a Rule {
        self.rule
    }

    /// Input mtimes in declaration order, or None if any input is missing.
    /// Existence and mtime come from the same stat() so they can't disagree.
    pub fn input_times(&self) -> std::io::Result<Option<&[SystemTime]>> {
        let times = memo(&self.input_times, || {
            let mut times = Vec::with_capacity(self.rule.ins().len());
            for input in self.rule.ins() {
                match self.fs.stat(input)? {
                    MTime::Stamp(mtime) => times.push(mtime),
                    MTime::Missing => {
                        warn!(rule = self.rule.name(), input = %input, "input missing");
                        return Ok(None);
                    }
                }
            }
            Ok(Some(times))
        })?;
        Ok(times.as_deref())
    }

    /// True iff some declared input doesn't exist.  A rule with no inputs is
    /// never invalid.
    pub fn invalid(&self) -> std::io::Result<bool> {
        Ok(self.input_times()?.is_none())
    }

    /// The newest input mtime; None if invalid or there are no inputs.
    pub fn last_input_mod(&self) -> std::io::Result<Option<SystemTime>> {
        Ok(self
            .input_times()?
            .and_then(|times| times.iter().copied().max()))
    }

    pub fn freshness(&self) -> std::io::Result<Freshness> {
        let freshness = memo(&self.freshness, || {
            let last = match self.last_input_mod()? {
                Some(last) => last,
                None => {
                    let reason = if self.invalid()? {
                        Indeterminate::MissingInput
                    } else {
                        Indeterminate::NoInputs
                    };
                    debug!(rule = self.rule.name(), ?reason, "indeterminate");
                    return Ok(Freshness::Indeterminate(reason));
                }
            };
            for output in self.rule.outs() {
                let stale = match self.fs.stat(output)? {
                    MTime::Missing => true,
                    MTime::Stamp(mtime) => mtime < last,
                };
                if stale {
                    debug!(rule = self.rule.name(), output = %output, "stale");
                    return Ok(Freshness::Stale);
                }
            }
            debug!(rule = self.rule.name(), "fresh");
            Ok(Freshness::Fresh)
        })?;
        Ok(*freshness)
    }

    /// Some(true) if stale, Some(false) if fresh, None if indeterminate.
    pub fn update_needed(&self) -> std::io::Result<Option<bool>> {
        Ok(self.freshness()?.update_needed())
    }

    /// Explains each output in declaration order.  The returned iterator
    /// stats outputs as it goes; call again to get a fresh traversal.
    pub fn update_info(&self) -> std::io::Result<UpdateInfo<'a, '_, F>> {
        // Input times are a precondition; surface their error up front.
        self.input_times()?;
        Ok(UpdateInfo {
            check: self,
            next: 0,
        })
    }

    fn output_info(&self, output: &'a str) -> std::io::Result<OutputUpdateInfo<'a>> {
        let mtime = match self.fs.stat(output)? {
            MTime::Missing => {
                return Ok(OutputUpdateInfo {
                    output,
                    input: None,
                    needs_update: true,
                    exists: false,
                })
            }
            MTime::Stamp(mtime) => mtime,
        };
        // An invalid rule has no input times; nothing can be blamed.
        let times = self.input_times()?.unwrap_or(&[]);
        let input = self
            .rule
            .ins()
            .iter()
            .zip(times)
            .find(|&(_, &time)| time > mtime)
            .map(|(input, _)| input.as_str());
        Ok(OutputUpdateInfo {
            output,
            input,
            needs_update: input.is_some(),
            exists: true,
        })
    }
}

/// Iterator returned by RuleCheck::update_info.
pub struct UpdateInfo<'a, 'c, F: FileSystem> {
    check: &'c RuleCheck<'a, F>,
    next: usize,
}

impl<'a, 'c, F: FileSystem> Iterator for UpdateInfo<'a, 'c, F> {
    type Item = std::io::Result<OutputUpdateInfo<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let output = self.check.rule.outs().get(self.next)?;
        self.next += 1;
        Some(self.check.output_info(output))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.check.rule.outs().len() - self.next;
        (left, Some(left))
    }
}

impl<'a, 'c, F: FileSystem> ExactSizeIterator for UpdateInfo<'a, 'c, F> {}
