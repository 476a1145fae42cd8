//! Suppression ledgers and the counted-consumption registry.
//!
//! A [`Ledger`] is the mutable per-scan map of remaining suppression
//! counts, `path -> rule -> message -> count`. Consuming an entry
//! decrements it exactly once; an entry that reaches zero is removed, and
//! rule/path branches left empty are pruned on the spot. The pruning is
//! load-bearing: an empty ledger *is* the "everything matched" signal, both
//! locally and inside the cross-worker reconciliation file.
//!
//! A [`Registry`] owns one immutable original snapshot plus two
//! independently decrementing views of it: the check pass walks a file
//! once, while the fix pass may walk the same file repeatedly until the
//! engine's fixes converge and must re-suppress the same findings on every
//! iteration (see [`Registry::begin_fix_pass`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use quell_types::SuppressionEntry;

/// Configuration-level failure raised while seeding a registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A suppression that may match zero times is meaningless; the entry
    /// should be deleted instead.
    #[error(
        "count for path '{path}', rule '{rule}' and message '{message}' must be greater than 0"
    )]
    CountNotPositive {
        path: String,
        rule: String,
        message: String,
    },
}

/// Internal-invariant violation: a remaining ledger references an entry the
/// original snapshot does not cover (missing key, or a remaining count
/// larger than the seeded one). Always a programming defect.
#[derive(Debug, Error, PartialEq, Eq)]
#[error(
    "remaining ledger entry for path '{path}', rule '{rule}', message '{message}' \
     is not covered by the original snapshot"
)]
pub struct ConsistencyError {
    pub path: String,
    pub rule: String,
    pub message: String,
}

/// Which of the registry's two decrementing views to operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Single-pass dry-run/check scan.
    Check,
    /// Auto-fix scan; may revisit a file once per convergence loop.
    Fix,
}

/// Remaining suppression counts: `path -> rule -> message -> count`.
///
/// Invariant: no empty rule or path sub-map, and no zero count, is ever
/// stored. All constructors and mutators preserve this.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger(BTreeMap<String, BTreeMap<String, BTreeMap<String, u32>>>);

impl Ledger {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of `(path, rule, message)` entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.0
            .values()
            .flat_map(|rules| rules.values())
            .map(BTreeMap::len)
            .sum()
    }

    /// Remaining count for one entry, if present.
    #[must_use]
    pub fn get(&self, path: &str, rule: &str, message: &str) -> Option<u32> {
        self.0.get(path)?.get(rule)?.get(message).copied()
    }

    /// Insert or overwrite one entry. Last writer wins, matching the
    /// precedence order of merged suppression documents.
    pub fn insert(&mut self, path: &str, rule: &str, message: &str, count: u32) {
        self.0
            .entry(path.to_string())
            .or_default()
            .entry(rule.to_string())
            .or_default()
            .insert(message.to_string(), count);
    }

    /// Consume one unit of the entry, pruning emptied branches.
    ///
    /// Returns whether a suppression was applied. Unknown paths, rules, and
    /// messages are simply "not suppressed" — never an error.
    pub fn consume(&mut self, path: &str, rule: &str, message: &str) -> bool {
        let Some(rules) = self.0.get_mut(path) else {
            return false;
        };
        let Some(messages) = rules.get_mut(rule) else {
            return false;
        };
        let Some(remaining) = messages.get_mut(message) else {
            return false;
        };

        *remaining -= 1;
        if *remaining == 0 {
            messages.remove(message);
            if messages.is_empty() {
                rules.remove(rule);
            }
            if rules.is_empty() {
                self.0.remove(path);
            }
        }
        true
    }

    /// Deep key-intersection with `other`, keeping the smaller count.
    ///
    /// Each file belongs to exactly one worker, so for any entry the
    /// owner's remaining count is the decremented (smaller or equal) one;
    /// taking the minimum makes the merge order-independent and idempotent.
    #[must_use]
    pub fn intersect(&self, other: &Ledger) -> Ledger {
        let mut out = Ledger::default();
        for (path, rules) in &self.0 {
            let Some(other_rules) = other.0.get(path) else {
                continue;
            };
            for (rule, messages) in rules {
                let Some(other_messages) = other_rules.get(rule) else {
                    continue;
                };
                for (message, &count) in messages {
                    let Some(&other_count) = other_messages.get(message) else {
                        continue;
                    };
                    out.insert(path, rule, message, count.min(other_count));
                }
            }
        }
        out
    }

    /// Flat iteration over `(path, rule, message, count)` in sorted order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &str, u32)> {
        self.0.iter().flat_map(|(path, rules)| {
            rules.iter().flat_map(move |(rule, messages)| {
                messages.iter().map(move |(message, &count)| {
                    (path.as_str(), rule.as_str(), message.as_str(), count)
                })
            })
        })
    }

    /// Replace this ledger's entries for `path` with the ones `from` holds
    /// (removing them when `from` has none).
    fn reseed_path(&mut self, path: &str, from: &Ledger) {
        match from.0.get(path) {
            Some(rules) => {
                self.0.insert(path.to_string(), rules.clone());
            }
            None => {
                self.0.remove(path);
            }
        }
    }
}

/// One process's suppression state: the immutable original snapshot plus
/// the two decrementing views.
///
/// The registry never performs I/O. It is built once per process from the
/// loaded configuration and passed by reference to whatever walks findings.
#[derive(Debug, Clone)]
pub struct Registry {
    original: Ledger,
    check: Ledger,
    fix: Ledger,
}

impl Registry {
    /// Seed a registry from loaded suppression entries.
    ///
    /// Later entries overwrite earlier ones on an identical
    /// `(path, rule, message)` key. Fails on a zero count.
    pub fn load(entries: &[SuppressionEntry]) -> Result<Self, ConfigError> {
        let mut original = Ledger::default();
        for entry in entries {
            if entry.count == 0 {
                return Err(ConfigError::CountNotPositive {
                    path: entry.path.clone(),
                    rule: entry.rule.clone(),
                    message: entry.message.clone(),
                });
            }
            original.insert(&entry.path, &entry.rule, &entry.message, entry.count);
        }
        Ok(Self {
            check: original.clone(),
            fix: original.clone(),
            original,
        })
    }

    /// Consume one unit from the given view. See [`Ledger::consume`].
    pub fn consume(&mut self, view: View, path: &str, rule: &str, message: &str) -> bool {
        self.view_mut(view).consume(path, rule, message)
    }

    /// Re-seed the fix view's entries for `path` from the original
    /// snapshot.
    ///
    /// The fix pass calls this at the top of every convergence-loop
    /// iteration over a file, so each iteration re-suppresses the same
    /// findings the previous one did. The check view is unaffected.
    pub fn begin_fix_pass(&mut self, path: &str) {
        self.fix.reseed_path(path, &self.original);
    }

    /// What has not been matched yet, per view. The check view's remaining
    /// ledger is the authoritative input for outdated detection.
    #[must_use]
    pub fn remaining(&self, view: View) -> &Ledger {
        match view {
            View::Check => &self.check,
            View::Fix => &self.fix,
        }
    }

    /// The immutable load-time snapshot.
    #[must_use]
    pub fn original(&self) -> &Ledger {
        &self.original
    }

    fn view_mut(&mut self, view: View) -> &mut Ledger {
        match view {
            View::Check => &mut self.check,
            View::Fix => &mut self.fix,
        }
    }
}
