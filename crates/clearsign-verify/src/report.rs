//! Check results, the overall verdict and its text rendering.

use chrono::{DateTime, Utc};
use clearsign_core::chain::chain_name;
use clearsign_core::Confidence;
use serde::Serialize;
use std::fmt::Write as _;

use crate::proxy::ProxyResolution;

/// A format key found on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyMatch {
    pub key: String,
    pub selector: String,
    /// The on-chain signature the key resolved to.
    pub signature: String,
}

/// Closest on-chain function for a key that did not match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Proposal {
    pub signature: String,
    pub selector: String,
    pub score: i64,
    pub confidence: Confidence,
}

/// A format key with no on-chain function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub key: String,
    /// `None` when the key could not be parsed.
    pub selector: Option<String>,
    pub proposal: Option<Proposal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddressReport {
    pub address: String,
    /// The address whose ABI was checked (the implementation for a resolved proxy).
    pub resolved_address: String,
    pub proxy: ProxyResolution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_name: Option<String>,
    pub abi_functions: usize,
    pub matches: Vec<KeyMatch>,
    pub mismatches: Vec<Mismatch>,
    /// Set when the explorer could not be queried for this address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AddressReport {
    pub fn new(address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            resolved_address: address.clone(),
            address,
            proxy: ProxyResolution::Direct,
            contract_name: None,
            abi_functions: 0,
            matches: Vec::new(),
            mismatches: Vec::new(),
            error: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChainOutcome {
    Validated { addresses: Vec<AddressReport> },
    Skipped { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainReport {
    pub chain_id: u64,
    pub chain_name: &'static str,
    #[serde(flatten)]
    pub outcome: ChainOutcome,
}

impl ChainReport {
    pub fn validated(chain_id: u64, addresses: Vec<AddressReport>) -> Self {
        Self {
            chain_id,
            chain_name: chain_name(chain_id),
            outcome: ChainOutcome::Validated { addresses },
        }
    }

    pub fn skipped(chain_id: u64, reason: impl Into<String>) -> Self {
        Self {
            chain_id,
            chain_name: chain_name(chain_id),
            outcome: ChainOutcome::Skipped {
                reason: reason.into(),
            },
        }
    }

    pub fn addresses(&self) -> &[AddressReport] {
        match &self.outcome {
            ChainOutcome::Validated { addresses } => addresses,
            ChainOutcome::Skipped { .. } => &[],
        }
    }
}

/// Overall outcome of a check, mapped onto the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    FullMatch,
    PassedWithSkips,
    Fatal,
    Mismatches,
}

impl Verdict {
    pub fn exit_code(self) -> i32 {
        match self {
            Verdict::FullMatch | Verdict::PassedWithSkips => 0,
            Verdict::Fatal => 1,
            Verdict::Mismatches => 2,
        }
    }
}

/// Counters across every checked address, errored ones included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub chains_validated: usize,
    pub chains_skipped: usize,
    pub addresses: usize,
    pub address_errors: usize,
    pub matches: usize,
    pub mismatches: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub generated_at: DateTime<Utc>,
    pub format_keys: usize,
    pub chains: Vec<ChainReport>,
}

impl ValidationReport {
    pub fn new(format_keys: usize) -> Self {
        Self {
            generated_at: Utc::now(),
            format_keys,
            chains: Vec::new(),
        }
    }

    pub fn totals(&self) -> Totals {
        let mut totals = Totals::default();
        for chain in &self.chains {
            match &chain.outcome {
                ChainOutcome::Skipped { .. } => totals.chains_skipped += 1,
                ChainOutcome::Validated { addresses } => {
                    totals.chains_validated += 1;
                    for a in addresses {
                        totals.addresses += 1;
                        totals.address_errors += usize::from(a.error.is_some());
                        totals.matches += a.matches.len();
                        totals.mismatches += a.mismatches.len();
                    }
                }
            }
        }
        totals
    }

    /// No validated chain or any fetch error is fatal; mismatches outrank skips.
    pub fn verdict(&self) -> Verdict {
        let totals = self.totals();
        if totals.chains_validated == 0 || totals.address_errors > 0 {
            Verdict::Fatal
        } else if totals.mismatches > 0 {
            Verdict::Mismatches
        } else if totals.chains_skipped > 0 {
            Verdict::PassedWithSkips
        } else {
            Verdict::FullMatch
        }
    }

    /// Human-readable rendering for terminals.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for chain in &self.chains {
            let _ = writeln!(out, "Chain {} ({})", chain.chain_id, chain.chain_name);
            if let ChainOutcome::Skipped { reason } = &chain.outcome {
                let _ = writeln!(out, "  skipped: {reason}");
                continue;
            }
            for a in chain.addresses() {
                let _ = writeln!(out, "  {}", a.address);
                if a.proxy.is_proxy() {
                    let _ = writeln!(out, "    proxy:     {}", a.proxy);
                }
                if let Some(err) = &a.error {
                    let _ = writeln!(out, "    ✗ error:   {err}");
                    continue;
                }
                let _ = writeln!(
                    out,
                    "    ABI:       {} functions{}",
                    a.abi_functions,
                    a.contract_name
                        .as_deref()
                        .map(|n| format!(" ({n})"))
                        .unwrap_or_default()
                );
                for m in &a.matches {
                    let _ = writeln!(out, "    ✓ {} {}", m.selector, m.key);
                }
                for m in &a.mismatches {
                    let selector = m.selector.as_deref().unwrap_or("??????????");
                    let _ = writeln!(out, "    ✗ {selector} {}", m.key);
                    match &m.proposal {
                        Some(p) => {
                            let _ = writeln!(
                                out,
                                "        did you mean {} {} (score {}, {} confidence)",
                                p.selector, p.signature, p.score, p.confidence
                            );
                        }
                        None => {
                            let _ = writeln!(out, "        no proposal");
                        }
                    }
                }
            }
        }

        let totals = self.totals();
        let _ = writeln!(
            out,
            "\n{} matched, {} mismatched, {} address errors, {} chains skipped → {:?}",
            totals.matches,
            totals.mismatches,
            totals.address_errors,
            totals.chains_skipped,
            self.verdict()
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(matches: usize, mismatches: usize, error: bool) -> AddressReport {
        let mut a = AddressReport::new("0xabc");
        a.matches = (0..matches)
            .map(|i| KeyMatch {
                key: format!("f{i}()"),
                selector: "0x00000000".into(),
                signature: format!("f{i}()"),
            })
            .collect();
        a.mismatches = (0..mismatches)
            .map(|i| Mismatch {
                key: format!("g{i}()"),
                selector: None,
                proposal: None,
            })
            .collect();
        a.error = error.then(|| "HTTP error: reset".to_string());
        a
    }

    fn report(chains: Vec<ChainReport>) -> ValidationReport {
        let mut r = ValidationReport::new(2);
        r.chains = chains;
        r
    }

    #[test]
    fn verdicts() {
        let full = report(vec![ChainReport::validated(1, vec![address(2, 0, false)])]);
        assert_eq!(full.verdict(), Verdict::FullMatch);

        let skips = report(vec![
            ChainReport::validated(1, vec![address(2, 0, false)]),
            ChainReport::skipped(10, "no key"),
        ]);
        assert_eq!(skips.verdict(), Verdict::PassedWithSkips);

        let mismatched = report(vec![
            ChainReport::validated(1, vec![address(1, 1, false)]),
            ChainReport::skipped(10, "no key"),
        ]);
        assert_eq!(mismatched.verdict(), Verdict::Mismatches);

        let errored = report(vec![ChainReport::validated(1, vec![address(1, 1, false), address(0, 0, true)])]);
        assert_eq!(errored.verdict(), Verdict::Fatal);

        let nothing = report(vec![ChainReport::skipped(1, "no key")]);
        assert_eq!(nothing.verdict(), Verdict::Fatal);
    }

    #[test]
    fn exit_codes_are_distinct_for_mismatches() {
        assert_eq!(Verdict::FullMatch.exit_code(), 0);
        assert_eq!(Verdict::PassedWithSkips.exit_code(), 0);
        assert_eq!(Verdict::Fatal.exit_code(), 1);
        assert_eq!(Verdict::Mismatches.exit_code(), 2);
    }

    #[test]
    fn totals_count_errored_addresses() {
        let r = report(vec![ChainReport::validated(1, vec![address(3, 1, false), address(0, 0, true)])]);
        let t = r.totals();
        assert_eq!(t.addresses, 2);
        assert_eq!(t.address_errors, 1);
        assert_eq!(t.matches, 3);
        assert_eq!(t.mismatches, 1);
    }

    #[test]
    fn json_shape() {
        let r = report(vec![ChainReport::skipped(10, "no key")]);
        let value = serde_json::to_value(&r).unwrap();
        assert_eq!(value["chains"][0]["status"], "skipped");
        assert_eq!(value["chains"][0]["chain_name"], "optimism");
        assert_eq!(value["chains"][0]["reason"], "no key");
    }

    #[test]
    fn text_rendering_mentions_proposals() {
        let mut a = address(0, 0, false);
        a.mismatches.push(Mismatch {
            key: "transfer(address,uint128)".into(),
            selector: Some("0x12345678".into()),
            proposal: Some(Proposal {
                signature: "transfer(address to,uint256 amount)".into(),
                selector: "0xa9059cbb".into(),
                score: 0,
                confidence: Confidence::High,
            }),
        });
        let text = report(vec![ChainReport::validated(1, vec![a])]).render_text();
        assert!(text.contains("did you mean 0xa9059cbb transfer(address to,uint256 amount)"));
        assert!(text.contains("high confidence"));
        assert!(text.contains("Mismatches"));
    }
}
