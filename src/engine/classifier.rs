//! Fusion classifier: a priority-ordered guard chain
//!
//! Each [`GuardRule`] inspects the gathered [`ScanFacts`] and either decides
//! the verdict, appends a note and lets evaluation continue, or passes. The
//! first rule that decides wins and every later rule is skipped. A scan that
//! passes every guard is a [`FusionVerdict::Match`].
//!
//! | # | rule                       | verdict           |
//! |---|----------------------------|-------------------|
//! | 1 | `cloud_key_mismatch`       | MISMATCH          |
//! | 2 | `registry_absent`          | NOT_ENROLLED      |
//! | 3 | `unenrolled_without_scan`  | NOT_ENROLLED      |
//! | 4 | `tag_on_unenrolled`        | UNKNOWN_TAG       |
//! | 5 | `identity_not_captured`    | UUID_MISSING      |
//! | 6 | `counter_replay`           | COUNTER_ROLLBACK  |
//! | 7 | `crypto_failure`           | CRYPTO_FAIL       |
//! | 8 | `pubkey_mismatch`          | MISMATCH_PUBKEY   |
//! | 9 | `tamper_active`            | TAMPER            |
//! | - | (no guard decided)         | MATCH             |
//!
//! Rules are written assuming every earlier rule passed.

use crate::domain::{CloudVerdict, FusionInput, FusionVerdict, ReplayOutcome};

use super::{FusionPolicy, ReplayGuard};

/// Reason attached when no guard decides.
pub const MATCH_REASON: &str = "All cryptographic checks passed and pubkey matches registry.";

/// Plain facts the guard chain decides over.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanFacts {
    pub cloud_verdict: Option<CloudVerdict>,
    pub in_registry: bool,
    pub has_gotid: bool,
    pub has_scan: bool,
    pub identity_captured: bool,
    pub replay: ReplayOutcome,
    pub sig_valid: Option<bool>,
    pub chal_valid: Option<bool>,
    pub pubkey_match: Option<bool>,
    pub tamper: Option<bool>,
}

impl ScanFacts {
    pub fn gather(input: &FusionInput, policy: &FusionPolicy) -> Self {
        let scan = input.scan_event.as_ref();

        Self {
            cloud_verdict: scan.and_then(|s| s.cloud_verdict),
            in_registry: input.registry_vehicle.is_some(),
            has_gotid: policy.has_gotid(input.registry_vehicle.as_ref()),
            has_scan: scan.is_some(),
            identity_captured: scan.is_some_and(|s| s.captured_identity()),
            replay: ReplayGuard::check(scan.and_then(|s| s.counter), input.last_counter),
            sig_valid: scan.and_then(|s| s.sig_valid),
            chal_valid: scan.and_then(|s| s.chal_valid),
            pubkey_match: scan.and_then(|s| s.pubkey_match),
            tamper: scan.and_then(|s| s.tamper),
        }
    }
}

/// Outcome of evaluating a single guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Set the verdict and stop evaluating
    Decide(FusionVerdict, &'static str),
    /// Record a reason and keep evaluating
    Note(&'static str),
    Pass,
}

/// Named predicate in the guard chain.
pub struct GuardRule {
    pub name: &'static str,
    pub check: fn(&ScanFacts) -> Step,
}

pub const GUARD_CHAIN: &[GuardRule] = &[
    GuardRule {
        name: "cloud_key_mismatch",
        check: cloud_key_mismatch,
    },
    GuardRule {
        name: "registry_absent",
        check: registry_absent,
    },
    GuardRule {
        name: "unenrolled_without_scan",
        check: unenrolled_without_scan,
    },
    GuardRule {
        name: "tag_on_unenrolled",
        check: tag_on_unenrolled,
    },
    GuardRule {
        name: "identity_not_captured",
        check: identity_not_captured,
    },
    GuardRule {
        name: "counter_replay",
        check: counter_replay,
    },
    GuardRule {
        name: "crypto_failure",
        check: crypto_failure,
    },
    GuardRule {
        name: "pubkey_mismatch",
        check: pubkey_mismatch,
    },
    GuardRule {
        name: "tamper_active",
        check: tamper_active,
    },
];

fn cloud_key_mismatch(facts: &ScanFacts) -> Step {
    if facts.cloud_verdict == Some(CloudVerdict::KeyMismatch) {
        Step::Decide(
            FusionVerdict::Mismatch,
            "Plate is enrolled but presented pubkey is not enrolled/matching (clone suspected).",
        )
    } else {
        Step::Pass
    }
}

fn registry_absent(facts: &ScanFacts) -> Step {
    if facts.in_registry {
        Step::Pass
    } else {
        Step::Decide(
            FusionVerdict::NotEnrolled,
            "Vehicle not found in registry for this scan context.",
        )
    }
}

fn unenrolled_without_scan(facts: &ScanFacts) -> Step {
    if !facts.has_gotid && !facts.has_scan {
        Step::Decide(
            FusionVerdict::NotEnrolled,
            "Vehicle does not have GOT-ID assigned.",
        )
    } else {
        Step::Pass
    }
}

fn tag_on_unenrolled(facts: &ScanFacts) -> Step {
    if !facts.has_gotid {
        Step::Decide(
            FusionVerdict::UnknownTag,
            "GOT-ID tag detected but vehicle is not enrolled for GOT-ID.",
        )
    } else {
        Step::Pass
    }
}

fn identity_not_captured(facts: &ScanFacts) -> Step {
    if !facts.has_scan || !facts.identity_captured {
        Step::Decide(
            FusionVerdict::UuidMissing,
            "Enrolled vehicle but no GOT-ID identity was captured within scan window.",
        )
    } else {
        Step::Pass
    }
}

fn counter_replay(facts: &ScanFacts) -> Step {
    match facts.replay {
        ReplayOutcome::Rollback => Step::Decide(
            FusionVerdict::CounterRollback,
            "Counter rolled back compared to previous scan (possible replay/clone).",
        ),
        ReplayOutcome::Stalled => {
            Step::Note("Counter did not advance since previous scan (possible replay).")
        }
        ReplayOutcome::Advanced | ReplayOutcome::NotCompared => Step::Pass,
    }
}

fn crypto_failure(facts: &ScanFacts) -> Step {
    if facts.sig_valid == Some(false) || facts.chal_valid == Some(false) {
        Step::Decide(
            FusionVerdict::CryptoFail,
            "Signature or challenge-response failed.",
        )
    } else {
        Step::Pass
    }
}

fn pubkey_mismatch(facts: &ScanFacts) -> Step {
    if facts.pubkey_match == Some(false) {
        Step::Decide(
            FusionVerdict::MismatchPubkey,
            "GOT-ID tag pubkey does not match registry.",
        )
    } else {
        Step::Pass
    }
}

fn tamper_active(facts: &ScanFacts) -> Step {
    if facts.tamper == Some(true) {
        Step::Decide(FusionVerdict::Tamper, "GOT-ID tag tamper input is active.")
    } else {
        Step::Pass
    }
}

/// Verdict plus the reasons and deciding rule that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub verdict: FusionVerdict,
    pub reasons: Vec<String>,
    /// Name of the deciding guard, `None` for the default MATCH
    pub decided_by: Option<&'static str>,
}

pub struct FusionClassifier;

impl FusionClassifier {
    pub fn classify(facts: &ScanFacts) -> Classification {
        let mut reasons = Vec::new();

        for rule in GUARD_CHAIN {
            match (rule.check)(facts) {
                Step::Decide(verdict, reason) => {
                    reasons.push(reason.to_string());
                    return Classification {
                        verdict,
                        reasons,
                        decided_by: Some(rule.name),
                    };
                }
                Step::Note(reason) => reasons.push(reason.to_string()),
                Step::Pass => {}
            }
        }

        reasons.push(MATCH_REASON.to_string());
        Classification {
            verdict: FusionVerdict::Match,
            reasons,
            decided_by: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enrolled_clean() -> ScanFacts {
        ScanFacts {
            cloud_verdict: Some(CloudVerdict::Authentic),
            in_registry: true,
            has_gotid: true,
            has_scan: true,
            identity_captured: true,
            replay: ReplayOutcome::Advanced,
            sig_valid: Some(true),
            chal_valid: Some(true),
            pubkey_match: Some(true),
            tamper: Some(false),
        }
    }

    fn rule(name: &str) -> &'static GuardRule {
        GUARD_CHAIN
            .iter()
            .find(|r| r.name == name)
            .expect("rule exists")
    }

    #[test]
    fn test_chain_order_is_stable() {
        let names: Vec<_> = GUARD_CHAIN.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "cloud_key_mismatch",
                "registry_absent",
                "unenrolled_without_scan",
                "tag_on_unenrolled",
                "identity_not_captured",
                "counter_replay",
                "crypto_failure",
                "pubkey_mismatch",
                "tamper_active",
            ]
        );
    }

    #[test]
    fn test_clean_scan_matches() {
        let result = FusionClassifier::classify(&enrolled_clean());
        assert_eq!(result.verdict, FusionVerdict::Match);
        assert_eq!(result.decided_by, None);
        assert_eq!(result.reasons, vec![MATCH_REASON.to_string()]);
    }

    #[test]
    fn test_key_mismatch_preempts_everything() {
        let facts = ScanFacts {
            cloud_verdict: Some(CloudVerdict::KeyMismatch),
            in_registry: false,
            has_gotid: false,
            replay: ReplayOutcome::Rollback,
            sig_valid: Some(false),
            ..enrolled_clean()
        };
        let result = FusionClassifier::classify(&facts);
        assert_eq!(result.verdict, FusionVerdict::Mismatch);
        assert_eq!(result.decided_by, Some("cloud_key_mismatch"));
    }

    #[test]
    fn test_registry_absent_rule() {
        let facts = ScanFacts {
            in_registry: false,
            ..enrolled_clean()
        };
        assert!(matches!(
            (rule("registry_absent").check)(&facts),
            Step::Decide(FusionVerdict::NotEnrolled, _)
        ));
        assert_eq!((rule("registry_absent").check)(&enrolled_clean()), Step::Pass);
    }

    #[test]
    fn test_unenrolled_vehicle_rules() {
        let no_scan = ScanFacts {
            has_gotid: false,
            has_scan: false,
            ..enrolled_clean()
        };
        let result = FusionClassifier::classify(&no_scan);
        assert_eq!(result.verdict, FusionVerdict::NotEnrolled);
        assert_eq!(result.decided_by, Some("unenrolled_without_scan"));

        let with_scan = ScanFacts {
            has_gotid: false,
            ..enrolled_clean()
        };
        let result = FusionClassifier::classify(&with_scan);
        assert_eq!(result.verdict, FusionVerdict::UnknownTag);
    }

    #[test]
    fn test_identity_not_captured_rule() {
        let facts = ScanFacts {
            identity_captured: false,
            ..enrolled_clean()
        };
        let result = FusionClassifier::classify(&facts);
        assert_eq!(result.verdict, FusionVerdict::UuidMissing);

        let facts = ScanFacts {
            has_scan: false,
            ..enrolled_clean()
        };
        assert!(matches!(
            (rule("identity_not_captured").check)(&facts),
            Step::Decide(FusionVerdict::UuidMissing, _)
        ));
    }

    #[test]
    fn test_counter_rules() {
        let rollback = ScanFacts {
            replay: ReplayOutcome::Rollback,
            ..enrolled_clean()
        };
        assert_eq!(
            FusionClassifier::classify(&rollback).verdict,
            FusionVerdict::CounterRollback
        );

        let stalled = ScanFacts {
            replay: ReplayOutcome::Stalled,
            ..enrolled_clean()
        };
        let result = FusionClassifier::classify(&stalled);
        assert_eq!(result.verdict, FusionVerdict::Match);
        assert_eq!(result.reasons.len(), 2);
        assert!(result.reasons[0].contains("did not advance"));

        let stalled_tamper = ScanFacts {
            replay: ReplayOutcome::Stalled,
            tamper: Some(true),
            ..enrolled_clean()
        };
        let result = FusionClassifier::classify(&stalled_tamper);
        assert_eq!(result.verdict, FusionVerdict::Tamper);
        assert!(result.reasons[0].contains("did not advance"));
    }

    #[test]
    fn test_crypto_flag_precedence() {
        let all_bad = ScanFacts {
            chal_valid: Some(false),
            pubkey_match: Some(false),
            tamper: Some(true),
            ..enrolled_clean()
        };
        assert_eq!(
            FusionClassifier::classify(&all_bad).verdict,
            FusionVerdict::CryptoFail
        );

        let key_and_tamper = ScanFacts {
            pubkey_match: Some(false),
            tamper: Some(true),
            ..enrolled_clean()
        };
        assert_eq!(
            FusionClassifier::classify(&key_and_tamper).verdict,
            FusionVerdict::MismatchPubkey
        );

        let tamper = ScanFacts {
            tamper: Some(true),
            ..enrolled_clean()
        };
        assert_eq!(
            FusionClassifier::classify(&tamper).verdict,
            FusionVerdict::Tamper
        );
    }

    #[test]
    fn test_unknown_flags_do_not_fail() {
        let facts = ScanFacts {
            sig_valid: None,
            chal_valid: None,
            pubkey_match: None,
            tamper: None,
            ..enrolled_clean()
        };
        assert_eq!(
            FusionClassifier::classify(&facts).verdict,
            FusionVerdict::Match
        );
    }
}
