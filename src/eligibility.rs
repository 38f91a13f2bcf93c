//! Pure eligibility evaluation over profile tier flags and reputation metrics.

// self
use crate::{_prelude::*, profile::{ProviderProfile, ReputationMetrics}};

/// Inclusive minimums a non-tiered account must meet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
	/// Minimum follower total across moderated channels.
	pub follows: u64,
	/// Minimum count of partnered channels moderated.
	pub partners: u64,
}
impl Default for Thresholds {
	fn default() -> Self {
		Self { follows: 15_000, partners: 1 }
	}
}

/// Why a decision came out the way it did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityReason {
	/// A provider-reported tier flag granted eligibility unconditionally.
	///
	/// No metrics appear in the decision record in this case; none were consulted.
	TierFlag {
		/// Account carried the staff flag.
		staff: bool,
		/// Account carried the partner flag.
		partner: bool,
	},
	/// The decision came from comparing metrics against thresholds.
	///
	/// Carried verbatim so an ineligible user can be shown the exact numbers.
	Metrics {
		/// Metrics the comparison used.
		metrics: ReputationMetrics,
		/// Thresholds the comparison used.
		thresholds: Thresholds,
	},
	/// No tier flag and no metrics were available to evaluate.
	MetricsUnavailable,
}

/// Outcome of an eligibility evaluation. Derived, never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityDecision {
	/// Whether the account met the bar.
	pub eligible: bool,
	/// The inputs that produced the outcome.
	pub reason: EligibilityReason,
}

/// Evaluates eligibility for a profile.
///
/// A staff or partner tier flag grants eligibility regardless of `metrics`. Otherwise
/// both metric comparisons must hold, inclusively: `follows >= thresholds.follows`
/// **and** `partners >= thresholds.partners`. The function is a pure value
/// computation; identical inputs always produce identical output.
pub fn evaluate(
	profile: &ProviderProfile,
	metrics: Option<&ReputationMetrics>,
	thresholds: &Thresholds,
) -> EligibilityDecision {
	if profile.has_tier_flag() {
		return EligibilityDecision {
			eligible: true,
			reason: EligibilityReason::TierFlag {
				staff: profile.is_staff(),
				partner: profile.is_partner(),
			},
		};
	}

	let Some(metrics) = metrics else {
		return EligibilityDecision { eligible: false, reason: EligibilityReason::MetricsUnavailable };
	};

	EligibilityDecision {
		eligible: metrics.follows >= thresholds.follows && metrics.partners >= thresholds.partners,
		reason: EligibilityReason::Metrics { metrics: metrics.clone(), thresholds: *thresholds },
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn profile(user_type: &str, broadcaster_type: &str) -> ProviderProfile {
		ProviderProfile {
			id: "44322889".into(),
			login: "mod_a".into(),
			display_name: "Mod_A".into(),
			user_type: user_type.into(),
			broadcaster_type: broadcaster_type.into(),
		}
	}

	fn metrics(follows: u64, partners: u64) -> ReputationMetrics {
		ReputationMetrics { follows, partners, ..ReputationMetrics::default() }
	}

	#[test]
	fn both_comparisons_are_inclusive_and_conjunctive() {
		let thresholds = Thresholds { follows: 15_000, partners: 1 };
		let plain = profile("", "");
		let cases = [
			(15_000, 1, true),
			(15_001, 1, true),
			(20_000, 2, true),
			(14_999, 1, false),
			(15_000, 0, false),
			(100, 0, false),
			(0, 5, false),
		];

		for (follows, partners, expected) in cases {
			let decision = evaluate(&plain, Some(&metrics(follows, partners)), &thresholds);

			assert_eq!(
				decision.eligible, expected,
				"follows={follows} partners={partners} should be eligible={expected}"
			);
		}
	}

	#[test]
	fn tier_flags_bypass_metrics_entirely() {
		let thresholds = Thresholds::default();
		let decision = evaluate(&profile("staff", ""), None, &thresholds);

		assert!(decision.eligible);
		assert_eq!(decision.reason, EligibilityReason::TierFlag { staff: true, partner: false });

		let decision = evaluate(&profile("", "partner"), Some(&metrics(0, 0)), &thresholds);

		assert!(decision.eligible, "A partner flag must win even over failing metrics.");
		assert_eq!(decision.reason, EligibilityReason::TierFlag { staff: false, partner: true });
	}

	#[test]
	fn ineligible_decisions_carry_the_inputs_verbatim() {
		let thresholds = Thresholds::default();
		let decision = evaluate(&profile("", ""), Some(&metrics(100, 0)), &thresholds);

		assert!(!decision.eligible);
		assert_eq!(
			decision.reason,
			EligibilityReason::Metrics { metrics: metrics(100, 0), thresholds }
		);
	}

	#[test]
	fn evaluation_is_deterministic() {
		let thresholds = Thresholds::default();
		let plain = profile("", "");
		let sample = metrics(20_000, 2);
		let first = evaluate(&plain, Some(&sample), &thresholds);

		for _ in 0..10 {
			assert_eq!(evaluate(&plain, Some(&sample), &thresholds), first);
		}
	}

	#[test]
	fn missing_metrics_without_a_tier_flag_is_ineligible() {
		let decision = evaluate(&profile("", ""), None, &Thresholds::default());

		assert!(!decision.eligible);
		assert_eq!(decision.reason, EligibilityReason::MetricsUnavailable);
	}
}
