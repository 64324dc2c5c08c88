//! Cooperative-game side of the engine: parties, the coalition value
//! function, and exhaustive coalition enumeration
//!
//! The synergy value function and the stability / formation heuristics are
//! modelling choices, not a validated characteristic function. Their exact
//! shape is kept stable so results stay comparable across releases.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Enumeration walks a `u64` bitmask, and 2^30 subsets is already far past
/// any practical run, so this bounds whatever cap the config asks for.
const BITMASK_CEILING: usize = 30;

/// Caller-assigned party identifier
pub type PartyId = String;

/// A participant in a multi-party negotiation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub id: PartyId,
    #[serde(default)]
    pub name: String,
    /// Relative bargaining weight, 0-100
    pub power: f64,
    /// Non-negative currency amount the party can commit
    #[serde(default)]
    pub resources: f64,
    #[serde(default)]
    pub interests: BTreeSet<String>,
}

impl Party {
    pub fn new(
        id: impl Into<PartyId>,
        name: impl Into<String>,
        power: f64,
        resources: f64,
        interests: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self> {
        let party = Party {
            id: id.into(),
            name: name.into(),
            power,
            resources,
            interests: interests.into_iter().map(Into::into).collect(),
        };
        party.validate()?;
        Ok(party)
    }

    /// Check power and resource ranges.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| EngineError::InvalidParty {
            id: self.id.clone(),
            reason,
        };
        if !(0.0..=100.0).contains(&self.power) {
            return Err(invalid(format!("power {} outside 0-100", self.power)));
        }
        if !self.resources.is_finite() || self.resources < 0.0 {
            return Err(invalid(format!("resources {} must be non-negative", self.resources)));
        }
        Ok(())
    }
}

/// Validate every party and reject duplicate ids.
pub fn validate_parties(parties: &[Party]) -> Result<()> {
    let mut seen = HashSet::with_capacity(parties.len());
    for party in parties {
        party.validate()?;
        if !seen.insert(party.id.as_str()) {
            return Err(EngineError::InvalidParty {
                id: party.id.clone(),
                reason: "duplicate id".to_string(),
            });
        }
    }
    Ok(())
}

/// Value of a coalition, given as indices into the party list.
///
/// Must be deterministic and return 0 for the empty coalition. `Sync` so the
/// Shapley sampler can share it across worker threads.
pub trait CharacteristicFunction: Sync {
    fn value(&self, members: &[usize]) -> f64;
}

impl<F> CharacteristicFunction for F
where
    F: Fn(&[usize]) -> f64 + Sync,
{
    fn value(&self, members: &[usize]) -> f64 {
        self(members)
    }
}

/// Default value function:
/// `(Σ power / 100) · stake · (1 + 0.1·|common interests| + 0.05·ln|members|)`
#[derive(Debug, Clone, Copy)]
pub struct SynergyValue<'a> {
    parties: &'a [Party],
    total_stake: f64,
}

impl<'a> SynergyValue<'a> {
    pub fn new(parties: &'a [Party], total_stake: f64) -> Self {
        SynergyValue {
            parties,
            total_stake,
        }
    }
}

impl CharacteristicFunction for SynergyValue<'_> {
    fn value(&self, members: &[usize]) -> f64 {
        if members.is_empty() {
            return 0.0;
        }
        let power: f64 = members.iter().map(|&i| self.parties[i].power).sum();
        let common = common_interests(self.parties, members).len() as f64;
        let synergy = 1.0 + 0.1 * common + 0.05 * (members.len() as f64).ln();
        power / 100.0 * self.total_stake * synergy
    }
}

/// Interest tags shared by every member
fn common_interests<'p>(parties: &'p [Party], members: &[usize]) -> BTreeSet<&'p str> {
    let mut iter = members.iter().map(|&i| &parties[i].interests);
    let Some(first) = iter.next() else {
        return BTreeSet::new();
    };
    let mut common: BTreeSet<&str> = first.iter().map(String::as_str).collect();
    for interests in iter {
        common.retain(|tag| interests.contains(*tag));
    }
    common
}

/// Interest tags held by at least one member
fn union_interests<'p>(parties: &'p [Party], members: &[usize]) -> BTreeSet<&'p str> {
    members
        .iter()
        .flat_map(|&i| parties[i].interests.iter().map(String::as_str))
        .collect()
}

/// `|common| / |union|` of member interests; 0 when nobody has interests.
fn interest_alignment(parties: &[Party], members: &[usize]) -> f64 {
    let union = union_interests(parties, members).len();
    if union == 0 {
        return 0.0;
    }
    common_interests(parties, members).len() as f64 / union as f64
}

/// `1 / (1 + cv²)`: 1 for identical values, towards 0 as they spread out.
fn homogeneity(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let n = values.clone().count() as f64;
    if n == 0.0 {
        return 1.0;
    }
    let mean = values.clone().sum::<f64>() / n;
    if mean <= 0.0 {
        return 1.0;
    }
    let variance = values.map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    1.0 / (1.0 + variance / (mean * mean))
}

/// A candidate coalition of two or more parties
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coalition {
    pub members: Vec<PartyId>,
    pub value: f64,
    /// 0-1: balance of member power averaged with interest alignment
    pub stability: f64,
    /// 0-1: shrinks with size, grows with aligned interests and similar resources
    pub formation_probability: f64,
}

impl Coalition {
    fn score(parties: &[Party], members: &[usize], value: f64) -> Self {
        let alignment = interest_alignment(parties, members);
        let power_balance = homogeneity(members.iter().map(|&i| parties[i].power));
        let resource_balance = homogeneity(members.iter().map(|&i| parties[i].resources));
        let size_penalty = 0.8_f64.powi(members.len() as i32 - 2);

        Coalition {
            members: members.iter().map(|&i| parties[i].id.clone()).collect(),
            value,
            stability: (power_balance + alignment) / 2.0,
            formation_probability: size_penalty
                * (0.5 + 0.5 * alignment)
                * (0.5 + 0.5 * resource_balance),
        }
    }

    /// Value weighted by how likely the coalition is to form
    pub fn expected_value(&self) -> f64 {
        self.value * self.formation_probability
    }
}

/// Enumerate every coalition of two or more parties, highest value first.
///
/// Visits all `2^N - (N + 1)` qualifying subsets; fails with
/// `ScalabilityLimit` rather than truncating when `N` exceeds `cap`.
pub fn enumerate_coalitions(
    parties: &[Party],
    value_fn: &impl CharacteristicFunction,
    cap: usize,
) -> Result<Vec<Coalition>> {
    let n = parties.len();
    let cap = cap.min(BITMASK_CEILING);
    if n > cap {
        return Err(EngineError::ScalabilityLimit { parties: n, cap });
    }

    let mut members = Vec::with_capacity(n);
    let mut coalitions = Vec::new();
    for mask in 1u64..(1u64 << n) {
        if mask.count_ones() < 2 {
            continue;
        }
        members.clear();
        members.extend((0..n).filter(|&i| mask & (1 << i) != 0));
        let value = value_fn.value(&members);
        coalitions.push(Coalition::score(parties, &members, value));
    }
    // Stable sort: equal values keep bitmask order
    coalitions.sort_by(|a, b| b.value.total_cmp(&a.value));

    log::debug!("enumerated {} coalitions over {} parties", coalitions.len(), n);
    Ok(coalitions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_two_parties_one_coalition() {
        let parties = fixtures::parties(2);
        let value = SynergyValue::new(&parties, 1_000.0);
        let coalitions = enumerate_coalitions(&parties, &value, 20).unwrap();
        assert_eq!(coalitions.len(), 1);
        assert_eq!(coalitions[0].members, vec!["p0", "p1"]);
    }

    #[test]
    fn test_subset_count_formula() {
        for n in 0..=6 {
            let parties = fixtures::parties(n);
            let value = SynergyValue::new(&parties, 1_000.0);
            let coalitions = enumerate_coalitions(&parties, &value, 20).unwrap();
            let expected = (1usize << n) - (n + 1);
            assert_eq!(coalitions.len(), expected, "n = {}", n);
        }
    }

    #[test]
    fn test_sorted_descending_by_value() {
        let parties = fixtures::parties(5);
        let value = SynergyValue::new(&parties, 1_000.0);
        let coalitions = enumerate_coalitions(&parties, &value, 20).unwrap();
        assert!(coalitions.windows(2).all(|w| w[0].value >= w[1].value));
        assert_eq!(coalitions[0].members.len(), 5);
    }

    #[test]
    fn test_scalability_limit() {
        let parties = fixtures::parties(4);
        let value = SynergyValue::new(&parties, 1_000.0);
        let err = enumerate_coalitions(&parties, &value, 3).unwrap_err();
        assert_eq!(err, EngineError::ScalabilityLimit { parties: 4, cap: 3 });
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_synergy_formula() {
        let parties = vec![
            Party::new("a", "A", 40.0, 100.0, ["ip", "damages"]).unwrap(),
            Party::new("b", "B", 20.0, 100.0, ["ip"]).unwrap(),
        ];
        let value = SynergyValue::new(&parties, 1_000.0);
        // 0.6 * 1000 * (1 + 0.1 * 1 + 0.05 * ln 2)
        let expected = 600.0 * (1.1 + 0.05 * 2f64.ln());
        assert!((value.value(&[0, 1]) - expected).abs() < 1e-9);
        assert_eq!(value.value(&[]), 0.0);
        // A lone party shares all its own interests
        assert!((value.value(&[0]) - 400.0 * 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_stability_and_formation_bounds() {
        let parties = fixtures::parties(6);
        let value = SynergyValue::new(&parties, 1_000.0);
        for c in enumerate_coalitions(&parties, &value, 20).unwrap() {
            assert!((0.0..=1.0).contains(&c.stability), "{:?}", c);
            assert!((0.0..=1.0).contains(&c.formation_probability), "{:?}", c);
        }
    }

    #[test]
    fn test_identical_pair_is_fully_stable() {
        let parties = vec![
            Party::new("a", "A", 50.0, 10.0, ["x"]).unwrap(),
            Party::new("b", "B", 50.0, 10.0, ["x"]).unwrap(),
        ];
        let value = SynergyValue::new(&parties, 100.0);
        let c = &enumerate_coalitions(&parties, &value, 20).unwrap()[0];
        assert!((c.stability - 1.0).abs() < 1e-12);
        assert!((c.formation_probability - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_size_penalty_on_formation() {
        let parties: Vec<Party> = (0..3)
            .map(|i| Party::new(format!("p{}", i), "", 30.0, 10.0, ["x"]).unwrap())
            .collect();
        let value = SynergyValue::new(&parties, 100.0);
        let coalitions = enumerate_coalitions(&parties, &value, 20).unwrap();
        let trio = coalitions.iter().find(|c| c.members.len() == 3).unwrap();
        let pair = coalitions.iter().find(|c| c.members.len() == 2).unwrap();
        assert!((trio.formation_probability - 0.8 * pair.formation_probability).abs() < 1e-12);
    }

    #[test]
    fn test_party_validation() {
        assert!(matches!(
            Party::new("x", "X", 120.0, 0.0, Vec::<String>::new()),
            Err(EngineError::InvalidParty { .. })
        ));
        assert!(matches!(
            Party::new("x", "X", 10.0, -1.0, Vec::<String>::new()),
            Err(EngineError::InvalidParty { .. })
        ));
        let dup = vec![
            Party::new("x", "X", 10.0, 0.0, Vec::<String>::new()).unwrap(),
            Party::new("x", "Y", 20.0, 0.0, Vec::<String>::new()).unwrap(),
        ];
        let err = validate_parties(&dup).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParty { ref reason, .. } if reason == "duplicate id"));
    }
}
