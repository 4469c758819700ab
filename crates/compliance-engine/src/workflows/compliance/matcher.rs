use super::domain::{BuildingRecord, CertificateRecord, ComplianceStatus};
use std::collections::HashSet;

/// Registered buildings annotated with their compliance status, and the
/// certificates whose key never appears among the registered buildings.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub registered: Vec<(BuildingRecord, ComplianceStatus)>,
    pub orphans: Vec<CertificateRecord>,
}

impl MatchOutcome {
    pub fn compliant(&self) -> usize {
        self.registered
            .iter()
            .filter(|(_, status)| status.has_epc())
            .count()
    }

    pub fn non_compliant(&self) -> usize {
        self.registered.len() - self.compliant()
    }
}

/// Set-membership join on the normalized registration key. Duplicate keys on
/// either side collapse; every registered record keeps its own row.
pub fn match_registries(
    registered: Vec<BuildingRecord>,
    certified: Vec<CertificateRecord>,
) -> MatchOutcome {
    let certified_keys: HashSet<&str> = certified
        .iter()
        .map(|record| record.reg_key.as_str())
        .collect();
    let registered_keys: HashSet<&str> = registered
        .iter()
        .map(|record| record.reg_key.as_str())
        .collect();

    let orphans = certified
        .iter()
        .filter(|record| !registered_keys.contains(record.reg_key.as_str()))
        .cloned()
        .collect();

    let statuses: Vec<ComplianceStatus> = registered
        .iter()
        .map(|record| {
            if certified_keys.contains(record.reg_key.as_str()) {
                ComplianceStatus::Compliant
            } else {
                ComplianceStatus::NonCompliant
            }
        })
        .collect();

    MatchOutcome {
        registered: registered.into_iter().zip(statuses).collect(),
        orphans,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn certificate(key: &str) -> CertificateRecord {
        CertificateRecord::blank(key)
    }

    #[test]
    fn member_keys_are_compliant() {
        let outcome = match_registries(
            vec![BuildingRecord::blank("ABC123"), BuildingRecord::blank("XYZ999")],
            vec![certificate("ABC123")],
        );

        assert_eq!(outcome.registered[0].1, ComplianceStatus::Compliant);
        assert_eq!(outcome.registered[1].1, ComplianceStatus::NonCompliant);
        assert!(outcome.orphans.is_empty());
    }

    #[test]
    fn unregistered_certificates_become_orphans() {
        let outcome = match_registries(
            vec![BuildingRecord::blank("A")],
            vec![certificate("A"), certificate("B"), certificate("B")],
        );

        let orphan_keys: Vec<&str> = outcome
            .orphans
            .iter()
            .map(|record| record.reg_key.as_str())
            .collect();
        assert_eq!(orphan_keys, vec!["B", "B"]);
    }

    #[test]
    fn duplicate_registered_keys_keep_their_rows() {
        let outcome = match_registries(
            vec![
                BuildingRecord::blank("A"),
                BuildingRecord::blank("A"),
                BuildingRecord::blank("C"),
            ],
            vec![certificate("A")],
        );

        assert_eq!(outcome.registered.len(), 3);
        assert_eq!(outcome.compliant(), 2);
        assert_eq!(outcome.non_compliant(), 1);
        assert_eq!(
            outcome.compliant() + outcome.non_compliant(),
            outcome.registered.len()
        );
    }

    #[test]
    fn keys_match_case_sensitively() {
        let outcome = match_registries(
            vec![BuildingRecord::blank("abc123")],
            vec![certificate("ABC123")],
        );
        assert_eq!(outcome.registered[0].1, ComplianceStatus::NonCompliant);
        assert_eq!(outcome.orphans.len(), 1);
    }
}
