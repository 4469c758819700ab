use super::domain::{AssessedBuilding, ComplianceStatus, RiskCategory};

/// Search and filter criteria over the assessed buildings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildingFilter {
    /// Case-insensitive substring matched against key, city and province.
    pub search: Option<String>,
    pub category: Option<RiskCategory>,
    pub status: Option<ComplianceStatus>,
}

impl BuildingFilter {
    pub fn matches(&self, building: &AssessedBuilding) -> bool {
        if let Some(category) = self.category {
            if building.risk_category != category {
                return false;
            }
        }

        if let Some(status) = self.status {
            if building.status != status {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                let record = &building.record;
                record.reg_key.to_lowercase().contains(&needle)
                    || record.city.contains(&needle)
                    || record.province.contains(&needle)
            }
            _ => true,
        }
    }

    /// Matching buildings ordered by rule score, highest first.
    pub fn apply<'a>(&self, buildings: &'a [AssessedBuilding]) -> Vec<&'a AssessedBuilding> {
        let mut matched: Vec<&AssessedBuilding> = buildings
            .iter()
            .filter(|building| self.matches(building))
            .collect();
        matched.sort_by(|left, right| right.risk_score.cmp(&left.risk_score));
        matched
    }
}

/// Buildings sorted by rule score, highest first. Ties keep input order.
pub fn by_risk_descending(buildings: &[AssessedBuilding]) -> Vec<&AssessedBuilding> {
    BuildingFilter::default().apply(buildings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::compliance::domain::BuildingRecord;

    fn building(key: &str, city: &str, score: u8, status: ComplianceStatus) -> AssessedBuilding {
        let mut record = BuildingRecord::blank(key);
        record.city = city.to_string();
        record.province = "gauteng".to_string();
        let category = if score > 60 {
            RiskCategory::High
        } else if score > 30 {
            RiskCategory::Medium
        } else {
            RiskCategory::Low
        };
        AssessedBuilding {
            record,
            status,
            risk_score: score,
            risk_category: category,
            prediction: None,
        }
    }

    fn sample() -> Vec<AssessedBuilding> {
        vec![
            building("NB-100", "pretoria", 20, ComplianceStatus::Compliant),
            building("NB-200", "johannesburg", 90, ComplianceStatus::NonCompliant),
            building("EC-300", "soweto", 55, ComplianceStatus::NonCompliant),
        ]
    }

    #[test]
    fn search_matches_key_city_or_province() {
        let buildings = sample();
        let filter = BuildingFilter {
            search: Some("nb-".to_string()),
            ..BuildingFilter::default()
        };
        let keys: Vec<&str> = filter
            .apply(&buildings)
            .iter()
            .map(|b| b.record.reg_key.as_str())
            .collect();
        assert_eq!(keys, vec!["NB-200", "NB-100"]);

        let filter = BuildingFilter {
            search: Some("  SOWETO ".to_string()),
            ..BuildingFilter::default()
        };
        assert_eq!(filter.apply(&buildings).len(), 1);

        let filter = BuildingFilter {
            search: Some("Gauteng".to_string()),
            ..BuildingFilter::default()
        };
        assert_eq!(filter.apply(&buildings).len(), 3);
    }

    #[test]
    fn category_and_status_filters_combine() {
        let buildings = sample();
        let filter = BuildingFilter {
            search: None,
            category: Some(RiskCategory::Medium),
            status: Some(ComplianceStatus::NonCompliant),
        };
        let matched = filter.apply(&buildings);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].record.reg_key, "EC-300");
    }

    #[test]
    fn default_filter_sorts_by_score() {
        let buildings = sample();
        let scores: Vec<u8> = by_risk_descending(&buildings)
            .iter()
            .map(|b| b.risk_score)
            .collect();
        assert_eq!(scores, vec![90, 55, 20]);
    }
}
