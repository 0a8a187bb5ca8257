//! Dashboard filters over listings.
//!
//! An empty criterion list matches everything. Family rows survive only when
//! their parent does.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use edutrack_shared::{Listing, Official, Politician};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficialFilter {
    #[serde(default)]
    pub departments: Vec<String>,
    /// Education locations.
    #[serde(default)]
    pub locations: Vec<String>,
}

impl OfficialFilter {
    pub fn matches(&self, official: &Official) -> bool {
        allows(&self.departments, &official.department)
            && allows(&self.locations, &official.education.education_location)
    }

    pub fn apply(&self, listing: &Listing<Official>) -> Listing<Official> {
        retain(listing, |o| self.matches(o), |o| o.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoliticianFilter {
    #[serde(default)]
    pub parties: Vec<String>,
}

impl PoliticianFilter {
    pub fn matches(&self, politician: &Politician) -> bool {
        allows(&self.parties, &politician.party)
    }

    pub fn apply(&self, listing: &Listing<Politician>) -> Listing<Politician> {
        retain(listing, |p| self.matches(p), |p| p.id)
    }
}

/// Distinct values of one field, sorted, for populating filter choices.
pub fn distinct<T>(entries: &[T], field: impl Fn(&T) -> &str) -> Vec<String> {
    let mut values: Vec<String> = entries.iter().map(|e| field(e).to_string()).collect();
    values.sort();
    values.dedup();
    values
}

fn allows(allowed: &[String], value: &str) -> bool {
    allowed.is_empty() || allowed.iter().any(|a| a == value)
}

fn retain<T: Clone>(
    listing: &Listing<T>,
    keep: impl Fn(&T) -> bool,
    id: impl Fn(&T) -> i64,
) -> Listing<T> {
    let entries: Vec<T> = listing.entries.iter().filter(|e| keep(e)).cloned().collect();
    let ids: HashSet<i64> = entries.iter().map(&id).collect();
    let family = listing
        .family
        .iter()
        .filter(|m| ids.contains(&m.parent_id))
        .cloned()
        .collect();
    Listing { entries, family }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edutrack_shared::{EducationInfo, FamilyMember};

    fn official(id: i64, department: &str, location: &str) -> Official {
        Official {
            id,
            name: format!("Officer {id}"),
            department: department.into(),
            joining_year: 2010,
            education: EducationInfo::new("Masters", "Unknown", location),
        }
    }

    fn member(id: i64, parent_id: i64) -> FamilyMember {
        FamilyMember {
            id,
            parent_id,
            parent_name: format!("Parent {parent_id}"),
            name: format!("Member {id}"),
            relation_type: "Spouse".into(),
            education: EducationInfo::default(),
        }
    }

    fn officials() -> Listing<Official> {
        Listing {
            entries: vec![
                official(1, "IAS", "India"),
                official(2, "IPS", "UK"),
                official(3, "IAS", "USA"),
            ],
            family: vec![member(10, 1), member(11, 2), member(12, 3), member(13, 3)],
        }
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let listing = officials();
        assert_eq!(OfficialFilter::default().apply(&listing), listing);
    }

    #[test]
    fn criteria_combine_and_prune_family() {
        let filter = OfficialFilter {
            departments: vec!["IAS".into()],
            locations: vec!["USA".into(), "UK".into()],
        };
        let filtered = filter.apply(&officials());
        assert_eq!(filtered.entries.len(), 1);
        assert_eq!(filtered.entries[0].id, 3);
        let family: Vec<i64> = filtered.family.iter().map(|m| m.id).collect();
        assert_eq!(family, vec![12, 13]);
    }

    #[test]
    fn party_filter() {
        let politician = |id: i64, party: &str| Politician {
            id,
            name: format!("Politician {id}"),
            party: party.into(),
            position: "MP".into(),
            education: EducationInfo::default(),
        };
        let listing = Listing {
            entries: vec![politician(1, "Party A"), politician(2, "Party B")],
            family: vec![member(5, 1), member(6, 2)],
        };
        let filter = PoliticianFilter {
            parties: vec!["Party B".into()],
        };
        let filtered = filter.apply(&listing);
        assert_eq!(filtered.entries[0].id, 2);
        assert_eq!(filtered.family.len(), 1);
        assert_eq!(filtered.family[0].parent_id, 2);

        let unmatched = PoliticianFilter {
            parties: vec!["Party Z".into()],
        };
        assert!(unmatched.apply(&listing).is_empty());
    }

    #[test]
    fn distinct_values_sorted() {
        let listing = officials();
        assert_eq!(
            distinct(&listing.entries, |o| &o.department),
            vec!["IAS".to_string(), "IPS".to_string()]
        );
    }
}
