//! Classification codes and reference axes
//!
//! Products carry one classification reference. The food group, major
//! category and minor category codes form an override chain evaluated in
//! that order: each level that is present replaces the value chosen so far.
//! A major category is present when digits 2..4 of its code are not "00";
//! a minor category when digits 4..6 are not "00".

use std::fmt;
use std::ops::Range;

use crate::core::store::EntityType;

use super::chain;
use super::row::RowError;

/// Marker for "no classification at this level"
pub const SENTINEL: &str = "00";

/// Vocabulary holding food groups and both category levels
pub const FOOD_GROUP_VOCABULARY: &str = "food_group";

pub const FIELD_FOOD_GROUP_ID: &str = "field_food_group_id";
pub const FIELD_MAJOR_CATEGORY_ID: &str = "field_major_category_id";
pub const FIELD_MINOR_CATEGORY_ID: &str = "field_minor_category_id";

/// A kind of cross-reference resolved against the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Chain,
    FoodGroup,
    MajorCategory,
    MinorCategory,
}

impl Axis {
    /// Classification levels in override order (least to most specific)
    pub const LEVELS: [Axis; 3] = [Axis::FoodGroup, Axis::MajorCategory, Axis::MinorCategory];

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Chain => "fast-food chain",
            Axis::FoodGroup => "food group",
            Axis::MajorCategory => "major category",
            Axis::MinorCategory => "minor category",
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            Axis::Chain => EntityType::Node,
            _ => EntityType::TaxonomyTerm,
        }
    }

    /// Content type or vocabulary searched for this axis
    pub fn bundle(&self) -> &'static str {
        match self {
            Axis::Chain => chain::BUNDLE,
            _ => FOOD_GROUP_VOCABULARY,
        }
    }

    /// Field holding the domain identifier for this axis
    pub fn id_field(&self) -> &'static str {
        match self {
            Axis::Chain => chain::FIELD_CHAIN_ID,
            Axis::FoodGroup => FIELD_FOOD_GROUP_ID,
            Axis::MajorCategory => FIELD_MAJOR_CATEGORY_ID,
            Axis::MinorCategory => FIELD_MINOR_CATEGORY_ID,
        }
    }

    /// Position of the digits that must not be the sentinel
    fn level_digits(&self) -> Option<Range<usize>> {
        match self {
            Axis::MajorCategory => Some(2..4),
            Axis::MinorCategory => Some(4..6),
            _ => None,
        }
    }

    /// Whether `code` carries a value at this level
    ///
    /// Empty codes never apply. Codes too short to contain the level digits
    /// are malformed.
    pub fn applies(&self, code: &str) -> Result<bool, RowError> {
        if code.is_empty() {
            return Ok(false);
        }
        match self.level_digits() {
            None => Ok(true),
            Some(range) => {
                let digits = code.get(range).ok_or_else(|| RowError::MalformedCode {
                    axis: self.as_str(),
                    code: code.to_string(),
                })?;
                Ok(digits != SENTINEL)
            }
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification levels present on a row, in override order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    levels: Vec<(Axis, String)>,
}

impl Classification {
    /// Build from the three raw codes of a row
    pub fn from_codes(food_group: &str, major: &str, minor: &str) -> Result<Self, RowError> {
        let mut levels = Vec::new();
        for (axis, code) in Axis::LEVELS.iter().zip([food_group, major, minor]) {
            if axis.applies(code)? {
                levels.push((*axis, code.to_string()));
            }
        }
        Ok(Self { levels })
    }

    /// Present levels, least specific first
    pub fn levels(&self) -> &[(Axis, String)] {
        &self.levels
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The level that wins the override chain
    pub fn most_specific(&self) -> Option<(Axis, &str)> {
        self.levels
            .last()
            .map(|(axis, code)| (*axis, code.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_sentinel_is_skipped() {
        assert!(!Axis::MajorCategory.applies("0100").unwrap());
        assert!(Axis::MajorCategory.applies("0102").unwrap());
    }

    #[test]
    fn test_minor_sentinel_is_skipped() {
        assert!(!Axis::MinorCategory.applies("010200").unwrap());
        assert!(Axis::MinorCategory.applies("010203").unwrap());
    }

    #[test]
    fn test_food_group_has_no_sentinel() {
        assert!(Axis::FoodGroup.applies("00").unwrap());
        assert!(!Axis::FoodGroup.applies("").unwrap());
    }

    #[test]
    fn test_short_code_is_malformed() {
        let err = Axis::MinorCategory.applies("0102").unwrap_err();
        assert!(matches!(err, RowError::MalformedCode { .. }));
    }

    #[test]
    fn test_minor_wins_override_chain() {
        let c = Classification::from_codes("01", "0102", "010203").unwrap();
        assert_eq!(c.levels().len(), 3);
        assert_eq!(c.most_specific(), Some((Axis::MinorCategory, "010203")));
    }

    #[test]
    fn test_sentinel_levels_fall_back() {
        let c = Classification::from_codes("01", "0102", "010200").unwrap();
        assert_eq!(c.most_specific(), Some((Axis::MajorCategory, "0102")));

        let c = Classification::from_codes("01", "0100", "010000").unwrap();
        assert_eq!(c.most_specific(), Some((Axis::FoodGroup, "01")));

        let c = Classification::from_codes("", "", "").unwrap();
        assert!(c.is_empty());
    }

    #[test]
    fn test_minor_applies_without_food_group() {
        let c = Classification::from_codes("", "", "020304").unwrap();
        assert_eq!(c.levels(), &[(Axis::MinorCategory, "020304".to_string())]);
    }
}
