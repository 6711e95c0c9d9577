//! # Size Chart
//!
//! Three independent, append-only size tables per merchant.
//!
//! ## Collection Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SizeChart                                                              │
//! │  ├── footwear: [FootwearSize]   region, size                           │
//! │  ├── tops:     [TopSize]        size, chest, waist                     │
//! │  └── bottoms:  [BottomSize]     size, waist, inseam                    │
//! │                                                                         │
//! │  add    → push at the end with a freshly generated id                  │
//! │  remove → filter by id (absent id is a no-op)                          │
//! │  no reordering, no update in place                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::validation::{validate_all_present, ValidationResult};

// =============================================================================
// Category
// =============================================================================

/// One of the three size tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SizeCategory {
    Footwear,
    Tops,
    Bottoms,
}

impl SizeCategory {
    pub const ALL: [SizeCategory; 3] = [
        SizeCategory::Footwear,
        SizeCategory::Tops,
        SizeCategory::Bottoms,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeCategory::Footwear => "footwear",
            SizeCategory::Tops => "tops",
            SizeCategory::Bottoms => "bottoms",
        }
    }

    /// First letter used in generated ids (`f-…`, `t-…`, `b-…`).
    fn id_prefix(&self) -> char {
        match self {
            SizeCategory::Footwear => 'f',
            SizeCategory::Tops => 't',
            SizeCategory::Bottoms => 'b',
        }
    }
}

impl std::fmt::Display for SizeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SizeCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "footwear" => Ok(SizeCategory::Footwear),
            "tops" => Ok(SizeCategory::Tops),
            "bottoms" => Ok(SizeCategory::Bottoms),
            other => Err(ValidationError::CategoryMismatch {
                expected: "footwear, tops or bottoms".to_string(),
                found: other.to_string(),
            }),
        }
    }
}

// =============================================================================
// Entries
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FootwearSize {
    pub id: String,
    /// Sizing system, e.g. US, EU, UK.
    pub region: String,
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TopSize {
    pub id: String,
    /// Letter size, e.g. S, M, L.
    pub size: String,
    pub chest: String,
    pub waist: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BottomSize {
    pub id: String,
    pub size: String,
    pub waist: String,
    pub inseam: String,
}

/// An entry before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum NewSizeEntry {
    Footwear {
        region: String,
        size: String,
    },
    Tops {
        size: String,
        chest: String,
        waist: String,
    },
    Bottoms {
        size: String,
        waist: String,
        inseam: String,
    },
}

impl NewSizeEntry {
    pub fn category(&self) -> SizeCategory {
        match self {
            NewSizeEntry::Footwear { .. } => SizeCategory::Footwear,
            NewSizeEntry::Tops { .. } => SizeCategory::Tops,
            NewSizeEntry::Bottoms { .. } => SizeCategory::Bottoms,
        }
    }

    /// Presence checks: footwear needs region and size, tops need size and
    /// chest, bottoms need size and waist.
    pub fn validate(&self) -> ValidationResult<()> {
        match self {
            NewSizeEntry::Footwear { region, size } => {
                validate_all_present([("region", region.as_str()), ("size", size.as_str())])
            }
            NewSizeEntry::Tops { size, chest, .. } => {
                validate_all_present([("size", size.as_str()), ("chest", chest.as_str())])
            }
            NewSizeEntry::Bottoms { size, waist, .. } => {
                validate_all_present([("size", size.as_str()), ("waist", waist.as_str())])
            }
        }
    }

    /// Checks that this entry belongs in `category`.
    pub fn expect_category(&self, category: SizeCategory) -> ValidationResult<()> {
        if self.category() != category {
            return Err(ValidationError::CategoryMismatch {
                expected: category.to_string(),
                found: self.category().to_string(),
            });
        }
        Ok(())
    }

    /// Attaches an id.
    pub fn with_id(self, id: impl Into<String>) -> SizeEntry {
        let id = id.into();
        match self {
            NewSizeEntry::Footwear { region, size } => {
                SizeEntry::Footwear(FootwearSize { id, region, size })
            }
            NewSizeEntry::Tops { size, chest, waist } => SizeEntry::Tops(TopSize {
                id,
                size,
                chest,
                waist,
            }),
            NewSizeEntry::Bottoms {
                size,
                waist,
                inseam,
            } => SizeEntry::Bottoms(BottomSize {
                id,
                size,
                waist,
                inseam,
            }),
        }
    }
}

/// A stored entry of any category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum SizeEntry {
    Footwear(FootwearSize),
    Tops(TopSize),
    Bottoms(BottomSize),
}

impl SizeEntry {
    pub fn id(&self) -> &str {
        match self {
            SizeEntry::Footwear(e) => &e.id,
            SizeEntry::Tops(e) => &e.id,
            SizeEntry::Bottoms(e) => &e.id,
        }
    }

    pub fn category(&self) -> SizeCategory {
        match self {
            SizeEntry::Footwear(_) => SizeCategory::Footwear,
            SizeEntry::Tops(_) => SizeCategory::Tops,
            SizeEntry::Bottoms(_) => SizeCategory::Bottoms,
        }
    }
}

// =============================================================================
// Size Chart
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SizeChart {
    pub footwear: Vec<FootwearSize>,
    pub tops: Vec<TopSize>,
    pub bottoms: Vec<BottomSize>,
}

impl SizeChart {
    /// Sample chart used by the seed data.
    pub fn sample() -> Self {
        SizeChart {
            footwear: vec![
                FootwearSize {
                    id: "s1".to_string(),
                    region: "US".to_string(),
                    size: "9".to_string(),
                },
                FootwearSize {
                    id: "s2".to_string(),
                    region: "EU".to_string(),
                    size: "42".to_string(),
                },
            ],
            tops: vec![
                TopSize {
                    id: "t1".to_string(),
                    size: "M".to_string(),
                    chest: "38-40\"".to_string(),
                    waist: "32-34\"".to_string(),
                },
                TopSize {
                    id: "t2".to_string(),
                    size: "L".to_string(),
                    chest: "41-43\"".to_string(),
                    waist: "35-37\"".to_string(),
                },
            ],
            bottoms: vec![
                BottomSize {
                    id: "b1".to_string(),
                    size: "32".to_string(),
                    waist: "32\"".to_string(),
                    inseam: "32\"".to_string(),
                },
                BottomSize {
                    id: "b2".to_string(),
                    size: "34".to_string(),
                    waist: "34\"".to_string(),
                    inseam: "32\"".to_string(),
                },
            ],
        }
    }

    /// Ids of one category, in insertion order.
    pub fn ids(&self, category: SizeCategory) -> Vec<&str> {
        match category {
            SizeCategory::Footwear => self.footwear.iter().map(|e| e.id.as_str()).collect(),
            SizeCategory::Tops => self.tops.iter().map(|e| e.id.as_str()).collect(),
            SizeCategory::Bottoms => self.bottoms.iter().map(|e| e.id.as_str()).collect(),
        }
    }

    pub fn contains_id(&self, category: SizeCategory, id: &str) -> bool {
        self.ids(category).contains(&id)
    }

    pub fn len(&self, category: SizeCategory) -> usize {
        match category {
            SizeCategory::Footwear => self.footwear.len(),
            SizeCategory::Tops => self.tops.len(),
            SizeCategory::Bottoms => self.bottoms.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.footwear.is_empty() && self.tops.is_empty() && self.bottoms.is_empty()
    }

    /// Returns an id not yet used in `category`.
    pub fn generate_id(&self, category: SizeCategory) -> String {
        loop {
            let id = format!("{}-{}", category.id_prefix(), Uuid::new_v4().simple());
            if !self.contains_id(category, &id) {
                return id;
            }
        }
    }

    /// Validates `entry`, assigns a fresh id and appends it.
    pub fn add(&mut self, entry: NewSizeEntry) -> ValidationResult<SizeEntry> {
        entry.validate()?;
        let id = self.generate_id(entry.category());
        let stored = entry.with_id(id);
        self.push(stored.clone());
        Ok(stored)
    }

    /// Appends an entry that already carries an id.
    ///
    /// Used when rebuilding a chart from storage.
    pub fn push(&mut self, entry: SizeEntry) {
        match entry {
            SizeEntry::Footwear(e) => self.footwear.push(e),
            SizeEntry::Tops(e) => self.tops.push(e),
            SizeEntry::Bottoms(e) => self.bottoms.push(e),
        }
    }

    /// Removes the entry with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, category: SizeCategory, id: &str) -> bool {
        let before = self.len(category);
        match category {
            SizeCategory::Footwear => self.footwear.retain(|e| e.id != id),
            SizeCategory::Tops => self.tops.retain(|e| e.id != id),
            SizeCategory::Bottoms => self.bottoms.retain(|e| e.id != id),
        }
        self.len(category) != before
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn footwear(region: &str, size: &str) -> NewSizeEntry {
        NewSizeEntry::Footwear {
            region: region.to_string(),
            size: size.to_string(),
        }
    }

    #[test]
    fn test_add_appends_with_unique_id() {
        let mut chart = SizeChart::sample();

        let first = chart.add(footwear("UK", "8")).unwrap();
        let second = chart.add(footwear("UK", "9")).unwrap();

        assert_ne!(first.id(), second.id());
        assert_eq!(chart.ids(SizeCategory::Footwear).len(), 4);
        assert_eq!(chart.footwear.last().unwrap().id, second.id());
    }

    #[test]
    fn test_add_then_remove_restores_collection() {
        let original = SizeChart::sample();
        let mut chart = original.clone();

        let entry = chart
            .add(NewSizeEntry::Tops {
                size: "XL".to_string(),
                chest: "44-46\"".to_string(),
                waist: String::new(),
            })
            .unwrap();
        assert!(chart.remove(SizeCategory::Tops, entry.id()));

        assert_eq!(chart, original);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let original = SizeChart::sample();
        let mut chart = original.clone();

        assert!(!chart.remove(SizeCategory::Bottoms, "does-not-exist"));
        assert_eq!(chart, original);
    }

    #[test]
    fn test_presence_checks_per_category() {
        let mut chart = SizeChart::default();

        assert_eq!(
            chart.add(footwear("", "9")),
            Err(ValidationError::required("region"))
        );
        assert_eq!(
            chart.add(NewSizeEntry::Bottoms {
                size: "32".to_string(),
                waist: " ".to_string(),
                inseam: "30".to_string(),
            }),
            Err(ValidationError::required("waist"))
        );
        assert!(chart.is_empty());
    }

    #[test]
    fn test_generated_ids_carry_category_prefix() {
        let chart = SizeChart::default();
        assert!(chart.generate_id(SizeCategory::Tops).starts_with("t-"));
    }

    #[test]
    fn test_new_entry_json_is_tagged_by_category() {
        let json = r#"{"category":"footwear","region":"US","size":"10"}"#;
        let entry: NewSizeEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.category(), SizeCategory::Footwear);
        assert!(entry.expect_category(SizeCategory::Tops).is_err());
    }
}
