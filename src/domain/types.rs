use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Error returned when a label does not belong to a closed vocabulary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: '{value}'")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

/// Wires a closed label enum into `Display`, `FromStr`, serde and rusqlite.
/// Every vocabulary type is stored and transmitted by its label.
macro_rules! label_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($label => Ok($name::$variant),)+
                    other => Err(UnknownLabel { kind: $kind, value: other.to_string() }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = UnknownLabel;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let label = value.as_str()?;
                label.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
}

label_enum!(Gender, "gender", {
    Male => "Male",
    Female => "Female",
});

impl Gender {
    /// Label used in exported spreadsheets
    pub fn localized(&self) -> &'static str {
        match self {
            Gender::Male => "Férfi",
            Gender::Female => "Nő",
        }
    }
}

/// Which players an event is open to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EventGender {
    Male,
    Female,
    Both,
}

label_enum!(EventGender, "event gender", {
    Male => "Male",
    Female => "Female",
    Both => "Both",
});

impl EventGender {
    pub fn admits(&self, gender: Gender) -> bool {
        match self {
            EventGender::Both => true,
            EventGender::Male => gender == Gender::Male,
            EventGender::Female => gender == Gender::Female,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AgeCategory {
    Senior,
    U21,
    U19,
    U17,
    U15,
    U13,
    U11,
}

label_enum!(AgeCategory, "age category", {
    Senior => "Senior",
    U21 => "U21",
    U19 => "U19",
    U17 => "U17",
    U15 => "U15",
    U13 => "U13",
    U11 => "U11",
});

/// Categories covered when a snapshot is requested for "All"
pub const SNAPSHOT_CATEGORIES: [AgeCategory; 5] = [
    AgeCategory::Senior,
    AgeCategory::U19,
    AgeCategory::U15,
    AgeCategory::U13,
    AgeCategory::U11,
];

impl AgeCategory {
    /// Age ceiling of a youth category, `None` for Senior
    pub fn max_age(&self) -> Option<i32> {
        match self {
            AgeCategory::Senior => None,
            AgeCategory::U21 => Some(21),
            AgeCategory::U19 => Some(19),
            AgeCategory::U17 => Some(17),
            AgeCategory::U15 => Some(15),
            AgeCategory::U13 => Some(13),
            AgeCategory::U11 => Some(11),
        }
    }
}

/// Competition tier of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EventType {
    National,
    Featured,
    Top,
    FirstClass,
    SecondClass,
    County,
}

label_enum!(EventType, "event type", {
    National => "OB",
    Featured => "Kiemelt",
    Top => "TOP",
    FirstClass => "I. osztály",
    SecondClass => "II. osztály",
    County => "Megye",
});

impl EventType {
    /// Tiers whose contribution to the best-events total is capped separately
    pub fn is_discounted(&self) -> bool {
        matches!(self, EventType::SecondClass)
    }
}

/// Competition category a result was recorded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    Singles,
    Doubles,
    Mixed,
    Team,
}

label_enum!(Category, "category", {
    Singles => "Egyes",
    Doubles => "Páros",
    Mixed => "Vegyes",
    Team => "Csapat",
});

impl Category {
    /// Team results are never priced from the point table
    pub fn requires_manual_points(&self) -> bool {
        matches!(self, Category::Team)
    }
}

/// Finishing position on the fixed ladder, including group-stage codes.
///
/// The derived `Ord` follows ladder order, which is what result tables use
/// for display. Value comparison is only meaningful for the numeric subset,
/// see [`Position::compare_numeric`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Position {
    P1,
    P2,
    P3,
    P4,
    P5,
    P6,
    P7,
    P8,
    P9,
    P10,
    P11,
    P12,
    P17,
    P33,
    P65,
    Cs3,
    Cs4,
    Cs5,
    P17Kv,
    P33Kv,
    P65Kv,
}

label_enum!(Position, "position", {
    P1 => "1",
    P2 => "2",
    P3 => "3",
    P4 => "4",
    P5 => "5",
    P6 => "6",
    P7 => "7",
    P8 => "8",
    P9 => "9",
    P10 => "10",
    P11 => "11",
    P12 => "12",
    P17 => "17",
    P33 => "33",
    P65 => "65",
    Cs3 => "CS3",
    Cs4 => "CS4",
    Cs5 => "CS5",
    P17Kv => "17KV",
    P33Kv => "33KV",
    P65Kv => "65KV",
});

impl Position {
    /// Placement value for purely numeric positions
    pub fn numeric(&self) -> Option<u32> {
        self.as_str().parse().ok()
    }

    /// Compares two placements by value; `None` unless both are numeric
    pub fn compare_numeric(&self, other: &Position) -> Option<Ordering> {
        Some(self.numeric()?.cmp(&other.numeric()?))
    }
}

/// Gender selection for snapshot generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenderSelector {
    One(Gender),
    Both,
}

impl FromStr for GenderSelector {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Both" => Ok(GenderSelector::Both),
            other => other.parse().map(GenderSelector::One),
        }
    }
}

/// Age category selection for snapshot generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySelector {
    One(AgeCategory),
    All,
}

impl FromStr for CategorySelector {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "All" => Ok(CategorySelector::All),
            other => other.parse().map(CategorySelector::One),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), *category);
        }
        for position in Position::ALL {
            assert_eq!(position.as_str().parse::<Position>().unwrap(), *position);
        }
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let err = "Quarter".parse::<Position>().unwrap_err();
        assert_eq!(err.kind, "position");
        assert!("III. osztály".parse::<EventType>().is_err());
    }

    #[test]
    fn test_numeric_comparison_only_for_numeric_positions() {
        assert_eq!(Position::P2.compare_numeric(&Position::P17), Some(Ordering::Less));
        assert_eq!(Position::P33.compare_numeric(&Position::P5), Some(Ordering::Greater));
        assert_eq!(Position::Cs3.compare_numeric(&Position::P3), None);
        assert_eq!(Position::P17Kv.numeric(), None);
    }

    #[test]
    fn test_ladder_order_puts_numeric_positions_first() {
        let mut positions = vec![Position::Cs4, Position::P12, Position::P2, Position::P65Kv];
        positions.sort();
        assert_eq!(positions, vec![Position::P2, Position::P12, Position::Cs4, Position::P65Kv]);
    }

    #[test]
    fn test_only_second_class_is_discounted() {
        let discounted: Vec<_> = EventType::ALL.iter().filter(|t| t.is_discounted()).collect();
        assert_eq!(discounted, vec![&EventType::SecondClass]);
    }

    #[test]
    fn test_selectors_parse_fan_out_labels() {
        assert_eq!("Both".parse::<GenderSelector>().unwrap(), GenderSelector::Both);
        assert_eq!(
            "Female".parse::<GenderSelector>().unwrap(),
            GenderSelector::One(Gender::Female)
        );
        assert_eq!("All".parse::<CategorySelector>().unwrap(), CategorySelector::All);
        assert_eq!(
            "U15".parse::<CategorySelector>().unwrap(),
            CategorySelector::One(AgeCategory::U15)
        );
    }

    #[test]
    fn test_serde_uses_storage_labels() {
        let json = serde_json::to_string(&EventType::SecondClass).unwrap();
        assert_eq!(json, "\"II. osztály\"");
        let parsed: Category = serde_json::from_str("\"Vegyes\"").unwrap();
        assert_eq!(parsed, Category::Mixed);
    }
}
