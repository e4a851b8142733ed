use std::{fmt, str::FromStr};

use crate::Error;

/// How siblings are ordered in a comment tree
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize,
)]
pub enum SortKey {
    /// Most recently published first
    New,
    /// Least recently published first
    Old,
    /// Highest score first
    Top,
    /// Most replies first
    #[default]
    Hot,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [SortKey::New, SortKey::Old, SortKey::Top, SortKey::Hot];
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortKey::New => "New",
            SortKey::Old => "Old",
            SortKey::Top => "Top",
            SortKey::Hot => "Hot",
        })
    }
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<SortKey, Error> {
        SortKey::ALL
            .into_iter()
            .find(|k| k.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownSort(String::from(s)))
    }
}
