//! Store locations.
//!
//! The chain runs a fixed set of branches; every ledger row and movement belongs
//! to exactly one of them.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// One of the chain's physical stores.
///
/// Serialized by its Korean display name, which is also what the flat files hold.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Branch {
    Dongdaemun,
    GoodMorningCity,
    Yangjae,
    SuwonYeongtong,
    Dongtan,
    Yeongdeungpo,
    Lumbini,
}

impl Branch {
    /// All branches, in the order the dashboard lists them.
    pub const ALL: [Branch; 7] = [
        Branch::Dongdaemun,
        Branch::GoodMorningCity,
        Branch::Yangjae,
        Branch::SuwonYeongtong,
        Branch::Dongtan,
        Branch::Yeongdeungpo,
        Branch::Lumbini,
    ];

    /// Display name (as stored on disk).
    pub fn name(self) -> &'static str {
        match self {
            Branch::Dongdaemun => "동대문",
            Branch::GoodMorningCity => "굿모닝시티",
            Branch::Yangjae => "양재",
            Branch::SuwonYeongtong => "수원영통",
            Branch::Dongtan => "동탄",
            Branch::Yeongdeungpo => "영등포",
            Branch::Lumbini => "룸비니",
        }
    }

    /// ASCII slug, handy in URLs and shells.
    pub fn slug(self) -> &'static str {
        match self {
            Branch::Dongdaemun => "dongdaemun",
            Branch::GoodMorningCity => "goodmorning-city",
            Branch::Yangjae => "yangjae",
            Branch::SuwonYeongtong => "suwon-yeongtong",
            Branch::Dongtan => "dongtan",
            Branch::Yeongdeungpo => "yeongdeungpo",
            Branch::Lumbini => "lumbini",
        }
    }
}

impl core::fmt::Display for Branch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Branch {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Branch::ALL
            .into_iter()
            .find(|b| b.name() == s || b.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::validation(format!("unknown branch: {s:?}")))
    }
}

impl TryFrom<String> for Branch {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Branch> for String {
    fn from(value: Branch) -> Self {
        value.name().to_string()
    }
}
