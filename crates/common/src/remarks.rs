use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Moderation reason attached to a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemarkTag {
    PoseIssue,
    HandsVisibility,
    QualityIssue,
    Nsfw,
}

impl RemarkTag {
    pub const ALL: [RemarkTag; 4] = [
        RemarkTag::PoseIssue,
        RemarkTag::HandsVisibility,
        RemarkTag::QualityIssue,
        RemarkTag::Nsfw,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RemarkTag::PoseIssue => "pose_issue",
            RemarkTag::HandsVisibility => "hands_visibility",
            RemarkTag::QualityIssue => "quality_issue",
            RemarkTag::Nsfw => "nsfw",
        }
    }

    /// Human readable label shown next to the checkbox.
    pub fn label(&self) -> &'static str {
        match self {
            RemarkTag::PoseIssue => "Pose Issue",
            RemarkTag::HandsVisibility => "Hands Visibility",
            RemarkTag::QualityIssue => "Quality Issue",
            RemarkTag::Nsfw => "NSFW",
        }
    }
}

impl fmt::Display for RemarkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRemarkTag(pub String);

impl fmt::Display for UnknownRemarkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown remark tag '{}'", self.0)
    }
}

impl std::error::Error for UnknownRemarkTag {}

impl FromStr for RemarkTag {
    type Err = UnknownRemarkTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pose_issue" => Ok(RemarkTag::PoseIssue),
            "hands_visibility" => Ok(RemarkTag::HandsVisibility),
            "quality_issue" => Ok(RemarkTag::QualityIssue),
            "nsfw" => Ok(RemarkTag::Nsfw),
            other => Err(UnknownRemarkTag(other.to_string())),
        }
    }
}

/// Ordered, duplicate-free set of remark tags.
///
/// Insertion order is kept so the persisted string matches what the reviewer
/// submitted. Storage encoding is the comma-joined tag list; an empty set is
/// stored as NULL rather than an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemarkSet(Vec<RemarkTag>);

impl RemarkSet {
    pub const DELIMITER: char = ',';

    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the tag was already present.
    pub fn insert(&mut self, tag: RemarkTag) -> bool {
        if self.0.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    pub fn remove(&mut self, tag: RemarkTag) -> bool {
        let before = self.0.len();
        self.0.retain(|t| *t != tag);
        self.0.len() != before
    }

    pub fn contains(&self, tag: RemarkTag) -> bool {
        self.0.contains(&tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = RemarkTag> + '_ {
        self.0.iter().copied()
    }

    /// Builds a set from raw strings, dropping duplicates and anything that is
    /// not a known tag. Rejected values are returned alongside the set.
    pub fn from_raw<I, S>(raw: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = RemarkSet::new();
        let mut rejected = Vec::new();
        for value in raw {
            match value.as_ref().parse::<RemarkTag>() {
                Ok(tag) => {
                    set.insert(tag);
                }
                Err(UnknownRemarkTag(other)) => rejected.push(other),
            }
        }
        (set, rejected)
    }

    /// Encodes the set for the `products.remarks` column.
    pub fn to_storage(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        let joined = self
            .0
            .iter()
            .map(RemarkTag::as_str)
            .collect::<Vec<_>>()
            .join(",");
        Some(joined)
    }

    /// Decodes a `products.remarks` value. Blank segments and unknown tags are skipped.
    pub fn from_storage(value: Option<&str>) -> Self {
        match value {
            Some(raw) => {
                let segments = raw
                    .split(Self::DELIMITER)
                    .map(str::trim)
                    .filter(|s| !s.is_empty());
                Self::from_raw(segments).0
            }
            None => Self::new(),
        }
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(|t| t.as_str().to_string()).collect()
    }
}

impl FromIterator<RemarkTag> for RemarkSet {
    fn from_iter<T: IntoIterator<Item = RemarkTag>>(iter: T) -> Self {
        let mut set = RemarkSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}
