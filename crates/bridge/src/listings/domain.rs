use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Identifier of a recruitment listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub u64);

/// Identifier of an already-resolved caller or applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchWordId(pub u64);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SearchWordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category of role being recruited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Field {
    Backend,
    Frontend,
    Ios,
    Android,
    Design,
    Planning,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Backend,
        Field::Frontend,
        Field::Ios,
        Field::Android,
        Field::Design,
        Field::Planning,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            Field::Backend => "BACKEND",
            Field::Frontend => "FRONTEND",
            Field::Ios => "IOS",
            Field::Android => "ANDROID",
            Field::Design => "DESIGN",
            Field::Planning => "PLANNING",
        }
    }

    /// User-facing label shown in applicant summaries.
    pub const fn label(self) -> &'static str {
        match self {
            Field::Backend => "백엔드",
            Field::Frontend => "프론트엔드",
            Field::Ios => "iOS",
            Field::Android => "안드로이드",
            Field::Design => "디자인",
            Field::Planning => "기획",
        }
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Field::ALL
            .into_iter()
            .find(|field| field.code().eq_ignore_ascii_case(value))
            .ok_or_else(|| value.to_string())
    }
}

/// Technology stack label attached to a recruitment entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Skill {
    Java,
    SpringBoot,
    JavaScript,
    TypeScript,
    NodeJs,
    React,
    Vue,
    Python,
    Django,
    Kotlin,
    Swift,
    Figma,
}

impl Skill {
    pub const ALL: [Skill; 12] = [
        Skill::Java,
        Skill::SpringBoot,
        Skill::JavaScript,
        Skill::TypeScript,
        Skill::NodeJs,
        Skill::React,
        Skill::Vue,
        Skill::Python,
        Skill::Django,
        Skill::Kotlin,
        Skill::Swift,
        Skill::Figma,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            Skill::Java => "JAVA",
            Skill::SpringBoot => "SPRINGBOOT",
            Skill::JavaScript => "JAVASCRIPT",
            Skill::TypeScript => "TYPESCRIPT",
            Skill::NodeJs => "NODEJS",
            Skill::React => "REACT",
            Skill::Vue => "VUE",
            Skill::Python => "PYTHON",
            Skill::Django => "DJANGO",
            Skill::Kotlin => "KOTLIN",
            Skill::Swift => "SWIFT",
            Skill::Figma => "FIGMA",
        }
    }
}

impl FromStr for Skill {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Skill::ALL
            .into_iter()
            .find(|skill| skill.code().eq_ignore_ascii_case(value))
            .ok_or_else(|| value.to_string())
    }
}

/// One role being recruited within a listing. Entries carry no identity of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruitmentEntry {
    pub field: Field,
    pub recruit_num: u32,
    pub skills: BTreeSet<Skill>,
    pub requirement: String,
}

impl RecruitmentEntry {
    /// True when the entry recruits `field` and covers every skill in `skills`.
    pub fn covers(&self, field: Field, skills: &BTreeSet<Skill>) -> bool {
        self.field == field && skills.is_subset(&self.skills)
    }
}

/// A recruitment post and the scalar state it owns.
///
/// Applications and bookmarks live in their own tables and point back at the listing by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub owner: Option<UserId>,
    pub title: String,
    pub overview: String,
    pub due_date: NaiveDateTime,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub meeting_way: String,
    pub stage: String,
    pub tag_limit: Vec<String>,
    pub recruit: Vec<RecruitmentEntry>,
    pub bookmarks_num: u32,
}

impl Listing {
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner == Some(user)
    }

    pub fn is_past_due(&self, now: NaiveDateTime) -> bool {
        self.due_date < now
    }

    pub fn recruits(&self, field: Field) -> bool {
        self.recruit.iter().any(|entry| entry.field == field)
    }
}

/// Listing contents before the store assigns an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub owner: Option<UserId>,
    pub title: String,
    pub overview: String,
    pub due_date: NaiveDateTime,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub meeting_way: String,
    pub stage: String,
    pub tag_limit: Vec<String>,
    pub recruit: Vec<RecruitmentEntry>,
}

impl NewListing {
    pub fn into_listing(self, id: ListingId) -> Listing {
        Listing {
            id,
            owner: self.owner,
            title: self.title,
            overview: self.overview,
            due_date: self.due_date,
            start_date: self.start_date,
            end_date: self.end_date,
            meeting_way: self.meeting_way,
            stage: self.stage,
            tag_limit: self.tag_limit,
            recruit: self.recruit,
            bookmarks_num: 0,
        }
    }
}

/// Caller-supplied recruitment entry prior to validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruitmentInput {
    pub field: String,
    pub recruit_num: i64,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub requirement: String,
}

/// Form used for both listing creation and listing update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingInput {
    pub title: String,
    #[serde(default)]
    pub overview: String,
    pub due_date: NaiveDateTime,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    #[serde(default)]
    pub recruit: Vec<RecruitmentInput>,
    #[serde(default)]
    pub tag_limit: Vec<String>,
    #[serde(default)]
    pub meeting_way: String,
    #[serde(default)]
    pub stage: String,
}

/// Stage of a user's application to a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStage {
    Applied,
    Accepted,
    Rejected,
}

impl ApplicationStage {
    pub const fn code(self) -> &'static str {
        match self {
            ApplicationStage::Applied => "applied",
            ApplicationStage::Accepted => "accepted",
            ApplicationStage::Rejected => "rejected",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStage::Applied => "결과 대기중",
            ApplicationStage::Accepted => "수락",
            ApplicationStage::Rejected => "거절",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, ApplicationStage::Applied)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub listing_id: ListingId,
    pub user_id: UserId,
    pub stage: ApplicationStage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: BookmarkId,
    pub listing_id: ListingId,
    pub user_id: UserId,
}

/// A term a user searched for. A user holds at most one record per distinct term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchWord {
    pub id: SearchWordId,
    pub user_id: UserId,
    pub word: String,
}

/// Directory entry for a user, supplied by the adjacent profile subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub fields: Vec<Field>,
    pub career: Option<String>,
}
