//! Strongly-typed value objects used by domain entities.
//!
//! Domain structs carry these wrappers instead of raw primitives so that
//! identifiers, bilingual text, region codes and coordinates are enforced at
//! the boundary.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;
use validator::{ValidateEmail, ValidateUrl};

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// An identifier was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveId(&'static str),
    /// A numeric value fell outside of its allowed range.
    #[error("{0} is out of range")]
    OutOfRange(&'static str),
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// URL validation failed.
    #[error("{0} must be a valid URL")]
    InvalidUrl(&'static str),
    /// Email validation failed.
    #[error("{0} must be a valid email address")]
    InvalidEmail(&'static str),
    /// Catch-all for custom validation failures.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

fn trim_and_require_non_empty<S: Into<String>>(
    value: S,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString(field))
    } else {
        Ok(trimmed)
    }
}

/// Macro to generate lightweight newtypes for positive identifiers.
///
/// The decimal rendering of an identifier is its stable string id.
macro_rules! id_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId($field))
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<i32> for $name {
            fn eq(&self, other: &i32) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<$name> for i32 {
            fn eq(&self, other: &$name) -> bool {
                *self == other.0
            }
        }
    };
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                trim_and_require_non_empty(value, $field).map(Self)
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                self.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

macro_rules! url_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed URL and validates its format.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let trimmed = trim_and_require_non_empty(value, $field)?;
                if !trimmed.as_str().validate_url() {
                    return Err(TypeConstraintError::InvalidUrl($field));
                }
                Ok(Self(trimmed))
            }

            /// Borrow the URL as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned URL.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

macro_rules! bounded_f64_newtype {
    ($name:ident, $doc:expr, $field:expr, $min:expr, $max:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, PartialOrd)]
        #[serde(try_from = "f64", into = "f64")]
        pub struct $name(f64);

        impl $name {
            /// Constructs a finite value inside the inclusive range.
            pub fn new(value: f64) -> Result<Self, TypeConstraintError> {
                if value.is_finite() && ($min..=$max).contains(&value) {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::OutOfRange($field))
                }
            }

            /// Returns the raw `f64` value.
            pub const fn get(self) -> f64 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self(0.0)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<f64> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: f64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for f64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_newtype!(TempleId, "Unique identifier for a temple.", "temple_id");
id_newtype!(
    SubmissionId,
    "Unique identifier for a temple submission.",
    "submission_id"
);
id_newtype!(FestivalId, "Unique identifier for a festival.", "festival_id");

non_empty_string_newtype!(
    DistrictName,
    "District name enforcing non-empty values.",
    "district"
);

url_string_newtype!(ImageUrl, "Temple image URL.", "image url");
url_string_newtype!(WebsiteUrl, "Temple website URL.", "website");

bounded_f64_newtype!(Latitude, "Latitude in degrees.", "latitude", -90.0, 90.0);
bounded_f64_newtype!(
    Longitude,
    "Longitude in degrees.",
    "longitude",
    -180.0,
    180.0
);

/// Contact email address.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = trim_and_require_non_empty(value, "email")?;
        if !trimmed.as_str().validate_email() {
            return Err(TypeConstraintError::InvalidEmail("email"));
        }
        Ok(Self(trimmed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Visitor rating between 0 (unrated) and 5.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "i32", into = "i32")]
pub struct Popularity(i32);

impl Popularity {
    pub const MAX: i32 = 5;

    pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
        if (0..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::OutOfRange("popularity"))
        }
    }

    pub const fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Popularity {
    type Error = TypeConstraintError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Popularity> for i32 {
    fn from(value: Popularity) -> Self {
        value.0
    }
}

/// Display language for bilingual content.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
    Telugu,
}

impl Language {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::English => "english",
            Self::Telugu => "telugu",
        }
    }
}

impl TryFrom<&str> for Language {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(Self::English),
            "telugu" | "te" => Ok(Self::Telugu),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "language: {other}"
            ))),
        }
    }
}

/// Text carried in both supported languages.
///
/// The English variant is canonical: matching, sorting and duplicate checks
/// always use it. The Telugu variant may be empty.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct LocalizedText {
    #[serde(default)]
    pub english: String,
    #[serde(default)]
    pub telugu: String,
}

impl LocalizedText {
    pub fn new(english: impl Into<String>, telugu: impl Into<String>) -> Self {
        Self {
            english: english.into().trim().to_string(),
            telugu: telugu.into().trim().to_string(),
        }
    }

    /// English-only text with an empty Telugu variant.
    pub fn english(english: impl Into<String>) -> Self {
        Self::new(english, "")
    }

    /// Text for the requested language.
    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::English => &self.english,
            Language::Telugu => &self.telugu,
        }
    }

    /// Text for the requested language, falling back to English when empty.
    pub fn get_or_english(&self, language: Language) -> &str {
        let value = self.get(language);
        if value.is_empty() { &self.english } else { value }
    }

    pub fn is_empty(&self) -> bool {
        self.english.is_empty() && self.telugu.is_empty()
    }
}

/// The two regions covered by the directory.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionCode {
    #[serde(rename = "TS")]
    Telangana,
    #[serde(rename = "AP")]
    AndhraPradesh,
}

impl RegionCode {
    pub const ALL: [RegionCode; 2] = [Self::Telangana, Self::AndhraPradesh];

    /// Code used in persistence and filters.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Telangana => "TS",
            Self::AndhraPradesh => "AP",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Telangana => "Telangana",
            Self::AndhraPradesh => "Andhra Pradesh",
        }
    }
}

impl Display for RegionCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for RegionCode {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ts" | "telangana" => Ok(Self::Telangana),
            "ap" | "andhra pradesh" => Ok(Self::AndhraPradesh),
            "" => Err(TypeConstraintError::EmptyString("state")),
            other => Err(TypeConstraintError::InvalidValue(format!("state: {other}"))),
        }
    }
}

impl TryFrom<String> for RegionCode {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

/// Architectural/geographic category of a temple.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TempleType {
    #[default]
    Ancient,
    Hill,
    River,
    Modern,
    Cave,
}

impl TempleType {
    pub const ALL: [TempleType; 5] = [
        Self::Ancient,
        Self::Hill,
        Self::River,
        Self::Modern,
        Self::Cave,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ancient => "Ancient",
            Self::Hill => "Hill",
            Self::River => "River",
            Self::Modern => "Modern",
            Self::Cave => "Cave",
        }
    }

    /// Lenient parser used for seed data and loose submissions.
    ///
    /// Compound values such as `Ancient/Heritage` resolve to the first
    /// recognised segment. Unknown values fall back to [`TempleType::Ancient`].
    pub fn parse_lenient(value: &str) -> Self {
        value
            .split(['/', ','])
            .find_map(|segment| Self::try_from(segment).ok())
            .unwrap_or_default()
    }
}

impl Display for TempleType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for TempleType {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ancient" => Ok(Self::Ancient),
            "hill" => Ok(Self::Hill),
            "river" => Ok(Self::River),
            "modern" => Ok(Self::Modern),
            "cave" => Ok(Self::Cave),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "temple type: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for TempleType {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

/// Moderation state of a user submission.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub const ALL: [SubmissionStatus; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    /// String representation used in persistence.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Approved and rejected submissions never change again.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Validates a transition, returning the target state when legal.
    ///
    /// Only `pending -> approved` and `pending -> rejected` are allowed.
    pub fn transition(self, to: SubmissionStatus) -> Result<SubmissionStatus, InvalidTransition> {
        match (self, to) {
            (Self::Pending, Self::Approved | Self::Rejected) => Ok(to),
            (from, to) => Err(InvalidTransition { from, to }),
        }
    }
}

impl Display for SubmissionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for SubmissionStatus {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "submission status: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for SubmissionStatus {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<SubmissionStatus> for String {
    fn from(value: SubmissionStatus) -> Self {
        value.as_str().to_string()
    }
}

/// Attempted status change that the moderation state machine forbids.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("cannot move submission from {from} to {to}")]
pub struct InvalidTransition {
    pub from: SubmissionStatus,
    pub to: SubmissionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_district_names() {
        let value = DistrictName::new("  Hyderabad ").unwrap();
        assert_eq!(value.as_str(), "Hyderabad");
    }

    #[test]
    fn rejects_non_positive_ids() {
        let err = TempleId::new(0).unwrap_err();
        assert_eq!(err, TypeConstraintError::NonPositiveId("temple_id"));
    }

    #[test]
    fn validates_urls() {
        assert!(WebsiteUrl::new("https://tirumala.org").is_ok());
        let err = ImageUrl::new("not-a-url").unwrap_err();
        assert_eq!(err, TypeConstraintError::InvalidUrl("image url"));
    }

    #[test]
    fn validates_coordinates() {
        assert!(Latitude::new(17.602).is_ok());
        assert_eq!(
            Longitude::new(181.0).unwrap_err(),
            TypeConstraintError::OutOfRange("longitude")
        );
        assert!(Latitude::new(f64::NAN).is_err());
    }

    #[test]
    fn parses_region_codes_and_names() {
        assert_eq!(RegionCode::try_from("ts").unwrap(), RegionCode::Telangana);
        assert_eq!(
            RegionCode::try_from("Andhra Pradesh").unwrap(),
            RegionCode::AndhraPradesh
        );
        assert!(RegionCode::try_from("KA").is_err());
    }

    #[test]
    fn region_code_serializes_as_code() {
        let value = serde_json::to_value(RegionCode::AndhraPradesh).unwrap();
        assert_eq!(value, serde_json::json!("AP"));
    }

    #[test]
    fn parses_compound_temple_types() {
        assert_eq!(TempleType::parse_lenient("Cave/Hill"), TempleType::Cave);
        assert_eq!(TempleType::parse_lenient("Scenic/Ancient"), TempleType::Ancient);
        assert_eq!(TempleType::parse_lenient("Hill/River"), TempleType::Hill);
        assert_eq!(TempleType::parse_lenient("Theme Park"), TempleType::Ancient);
    }

    #[test]
    fn localized_text_falls_back_to_english() {
        let text = LocalizedText::english("Chilkur Balaji Temple");
        assert_eq!(text.get(Language::Telugu), "");
        assert_eq!(
            text.get_or_english(Language::Telugu),
            "Chilkur Balaji Temple"
        );
    }

    #[test]
    fn only_pending_submissions_transition() {
        let pending = SubmissionStatus::Pending;
        assert_eq!(
            pending.transition(SubmissionStatus::Approved),
            Ok(SubmissionStatus::Approved)
        );
        assert_eq!(
            pending.transition(SubmissionStatus::Rejected),
            Ok(SubmissionStatus::Rejected)
        );
        assert!(pending.transition(SubmissionStatus::Pending).is_err());

        for terminal in [SubmissionStatus::Approved, SubmissionStatus::Rejected] {
            assert!(terminal.is_terminal());
            for target in SubmissionStatus::ALL {
                assert_eq!(
                    terminal.transition(target),
                    Err(InvalidTransition {
                        from: terminal,
                        to: target
                    })
                );
            }
        }
    }

    #[test]
    fn popularity_is_bounded() {
        assert_eq!(Popularity::new(5).unwrap().get(), 5);
        assert!(Popularity::new(6).is_err());
        assert!(Popularity::new(-1).is_err());
    }
}
