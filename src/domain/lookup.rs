use std::error::Error;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub mod category {
    pub const MEMBER_STATUS: &str = "memberstatus";
    pub const ORDER_STATUS: &str = "orderstatus";
    pub const WORK_TYPE: &str = "worktype";
    pub const SKILL: &str = "skill";
    pub const MARITAL_STATUS: &str = "maritalstatus";
    pub const RACE: &str = "race";
    pub const INCOME: &str = "income";
    pub const GENDER: &str = "gender";
    pub const ACTIVITY_NAME: &str = "activityName";
    pub const EVENT_TYPE: &str = "eventtype";
    pub const TRANSPORT_METHOD: &str = "transportmethod";
}

pub mod order_status {
    pub const ACTIVE: &str = "Active";
    pub const PENDING: &str = "Pending";
    pub const COMPLETED: &str = "Completed";
    pub const CANCELLED: &str = "Cancelled";
    pub const EXPIRED: &str = "Expired";
}

pub mod member_status {
    pub const ACTIVE: &str = "Active";
    pub const SANCTIONED: &str = "Sanctioned";
    pub const EXPELLED: &str = "Expelled";
    pub const EXPIRED: &str = "Expired";
    pub const INACTIVE: &str = "Inactive";
}

pub mod marital_status {
    pub const SINGLE: &str = "Single";
    pub const MARRIED: &str = "Married";
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Lookup {
    pub id: i64,
    pub category: String,
    pub key: Option<String>,
    pub text_en: String,
    pub text_es: String,
    #[serde(default)]
    pub speciality: bool,
    #[serde(default)]
    pub type_of_work_id: Option<i64>,
    #[serde(default)]
    pub ltr_code: Option<String>,
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Lookup {
    pub fn text(&self, locale: Locale) -> &str {
        match locale {
            Locale::Es if !self.text_es.trim().is_empty() => &self.text_es,
            _ => &self.text_en,
        }
    }

    /// Dispatch board skill code, e.g. `C3` for a level-3 carpentry skill.
    pub fn skill_code(&self) -> String {
        format!(
            "{}{}",
            self.ltr_code.as_deref().unwrap_or(""),
            self.level.map(|level| level.to_string()).unwrap_or_default()
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Es];

    pub fn as_str(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = ParseLocaleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        let language = normalized.split('-').next().unwrap_or("");
        match language {
            "en" | "english" => Ok(Locale::En),
            "es" | "spanish" | "español" => Ok(Locale::Es),
            _ => Err(ParseLocaleError {
                value: value.to_string(),
            }),
        }
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Locale::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLocaleError {
    value: String,
}

impl fmt::Display for ParseLocaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unsupported locale '{}': expected one of {}",
            self.value,
            Locale::ALL
                .iter()
                .map(|locale| locale.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl Error for ParseLocaleError {}
