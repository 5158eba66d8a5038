use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GrantError;

/// The fixed set of organizations joined to the grant network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Organization {
    Grantor,
    Awardee,
    Auditor,
    Subawardee,
}

impl Organization {
    pub fn all() -> &'static [Organization] {
        &[
            Organization::Grantor,
            Organization::Awardee,
            Organization::Auditor,
            Organization::Subawardee,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Organization::Grantor => "Grantor",
            Organization::Awardee => "Awardee",
            Organization::Auditor => "Auditor",
            Organization::Subawardee => "Subawardee",
        }
    }

    pub fn msp_id(self) -> String {
        format!("{}MSP", self.as_str())
    }

    /// Lowercase form used in default file names.
    pub fn slug(self) -> String {
        self.as_str().to_ascii_lowercase()
    }
}

impl fmt::Display for Organization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `Grantor`, `grantor` and `GrantorMSP`. Only the first letter is
/// case-insensitive.
impl std::str::FromStr for Organization {
    type Err = GrantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let name = trimmed.strip_suffix("MSP").unwrap_or(trimmed);
        let mut chars = name.chars();
        let normalized = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        Organization::all()
            .iter()
            .copied()
            .find(|o| o.as_str() == normalized)
            .ok_or_else(|| GrantError::UnknownOrganization(s.to_string()))
    }
}

impl TryFrom<String> for Organization {
    type Error = GrantError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Organization> for String {
    fn from(o: Organization) -> Self {
        o.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_lowercase_first_letter_and_msp_form() {
        assert_eq!("Grantor".parse::<Organization>().unwrap(), Organization::Grantor);
        assert_eq!("awardee".parse::<Organization>().unwrap(), Organization::Awardee);
        assert_eq!("SubawardeeMSP".parse::<Organization>().unwrap(), Organization::Subawardee);
        assert_eq!(" auditor ".parse::<Organization>().unwrap(), Organization::Auditor);
    }

    #[test]
    fn rejects_unknown_organizations() {
        for bad in ["Funder", "", "GRANTOR", "MSP", "Org1MSP"] {
            assert!(
                matches!(bad.parse::<Organization>(), Err(GrantError::UnknownOrganization(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn msp_id_and_slug() {
        assert_eq!(Organization::Grantor.msp_id(), "GrantorMSP");
        assert_eq!(Organization::Subawardee.slug(), "subawardee");
    }

    #[test]
    fn serde_uses_canonical_name() {
        let json = serde_json::to_string(&Organization::Auditor).unwrap();
        assert_eq!(json, "\"Auditor\"");
        let back: Organization = serde_json::from_str("\"auditor\"").unwrap();
        assert_eq!(back, Organization::Auditor);
        assert!(serde_json::from_str::<Organization>("\"nobody\"").is_err());
    }
}
