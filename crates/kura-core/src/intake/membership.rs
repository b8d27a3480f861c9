use serde::{Deserialize, Serialize};

use crate::models::seed::MALI_REGIONS;

use super::IntakeError;

/// Region value for members living abroad.
pub const DIASPORA: &str = "diaspora";

/// A filled-in membership form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipApplication {
    pub full_name: String,
    pub phone: String,
    pub region: String,
    #[serde(default)]
    pub profession: Option<String>,
    pub accepts_statutes: bool,
}

/// Acknowledgement shown after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub full_name: String,
    pub region: String,
}

/// Regions offered by the form, in display order.
pub fn regions() -> impl Iterator<Item = &'static str> {
    MALI_REGIONS.iter().copied().chain(std::iter::once(DIASPORA))
}

impl MembershipApplication {
    pub fn validate(&self) -> Result<(), IntakeError> {
        if self.full_name.trim().is_empty() {
            return Err(IntakeError::MissingField("full_name"));
        }
        if self.phone.trim().is_empty() {
            return Err(IntakeError::MissingField("phone"));
        }
        if !self.phone.chars().any(|c| c.is_ascii_digit()) {
            return Err(IntakeError::InvalidPhone(self.phone.clone()));
        }
        if !regions().any(|r| r == self.region) {
            return Err(IntakeError::UnknownRegion(self.region.clone()));
        }
        if !self.accepts_statutes {
            return Err(IntakeError::StatutesNotAccepted);
        }
        Ok(())
    }

    /// Submissions are acknowledged only; nothing is stored or sent.
    pub fn submit(&self) -> Result<Confirmation, IntakeError> {
        self.validate()?;
        Ok(Confirmation {
            full_name: self.full_name.trim().to_string(),
            region: self.region.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn application() -> MembershipApplication {
        MembershipApplication {
            full_name: "Aminata Coulibaly".into(),
            phone: "+223 70 00 00 00".into(),
            region: "Ségou".into(),
            profession: Some("Enseignante".into()),
            accepts_statutes: true,
        }
    }

    #[test]
    fn test_valid_application_is_confirmed() {
        let confirmation = application().submit().unwrap();
        assert_eq!(confirmation.full_name, "Aminata Coulibaly");
        assert_eq!(confirmation.region, "Ségou");
    }

    #[test]
    fn test_diaspora_is_a_region() {
        let app = MembershipApplication {
            region: DIASPORA.into(),
            ..application()
        };
        assert!(app.validate().is_ok());
        assert_eq!(regions().count(), 12);
    }

    #[test]
    fn test_rejections() {
        let no_name = MembershipApplication { full_name: "  ".into(), ..application() };
        assert_eq!(no_name.validate(), Err(IntakeError::MissingField("full_name")));

        let bad_phone = MembershipApplication { phone: "appelez-moi".into(), ..application() };
        assert!(matches!(bad_phone.validate(), Err(IntakeError::InvalidPhone(_))));

        let elsewhere = MembershipApplication { region: "Dakar".into(), ..application() };
        assert!(matches!(elsewhere.validate(), Err(IntakeError::UnknownRegion(_))));

        let refused = MembershipApplication { accepts_statutes: false, ..application() };
        assert_eq!(refused.validate(), Err(IntakeError::StatutesNotAccepted));
    }
}
