//! Visitor-facing forms: membership intake and the simulated donation flow.

pub mod donation;
pub mod membership;

pub use donation::{DonationFlow, DonationStep, Receipt, DEFAULT_AMOUNT, PRESET_AMOUNTS};
pub use membership::{regions, Confirmation, MembershipApplication, DIASPORA};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntakeError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("The party statutes must be accepted")]
    StatutesNotAccepted,

    #[error("Donation amount must be greater than zero")]
    InvalidAmount,

    #[error("Donation has not been reviewed yet")]
    NotConfirmable,
}
