use chrono::{DateTime, Utc};

use super::IntakeError;

/// Amounts offered as one-tap choices, in euros.
pub const PRESET_AMOUNTS: [u32; 4] = [5, 10, 20, 50];

pub const DEFAULT_AMOUNT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonationStep {
    Choose,
    Confirm,
}

/// Proof of a simulated payment. No money moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub amount: u32,
    pub reference: String,
    pub issued_at: DateTime<Utc>,
}

/// Two-step donation flow: pick an amount, then confirm it.
#[derive(Debug, Clone)]
pub struct DonationFlow {
    amount: Option<u32>,
    step: DonationStep,
}

impl Default for DonationFlow {
    fn default() -> Self {
        Self {
            amount: Some(DEFAULT_AMOUNT),
            step: DonationStep::Choose,
        }
    }
}

impl DonationFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount(&self) -> Option<u32> {
        self.amount
    }

    pub fn step(&self) -> DonationStep {
        self.step
    }

    /// Set a custom amount; `None` clears the field.
    pub fn set_amount(&mut self, amount: Option<u32>) {
        self.amount = amount;
    }

    /// Whether the flow can move past the amount step.
    pub fn can_proceed(&self) -> bool {
        self.amount.is_some_and(|a| a > 0)
    }

    pub fn proceed(&mut self) -> Result<(), IntakeError> {
        if !self.can_proceed() {
            return Err(IntakeError::InvalidAmount);
        }
        self.step = DonationStep::Confirm;
        Ok(())
    }

    /// Finish the simulated payment and return to the first step.
    pub fn confirm(&mut self) -> Result<Receipt, IntakeError> {
        if self.step != DonationStep::Confirm {
            return Err(IntakeError::NotConfirmable);
        }
        let amount = self.amount.filter(|a| *a > 0).ok_or(IntakeError::InvalidAmount)?;
        let issued_at = Utc::now();
        self.reset();
        Ok(Receipt {
            amount,
            reference: format!("ARM-{}", issued_at.timestamp_millis()),
            issued_at,
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_amount_can_proceed() {
        let mut flow = DonationFlow::new();
        assert_eq!(flow.amount(), Some(10));
        flow.proceed().unwrap();
        assert_eq!(flow.step(), DonationStep::Confirm);

        let receipt = flow.confirm().unwrap();
        assert_eq!(receipt.amount, 10);
        assert!(receipt.reference.starts_with("ARM-"));
        assert_eq!(flow.step(), DonationStep::Choose);
    }

    #[test]
    fn test_zero_or_empty_amount_blocks() {
        let mut flow = DonationFlow::new();
        flow.set_amount(Some(0));
        assert!(!flow.can_proceed());
        assert_eq!(flow.proceed(), Err(IntakeError::InvalidAmount));

        flow.set_amount(None);
        assert_eq!(flow.proceed(), Err(IntakeError::InvalidAmount));
        assert_eq!(flow.step(), DonationStep::Choose);
    }

    #[test]
    fn test_confirm_requires_second_step() {
        let mut flow = DonationFlow::new();
        flow.set_amount(Some(PRESET_AMOUNTS[3]));
        assert_eq!(flow.confirm(), Err(IntakeError::NotConfirmable));
        flow.proceed().unwrap();
        assert_eq!(flow.confirm().unwrap().amount, 50);
    }
}
