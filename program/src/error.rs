use solana_program::{decode_error::DecodeError, program_error::ProgramError};
use std::convert::TryFrom;
use thiserror::Error;

/// First custom error code of the program. Codes below it belong to the
/// programs we invoke, the system program among them.
pub const ERROR_CODE_OFFSET: u32 = 6000;

/// Errors that may be returned by the Lottery program
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum LotteryError {
    /// Invalid instruction data passed
    #[error("Invalid instruction data")]
    InvalidInstructionData = 6000,

    /// Entrance fee, interval and capacity must all be positive
    #[error("Invalid lottery configuration")]
    InvalidConfiguration,

    /// Payment is below the entrance fee
    #[error("Not enough lamports sent to enter")]
    InsufficientPayment,

    /// Entries are only accepted while the lottery is open
    #[error("Lottery is not open")]
    RaffleNotOpen,

    /// Every entrant slot is taken
    #[error("Lottery is full")]
    LotteryFull,

    /// A draw was triggered while the lottery was not eligible
    #[error("Draw conditions are not met")]
    EligibilityNotMet,

    /// Fulfillment does not match the pending randomness request
    #[error("Unknown randomness request")]
    UnknownRequest,

    /// Fulfillment was not signed by the configured oracle
    #[error("Fulfillment not signed by the lottery oracle")]
    UnauthorizedOracle,

    /// The pool could not be delivered to the winner
    #[error("Payout transfer to the winner failed")]
    PayoutTransferFailed,

    /// Arithmetic overflow in pool or counter bookkeeping
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    /// Account is not the lottery account of this program
    #[error("Invalid lottery account")]
    InvalidLotteryAccount,
}

impl From<LotteryError> for ProgramError {
    fn from(e: LotteryError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for LotteryError {
    fn type_of() -> &'static str {
        "Lottery Error"
    }
}

impl TryFrom<u32> for LotteryError {
    type Error = ProgramError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        use LotteryError::*;
        const ALL: [LotteryError; 11] = [
            InvalidInstructionData,
            InvalidConfiguration,
            InsufficientPayment,
            RaffleNotOpen,
            LotteryFull,
            EligibilityNotMet,
            UnknownRequest,
            UnauthorizedOracle,
            PayoutTransferFailed,
            ArithmeticOverflow,
            InvalidLotteryAccount,
        ];
        let index = code
            .checked_sub(ERROR_CODE_OFFSET)
            .ok_or(ProgramError::InvalidArgument)?;
        ALL.get(index as usize)
            .copied()
            .ok_or(ProgramError::InvalidArgument)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_decode_back_to_the_same_variant() {
        for code in ERROR_CODE_OFFSET..ERROR_CODE_OFFSET + 11 {
            let err = LotteryError::try_from(code).unwrap();
            assert_eq!(ProgramError::from(err), ProgramError::Custom(code));
        }
        assert_eq!(
            ProgramError::from(LotteryError::InvalidLotteryAccount),
            ProgramError::Custom(6010)
        );
        assert!(LotteryError::try_from(ERROR_CODE_OFFSET + 11).is_err());
    }

    #[test]
    fn system_program_codes_are_not_lottery_errors() {
        // AccountAlreadyInUse and ResultWithNegativeLamports
        assert!(LotteryError::try_from(0).is_err());
        assert!(LotteryError::try_from(1).is_err());
    }
}
