// Lottery Program
// An autonomous raffle: paid entries, keeper-triggered draws and
// oracle-delivered randomness

pub mod engine;
pub mod error;
pub mod events;
pub mod gateway;
pub mod instruction;
pub mod payout;
pub mod processor;
pub mod state;
pub mod utils;

#[cfg(not(feature = "no-entrypoint"))]
mod entrypoint;

use solana_program::{
    account_info::AccountInfo, entrypoint::ProgramResult, msg, program_error::ProgramError,
    pubkey::Pubkey,
};
use std::convert::TryFrom;

use crate::error::LotteryError;

/// Run one instruction, logging any failure before it is returned
pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    if let Err(error) = processor::Processor::process(program_id, accounts, instruction_data) {
        log_failure(&error);
        return Err(error);
    }
    Ok(())
}

fn log_failure(error: &ProgramError) {
    msg!("Error: {}", describe_failure(error));
}

fn describe_failure(error: &ProgramError) -> String {
    match error {
        ProgramError::Custom(code) => match LotteryError::try_from(*code) {
            Ok(lottery_error) => format!("{} (custom program error {:#x})", lottery_error, code),
            Err(_) => format!("custom program error {:#x}", code),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lottery_codes_are_named_alongside_the_raw_code() {
        assert_eq!(
            describe_failure(&LotteryError::EligibilityNotMet.into()),
            "Draw conditions are not met (custom program error 0x1775)"
        );
    }

    #[test]
    fn codes_from_invoked_programs_stay_raw() {
        assert_eq!(
            describe_failure(&ProgramError::Custom(0)),
            "custom program error 0x0"
        );
        assert_eq!(
            describe_failure(&ProgramError::MissingRequiredSignature),
            ProgramError::MissingRequiredSignature.to_string()
        );
    }
}
