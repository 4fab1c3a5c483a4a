use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    entrypoint::ProgramResult, log::sol_log_data, msg, program_error::ProgramError,
    pubkey::Pubkey,
};
use std::fmt;

/// Notifications observable by off-chain listeners
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum LotteryEvent {
    /// An entry was appended at `position` (zero based)
    EntryRecorded { entrant: Pubkey, position: u32 },
    /// A draw started and is waiting on `request_id`
    DrawRequested { request_id: u64 },
    /// The draw for `request_id` paid `payout` lamports to `winner`
    WinnerPicked {
        request_id: u64,
        winner: Pubkey,
        payout: u64,
    },
}

impl LotteryEvent {
    /// Log the event as text and as a borsh-encoded data record
    pub fn emit(&self) -> ProgramResult {
        msg!("{}", self);
        let data = self
            .try_to_vec()
            .map_err(|e| ProgramError::BorshIoError(e.to_string()))?;
        sol_log_data(&[&data]);
        Ok(())
    }
}

impl fmt::Display for LotteryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LotteryEvent::EntryRecorded { entrant, position } => {
                write!(f, "EntryRecorded: entrant={} position={}", entrant, position)
            }
            LotteryEvent::DrawRequested { request_id } => {
                write!(f, "DrawRequested: request_id={}", request_id)
            }
            LotteryEvent::WinnerPicked {
                request_id,
                winner,
                payout,
            } => write!(
                f,
                "WinnerPicked: request_id={} winner={} payout={}",
                request_id, winner, payout
            ),
        }
    }
}
