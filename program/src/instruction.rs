use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::{
    error::LotteryError,
    gateway::RandomValue,
    state::LotteryParams,
    utils::{find_lottery_address, find_request_address},
};

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum LotteryInstruction {
    /// Create the lottery account
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The authority, pays for the lottery account
    /// 1. `[writable]` The lottery account (PDA, `["lottery"]`)
    /// 2. `[]` The system program
    Initialize {
        params: LotteryParams,
    },

    /// Buy one entry into the current round
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The entrant, pays `amount` lamports
    /// 1. `[writable]` The lottery account
    /// 2. `[]` The system program
    Enter {
        /// Lamports paid, at least the entrance fee
        amount: u64,
    },

    /// Report whether a draw is due, as borsh `Eligibility` return data.
    /// Writes nothing.
    ///
    /// Accounts expected:
    /// 0. `[]` The lottery account
    CheckEligibility {},

    /// Start a draw and publish a randomness request (keeper entry point)
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` Any caller, pays for the request account
    /// 1. `[writable]` The lottery account
    /// 2. `[writable]` The request account (PDA, `["request", lottery, id]`)
    /// 3. `[]` The system program
    TriggerDraw {},

    /// Deliver the oracle's random value and settle the draw
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The lottery oracle, receives the request rent
    /// 1. `[writable]` The lottery account
    /// 2. `[writable]` The request account being fulfilled
    /// 3. `[writable]` The winning entrant
    FulfillRandomness {
        request_id: u64,
        random_value: RandomValue,
    },
}

impl LotteryInstruction {
    /// Unpacks a byte buffer into a LotteryInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        Self::try_from_slice(input).map_err(|_| LotteryError::InvalidInstructionData.into())
    }

    /// Packs a LotteryInstruction into a byte buffer
    pub fn pack(&self) -> Result<Vec<u8>, ProgramError> {
        self.try_to_vec()
            .map_err(|e| ProgramError::BorshIoError(e.to_string()))
    }
}

/// Create initialize instruction
pub fn initialize(
    program_id: &Pubkey,
    authority: &Pubkey,
    params: LotteryParams,
) -> Result<Instruction, ProgramError> {
    let data = LotteryInstruction::Initialize { params }.pack()?;
    let (lottery, _) = find_lottery_address(program_id);

    let accounts = vec![
        AccountMeta::new(*authority, true),
        AccountMeta::new(lottery, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create enter instruction
pub fn enter(
    program_id: &Pubkey,
    entrant: &Pubkey,
    amount: u64,
) -> Result<Instruction, ProgramError> {
    let data = LotteryInstruction::Enter { amount }.pack()?;
    let (lottery, _) = find_lottery_address(program_id);

    let accounts = vec![
        AccountMeta::new(*entrant, true),
        AccountMeta::new(lottery, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create check_eligibility instruction
pub fn check_eligibility(program_id: &Pubkey) -> Result<Instruction, ProgramError> {
    let data = LotteryInstruction::CheckEligibility {}.pack()?;
    let (lottery, _) = find_lottery_address(program_id);

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![AccountMeta::new_readonly(lottery, false)],
        data,
    })
}

/// Create trigger_draw instruction. `request_id` is the id the draw will
/// be issued under: the lottery's `request_counter + 1`.
pub fn trigger_draw(
    program_id: &Pubkey,
    caller: &Pubkey,
    request_id: u64,
) -> Result<Instruction, ProgramError> {
    let data = LotteryInstruction::TriggerDraw {}.pack()?;
    let (lottery, _) = find_lottery_address(program_id);
    let (request, _) = find_request_address(program_id, &lottery, request_id);

    let accounts = vec![
        AccountMeta::new(*caller, true),
        AccountMeta::new(lottery, false),
        AccountMeta::new(request, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Create fulfill_randomness instruction
pub fn fulfill_randomness(
    program_id: &Pubkey,
    oracle: &Pubkey,
    request_id: u64,
    random_value: RandomValue,
    winner: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let data = LotteryInstruction::FulfillRandomness {
        request_id,
        random_value,
    }
    .pack()?;
    let (lottery, _) = find_lottery_address(program_id);
    let (request, _) = find_request_address(program_id, &lottery, request_id);

    let accounts = vec![
        AccountMeta::new(*oracle, true),
        AccountMeta::new(lottery, false),
        AccountMeta::new(request, false),
        AccountMeta::new(*winner, false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_follow_declaration_order() {
        assert_eq!(LotteryInstruction::CheckEligibility {}.pack().unwrap(), vec![2]);
        assert_eq!(LotteryInstruction::TriggerDraw {}.pack().unwrap(), vec![3]);

        let enter = LotteryInstruction::Enter { amount: 10 }.pack().unwrap();
        assert_eq!(enter[0], 1);
        assert_eq!(enter[1..], 10u64.to_le_bytes());
    }

    #[test]
    fn fulfillment_carries_the_full_random_word() {
        let random_value = RandomValue::new([7u8; 32]);
        let data = LotteryInstruction::FulfillRandomness {
            request_id: 3,
            random_value,
        }
        .pack()
        .unwrap();
        assert_eq!(data.len(), 1 + 8 + 32);
        assert_eq!(
            LotteryInstruction::unpack(&data).unwrap(),
            LotteryInstruction::FulfillRandomness {
                request_id: 3,
                random_value,
            }
        );
    }

    #[test]
    fn garbage_is_invalid_instruction_data() {
        assert_eq!(
            LotteryInstruction::unpack(&[9]).unwrap_err(),
            LotteryError::InvalidInstructionData.into()
        );
        assert_eq!(
            LotteryInstruction::unpack(&[1, 0, 0]).unwrap_err(),
            LotteryError::InvalidInstructionData.into()
        );
        assert!(LotteryInstruction::unpack(&[]).is_err());
    }

    #[test]
    fn fulfillment_names_the_request_pda() {
        let program_id = Pubkey::new_unique();
        let oracle = Pubkey::new_unique();
        let winner = Pubkey::new_unique();
        let ix = fulfill_randomness(&program_id, &oracle, 5, RandomValue::from(1), &winner)
            .unwrap();
        let (lottery, _) = find_lottery_address(&program_id);
        let (request, _) = find_request_address(&program_id, &lottery, 5);
        assert_eq!(ix.accounts[1].pubkey, lottery);
        assert_eq!(ix.accounts[2].pubkey, request);
        assert!(ix.accounts[0].is_signer);
        assert!(ix.accounts[3].is_writable);
    }
}
