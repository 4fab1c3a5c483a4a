use solana_program::{
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    program::{invoke, invoke_signed},
    pubkey::Pubkey,
    rent::Rent,
    system_instruction,
};

use crate::{
    gateway::RandomValue,
    state::{LOTTERY_SEED, REQUEST_SEED},
};

/// Find the program derived address of the lottery
pub fn find_lottery_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[LOTTERY_SEED], program_id)
}

/// Find the program derived address of a randomness request
pub fn find_request_address(program_id: &Pubkey, lottery: &Pubkey, request_id: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[REQUEST_SEED, lottery.as_ref(), &request_id.to_le_bytes()],
        program_id,
    )
}

/// Create a program-owned account at a PDA.
///
/// Anyone can send lamports to an address before it is created, which makes
/// `create_account` fail. A funded address is topped up to rent exemption,
/// then allocated and assigned under the PDA's signature instead.
pub fn create_pda_account<'a>(
    payer_info: &AccountInfo<'a>,
    rent: &Rent,
    space: usize,
    owner: &Pubkey,
    system_program_info: &AccountInfo<'a>,
    new_pda_info: &AccountInfo<'a>,
    new_pda_signer_seeds: &[&[u8]],
) -> ProgramResult {
    if new_pda_info.lamports() > 0 {
        let required_lamports = rent
            .minimum_balance(space)
            .max(1)
            .saturating_sub(new_pda_info.lamports());

        if required_lamports > 0 {
            invoke(
                &system_instruction::transfer(payer_info.key, new_pda_info.key, required_lamports),
                &[
                    payer_info.clone(),
                    new_pda_info.clone(),
                    system_program_info.clone(),
                ],
            )?;
        }

        invoke_signed(
            &system_instruction::allocate(new_pda_info.key, space as u64),
            &[new_pda_info.clone(), system_program_info.clone()],
            &[new_pda_signer_seeds],
        )?;

        invoke_signed(
            &system_instruction::assign(new_pda_info.key, owner),
            &[new_pda_info.clone(), system_program_info.clone()],
            &[new_pda_signer_seeds],
        )
    } else {
        invoke_signed(
            &system_instruction::create_account(
                payer_info.key,
                new_pda_info.key,
                rent.minimum_balance(space).max(1),
                space as u64,
                owner,
            ),
            &[
                payer_info.clone(),
                new_pda_info.clone(),
                system_program_info.clone(),
            ],
            &[new_pda_signer_seeds],
        )
    }
}

/// Index of the winning entrant: the full 256-bit random value modulo the
/// number of entrants. `None` when there are no entrants.
pub fn winner_index(random_value: &RandomValue, entrant_count: usize) -> Option<usize> {
    if entrant_count == 0 {
        return None;
    }
    let modulus = entrant_count as u128;
    // Horner's rule over big-endian bytes; the accumulator stays below the modulus.
    let index = random_value
        .as_bytes()
        .iter()
        .fold(0u128, |acc, byte| ((acc << 8) | *byte as u128) % modulus);
    Some(index as usize)
}
