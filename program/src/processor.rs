use borsh::BorshSerialize;
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, set_return_data},
    program_error::ProgramError,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction, system_program,
    sysvar::{clock::Clock, Sysvar},
};

use crate::{
    error::LotteryError,
    gateway::{self, RandomValue, RequestAccountGateway},
    instruction::LotteryInstruction,
    payout::LamportVault,
    state::{Lottery, LotteryParams, LOTTERY_SEED},
    utils::{create_pda_account, find_lottery_address},
};

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = LotteryInstruction::unpack(instruction_data)?;

        match instruction {
            LotteryInstruction::Initialize { params } => {
                msg!("Instruction: Initialize");
                Self::process_initialize(accounts, params, program_id)
            }
            LotteryInstruction::Enter { amount } => {
                msg!("Instruction: Enter");
                Self::process_enter(accounts, amount, program_id)
            }
            LotteryInstruction::CheckEligibility {} => {
                msg!("Instruction: Check Eligibility");
                Self::process_check_eligibility(accounts, program_id)
            }
            LotteryInstruction::TriggerDraw {} => {
                msg!("Instruction: Trigger Draw");
                Self::process_trigger_draw(accounts, program_id)
            }
            LotteryInstruction::FulfillRandomness {
                request_id,
                random_value,
            } => {
                msg!("Instruction: Fulfill Randomness");
                Self::process_fulfill_randomness(accounts, request_id, random_value, program_id)
            }
        }
    }

    fn process_initialize(
        accounts: &[AccountInfo],
        params: LotteryParams,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let authority_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !authority_info.is_signer {
            msg!("Authority must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        Self::check_system_program(system_program_info)?;

        let (expected_lottery, bump) = find_lottery_address(program_id);
        if *lottery_info.key != expected_lottery {
            msg!("Invalid lottery account address");
            return Err(ProgramError::InvalidSeeds);
        }
        if lottery_info.owner == program_id
            && Lottery::is_initialized_data(&lottery_info.data.borrow())
        {
            msg!("Lottery account is already initialized");
            return Err(ProgramError::AccountAlreadyInitialized);
        }

        let clock = Clock::get()?;
        let lottery = Lottery::new(&params, *authority_info.key, bump, clock.unix_timestamp)?;

        let space = Lottery::space(params.max_entrants);
        let rent = Rent::get()?;
        create_pda_account(
            authority_info,
            &rent,
            space,
            program_id,
            system_program_info,
            lottery_info,
            &[LOTTERY_SEED, &[bump]],
        )?;

        lottery.pack_into(&mut lottery_info.data.borrow_mut())?;

        msg!(
            "Lottery initialized: EntranceFee={} Interval={}s MaxEntrants={} Oracle={}",
            lottery.entrance_fee,
            lottery.interval,
            lottery.max_entrants,
            lottery.oracle
        );
        Ok(())
    }

    fn process_enter(accounts: &[AccountInfo], amount: u64, program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let entrant_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !entrant_info.is_signer {
            msg!("Entrant must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        Self::check_system_program(system_program_info)?;

        let mut lottery = Self::load_lottery(lottery_info, program_id)?;
        let event = lottery.enter(*entrant_info.key, amount)?;

        invoke(
            &system_instruction::transfer(entrant_info.key, lottery_info.key, amount),
            &[
                entrant_info.clone(),
                lottery_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        lottery.pack_into(&mut lottery_info.data.borrow_mut())?;
        event.emit()?;

        msg!("Pool now {} lamports over {} entries", lottery.pool, lottery.entrant_count());
        Ok(())
    }

    fn process_check_eligibility(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let lottery_info = next_account_info(account_info_iter)?;

        let lottery = Self::load_lottery(lottery_info, program_id)?;
        let clock = Clock::get()?;
        let eligibility = lottery.check_eligibility(clock.unix_timestamp);

        let data = eligibility
            .try_to_vec()
            .map_err(|e| ProgramError::BorshIoError(e.to_string()))?;
        set_return_data(&data);

        msg!("Eligible={} ({})", eligibility.is_eligible(), eligibility);
        Ok(())
    }

    fn process_trigger_draw(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let request_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !caller_info.is_signer {
            msg!("Caller must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        Self::check_system_program(system_program_info)?;

        let mut lottery = Self::load_lottery(lottery_info, program_id)?;
        let clock = Clock::get()?;

        let mut gateway = RequestAccountGateway {
            program_id,
            lottery: lottery_info.key,
            payer_info: caller_info,
            request_info,
            system_program_info,
            now: clock.unix_timestamp,
        };
        let event = lottery.trigger_draw(clock.unix_timestamp, &mut gateway)?;

        lottery.pack_into(&mut lottery_info.data.borrow_mut())?;
        event.emit()?;
        Ok(())
    }

    fn process_fulfill_randomness(
        accounts: &[AccountInfo],
        request_id: u64,
        random_value: RandomValue,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let oracle_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let request_info = next_account_info(account_info_iter)?;
        let winner_info = next_account_info(account_info_iter)?;

        let mut lottery = Self::load_lottery(lottery_info, program_id)?;
        gateway::verify_oracle(oracle_info, &lottery.oracle)?;
        gateway::load_request(program_id, lottery_info.key, request_info, request_id)?;

        let clock = Clock::get()?;
        let mut vault = LamportVault {
            vault_info: lottery_info,
            winner_info,
        };
        let event = lottery.settle(request_id, &random_value, clock.unix_timestamp, &mut vault)?;

        lottery.pack_into(&mut lottery_info.data.borrow_mut())?;
        gateway::close_request(request_info, oracle_info)?;
        event.emit()?;
        Ok(())
    }

    fn load_lottery(lottery_info: &AccountInfo, program_id: &Pubkey) -> Result<Lottery, ProgramError> {
        if lottery_info.owner != program_id {
            msg!("Lottery account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }
        let lottery = Lottery::unpack(&lottery_info.data.borrow())?;
        let expected = Pubkey::create_program_address(&[LOTTERY_SEED, &[lottery.bump]], program_id)?;
        if expected != *lottery_info.key {
            msg!("Account {} is not the lottery", lottery_info.key);
            return Err(LotteryError::InvalidLotteryAccount.into());
        }
        Ok(lottery)
    }

    fn check_system_program(system_program_info: &AccountInfo) -> ProgramResult {
        if *system_program_info.key != system_program::id() {
            msg!("Expected the system program");
            return Err(ProgramError::IncorrectProgramId);
        }
        Ok(())
    }
}
