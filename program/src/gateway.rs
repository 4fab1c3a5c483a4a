// Randomness request/response boundary between the lottery and its oracle
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::AccountInfo,
    clock::UnixTimestamp,
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    rent::Rent,
    sysvar::Sysvar,
};
use std::fmt;

use crate::{
    error::LotteryError,
    state::{RandomnessRequest, REQUEST_SEED},
    utils::{create_pda_account, find_request_address},
};

/// 256-bit random word delivered by the oracle, read as a big-endian integer
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, PartialEq, Eq)]
pub struct RandomValue([u8; 32]);

impl RandomValue {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<u64> for RandomValue {
    fn from(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

impl fmt::Debug for RandomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RandomValue(0x")?;
        for byte in self.0.iter() {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}

/// Issues randomness requests on behalf of the lottery.
///
/// `nonce` is unique per lottery; the returned id is what the oracle must
/// echo back when it fulfills the request.
pub trait RandomnessGateway {
    fn request_randomness(&mut self, nonce: u64) -> Result<u64, ProgramError>;
}

/// Gateway that publishes each request as a program-owned account the
/// off-chain oracle watches for.
pub struct RequestAccountGateway<'a, 'info> {
    pub program_id: &'a Pubkey,
    pub lottery: &'a Pubkey,
    pub payer_info: &'a AccountInfo<'info>,
    pub request_info: &'a AccountInfo<'info>,
    pub system_program_info: &'a AccountInfo<'info>,
    pub now: UnixTimestamp,
}

impl<'a, 'info> RandomnessGateway for RequestAccountGateway<'a, 'info> {
    fn request_randomness(&mut self, nonce: u64) -> Result<u64, ProgramError> {
        let (expected_request, bump) = find_request_address(self.program_id, self.lottery, nonce);
        if *self.request_info.key != expected_request {
            msg!("Request account must be the PDA for request {}", nonce);
            return Err(ProgramError::InvalidSeeds);
        }
        if !self.request_info.data_is_empty() {
            msg!("Request account {} already exists", self.request_info.key);
            return Err(ProgramError::AccountAlreadyInitialized);
        }

        let rent = Rent::get()?;
        create_pda_account(
            self.payer_info,
            &rent,
            RandomnessRequest::LEN,
            self.program_id,
            self.system_program_info,
            self.request_info,
            &[
                REQUEST_SEED,
                self.lottery.as_ref(),
                &nonce.to_le_bytes(),
                &[bump],
            ],
        )?;

        let request = RandomnessRequest {
            is_initialized: true,
            bump,
            lottery: *self.lottery,
            request_id: nonce,
            requested_at: self.now,
        };
        RandomnessRequest::pack(request, &mut self.request_info.data.borrow_mut())?;

        msg!("Randomness requested: id={} account={}", nonce, self.request_info.key);
        Ok(nonce)
    }
}

/// Ensure the fulfillment was signed by the lottery's oracle
pub fn verify_oracle(oracle_info: &AccountInfo, expected: &Pubkey) -> ProgramResult {
    if !oracle_info.is_signer || oracle_info.key != expected {
        msg!("Fulfillment must be signed by oracle {}", expected);
        return Err(LotteryError::UnauthorizedOracle.into());
    }
    Ok(())
}

/// Load the request account a fulfillment refers to. Anything that does
/// not correlate to `request_id` of `lottery` is an unknown request.
pub fn load_request(
    program_id: &Pubkey,
    lottery: &Pubkey,
    request_info: &AccountInfo,
    request_id: u64,
) -> Result<RandomnessRequest, ProgramError> {
    if request_info.owner != program_id {
        msg!("No open request at {}", request_info.key);
        return Err(LotteryError::UnknownRequest.into());
    }
    let request = RandomnessRequest::unpack(&request_info.data.borrow())
        .map_err(|_| ProgramError::from(LotteryError::UnknownRequest))?;
    if request.lottery != *lottery || request.request_id != request_id {
        msg!(
            "Request account holds id {} for {}, fulfillment names id {}",
            request.request_id,
            request.lottery,
            request_id
        );
        return Err(LotteryError::UnknownRequest.into());
    }
    let expected = Pubkey::create_program_address(
        &[
            REQUEST_SEED,
            lottery.as_ref(),
            &request_id.to_le_bytes(),
            &[request.bump],
        ],
        program_id,
    )?;
    if expected != *request_info.key {
        return Err(LotteryError::UnknownRequest.into());
    }
    Ok(request)
}

/// Close a fulfilled request, handing its rent to `recipient_info`
pub fn close_request(request_info: &AccountInfo, recipient_info: &AccountInfo) -> ProgramResult {
    let reclaimed = request_info.lamports();
    let recipient_balance = recipient_info
        .lamports()
        .checked_add(reclaimed)
        .ok_or(LotteryError::ArithmeticOverflow)?;

    **request_info.try_borrow_mut_lamports()? = 0;
    **recipient_info.try_borrow_mut_lamports()? = recipient_balance;
    request_info.data.borrow_mut().fill(0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_program::clock::Epoch;

    struct TestAccount {
        key: Pubkey,
        owner: Pubkey,
        lamports: u64,
        data: Vec<u8>,
    }

    impl TestAccount {
        fn info(&mut self, is_signer: bool) -> AccountInfo<'_> {
            AccountInfo::new(
                &self.key,
                is_signer,
                true,
                &mut self.lamports,
                &mut self.data,
                &self.owner,
                false,
                Epoch::default(),
            )
        }
    }

    fn request_account(program_id: Pubkey, lottery: Pubkey, request_id: u64) -> TestAccount {
        let (key, bump) = find_request_address(&program_id, &lottery, request_id);
        let mut data = vec![0u8; RandomnessRequest::LEN];
        RandomnessRequest::pack(
            RandomnessRequest {
                is_initialized: true,
                bump,
                lottery,
                request_id,
                requested_at: 100,
            },
            &mut data,
        )
        .unwrap();
        TestAccount {
            key,
            owner: program_id,
            lamports: 1_000,
            data,
        }
    }

    #[test]
    fn from_u64_places_value_in_low_bytes() {
        let value = RandomValue::from(0x0102);
        assert_eq!(value.as_bytes()[30..], [0x01, 0x02]);
        assert!(value.as_bytes()[..30].iter().all(|b| *b == 0));
    }

    #[test]
    fn matching_request_is_loaded() {
        let program_id = Pubkey::new_unique();
        let lottery = Pubkey::new_unique();
        let mut account = request_account(program_id, lottery, 3);
        let info = account.info(false);
        let request = load_request(&program_id, &lottery, &info, 3).unwrap();
        assert_eq!(request.request_id, 3);
        assert_eq!(request.requested_at, 100);
    }

    #[test]
    fn mismatched_request_id_is_unknown() {
        let program_id = Pubkey::new_unique();
        let lottery = Pubkey::new_unique();
        let mut account = request_account(program_id, lottery, 3);
        let info = account.info(false);
        assert_eq!(
            load_request(&program_id, &lottery, &info, 4).unwrap_err(),
            LotteryError::UnknownRequest.into()
        );
    }

    #[test]
    fn request_of_another_lottery_is_unknown() {
        let program_id = Pubkey::new_unique();
        let lottery = Pubkey::new_unique();
        let mut account = request_account(program_id, Pubkey::new_unique(), 3);
        let info = account.info(false);
        assert_eq!(
            load_request(&program_id, &lottery, &info, 3).unwrap_err(),
            LotteryError::UnknownRequest.into()
        );
    }

    #[test]
    fn foreign_owned_request_is_unknown() {
        let program_id = Pubkey::new_unique();
        let lottery = Pubkey::new_unique();
        let mut account = request_account(program_id, lottery, 3);
        account.owner = Pubkey::new_unique();
        let info = account.info(false);
        assert_eq!(
            load_request(&program_id, &lottery, &info, 3).unwrap_err(),
            LotteryError::UnknownRequest.into()
        );
    }

    #[test]
    fn oracle_must_sign_and_match() {
        let oracle = Pubkey::new_unique();
        let mut account = TestAccount {
            key: oracle,
            owner: Pubkey::default(),
            lamports: 0,
            data: vec![],
        };
        assert!(verify_oracle(&account.info(true), &oracle).is_ok());
        assert_eq!(
            verify_oracle(&account.info(false), &oracle).unwrap_err(),
            LotteryError::UnauthorizedOracle.into()
        );
        assert_eq!(
            verify_oracle(&account.info(true), &Pubkey::new_unique()).unwrap_err(),
            LotteryError::UnauthorizedOracle.into()
        );
    }

    #[test]
    fn closing_moves_rent_and_wipes_data() {
        let program_id = Pubkey::new_unique();
        let mut request = request_account(program_id, Pubkey::new_unique(), 1);
        let mut oracle = TestAccount {
            key: Pubkey::new_unique(),
            owner: Pubkey::default(),
            lamports: 5,
            data: vec![],
        };
        {
            let request_info = request.info(false);
            let oracle_info = oracle.info(true);
            close_request(&request_info, &oracle_info).unwrap();
        }
        assert_eq!(request.lamports, 0);
        assert_eq!(oracle.lamports, 1_005);
        assert!(request.data.iter().all(|b| *b == 0));
    }
}
