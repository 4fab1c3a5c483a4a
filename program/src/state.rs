use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp,
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::{Pubkey, PUBKEY_BYTES},
};
use std::convert::TryFrom;

use crate::error::LotteryError;

/// Seed of the lottery PDA
pub const LOTTERY_SEED: &[u8] = b"lottery";
/// Seed prefix of randomness request PDAs
pub const REQUEST_SEED: &[u8] = b"request";
/// Upper bound on entrant slots; keeps the lottery account under the
/// in-program allocation limit of 10 KiB
pub const MAX_ENTRANTS: u32 = 300;

/// Status of the lottery
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LotteryStatus {
    /// Accepting entries
    Open,
    /// Waiting for the oracle to answer a randomness request
    Drawing,
}

impl TryFrom<u8> for LotteryStatus {
    type Error = ProgramError;

    fn try_from(val: u8) -> Result<Self, Self::Error> {
        match val {
            0 => Ok(LotteryStatus::Open),
            1 => Ok(LotteryStatus::Drawing),
            _ => Err(ProgramError::InvalidAccountData),
        }
    }
}

impl From<LotteryStatus> for u8 {
    fn from(status: LotteryStatus) -> Self {
        match status {
            LotteryStatus::Open => 0,
            LotteryStatus::Drawing => 1,
        }
    }
}

/// Construction parameters, immutable once the lottery exists
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LotteryParams {
    /// Minimum lamports per entry
    pub entrance_fee: u64,
    /// Minimum seconds between draws
    pub interval: u64,
    /// Number of entrant slots allocated for a round
    pub max_entrants: u32,
    /// Key allowed to deliver randomness fulfillments
    pub oracle: Pubkey,
}

impl LotteryParams {
    pub fn validate(&self) -> Result<(), LotteryError> {
        if self.entrance_fee == 0
            || self.interval == 0
            || self.interval > i64::MAX as u64
            || self.max_entrants == 0
            || self.max_entrants > MAX_ENTRANTS
        {
            return Err(LotteryError::InvalidConfiguration);
        }
        Ok(())
    }
}

/// Lottery account data.
///
/// Stored as a fixed header followed by `max_entrants` 32-byte slots, of
/// which the first `entrants.len()` are live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lottery {
    pub is_initialized: bool,
    pub bump: u8,
    pub status: LotteryStatus,
    /// Account that created the lottery
    pub authority: Pubkey,
    /// Only signer accepted for fulfillments
    pub oracle: Pubkey,
    pub entrance_fee: u64,
    /// Seconds
    pub interval: u64,
    pub last_draw_timestamp: UnixTimestamp,
    /// Lamports held for the next winner, on top of the rent reserve
    pub pool: u64,
    pub max_entrants: u32,
    /// Set exactly while `status` is `Drawing`
    pub pending_request_id: Option<u64>,
    /// Requests issued so far
    pub request_counter: u64,
    /// Winner of the last settlement, default key before the first one
    pub recent_winner: Pubkey,
    pub recent_payout: u64,
    pub entrants: Vec<Pubkey>,
}

impl Sealed for Lottery {}

impl IsInitialized for Lottery {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Lottery {
    pub const HEADER_LEN: usize =
        1 + 1 + 1 + 32 + 32 + 8 + 8 + 8 + 8 + 4 + 4 + 1 + 8 + 8 + 32 + 8;

    /// Account size for a lottery with `max_entrants` slots
    pub fn space(max_entrants: u32) -> usize {
        Self::HEADER_LEN + max_entrants as usize * PUBKEY_BYTES
    }

    pub fn entrant_count(&self) -> usize {
        self.entrants.len()
    }

    pub fn entrant(&self, index: usize) -> Option<&Pubkey> {
        self.entrants.get(index)
    }

    pub fn has_recent_winner(&self) -> bool {
        self.recent_winner != Pubkey::default()
    }

    /// Whether raw account data already holds an initialized lottery
    pub fn is_initialized_data(src: &[u8]) -> bool {
        src.first().map_or(false, |flag| *flag != 0)
    }

    pub fn unpack(src: &[u8]) -> Result<Self, ProgramError> {
        if src.len() < Self::HEADER_LEN {
            return Err(ProgramError::AccountDataTooSmall);
        }
        let header = array_ref![src, 0, Lottery::HEADER_LEN];
        let (
            is_initialized,
            bump,
            status,
            authority,
            oracle,
            entrance_fee,
            interval,
            last_draw_timestamp,
            pool,
            max_entrants,
            entrant_count,
            has_pending,
            pending_request_id,
            request_counter,
            recent_winner,
            recent_payout,
        ) = array_refs![header, 1, 1, 1, 32, 32, 8, 8, 8, 8, 4, 4, 1, 8, 8, 32, 8];

        if is_initialized[0] == 0 {
            return Err(ProgramError::UninitializedAccount);
        }

        let max_entrants = u32::from_le_bytes(*max_entrants);
        let entrant_count = u32::from_le_bytes(*entrant_count);
        if entrant_count > max_entrants || src.len() < Self::space(max_entrants) {
            return Err(ProgramError::InvalidAccountData);
        }

        let entrants = src[Self::HEADER_LEN..]
            .chunks_exact(PUBKEY_BYTES)
            .take(entrant_count as usize)
            .map(|slot| Pubkey::new_from_array(*array_ref![slot, 0, PUBKEY_BYTES]))
            .collect();

        let pending_request_id = match has_pending[0] {
            0 => None,
            1 => Some(u64::from_le_bytes(*pending_request_id)),
            _ => return Err(ProgramError::InvalidAccountData),
        };

        Ok(Lottery {
            is_initialized: true,
            bump: bump[0],
            status: LotteryStatus::try_from(status[0])?,
            authority: Pubkey::new_from_array(*authority),
            oracle: Pubkey::new_from_array(*oracle),
            entrance_fee: u64::from_le_bytes(*entrance_fee),
            interval: u64::from_le_bytes(*interval),
            last_draw_timestamp: UnixTimestamp::from_le_bytes(*last_draw_timestamp),
            pool: u64::from_le_bytes(*pool),
            max_entrants,
            pending_request_id,
            request_counter: u64::from_le_bytes(*request_counter),
            recent_winner: Pubkey::new_from_array(*recent_winner),
            recent_payout: u64::from_le_bytes(*recent_payout),
            entrants,
        })
    }

    pub fn pack_into(&self, dst: &mut [u8]) -> Result<(), ProgramError> {
        if dst.len() < Self::space(self.max_entrants)
            || self.entrants.len() > self.max_entrants as usize
        {
            return Err(ProgramError::AccountDataTooSmall);
        }
        let (header, slots) = dst.split_at_mut(Self::HEADER_LEN);
        let header = array_mut_ref![header, 0, Lottery::HEADER_LEN];
        let (
            is_initialized_dst,
            bump_dst,
            status_dst,
            authority_dst,
            oracle_dst,
            entrance_fee_dst,
            interval_dst,
            last_draw_timestamp_dst,
            pool_dst,
            max_entrants_dst,
            entrant_count_dst,
            has_pending_dst,
            pending_request_id_dst,
            request_counter_dst,
            recent_winner_dst,
            recent_payout_dst,
        ) = mut_array_refs![header, 1, 1, 1, 32, 32, 8, 8, 8, 8, 4, 4, 1, 8, 8, 32, 8];

        is_initialized_dst[0] = self.is_initialized as u8;
        bump_dst[0] = self.bump;
        status_dst[0] = self.status.into();
        authority_dst.copy_from_slice(self.authority.as_ref());
        oracle_dst.copy_from_slice(self.oracle.as_ref());
        *entrance_fee_dst = self.entrance_fee.to_le_bytes();
        *interval_dst = self.interval.to_le_bytes();
        *last_draw_timestamp_dst = self.last_draw_timestamp.to_le_bytes();
        *pool_dst = self.pool.to_le_bytes();
        *max_entrants_dst = self.max_entrants.to_le_bytes();
        *entrant_count_dst = (self.entrants.len() as u32).to_le_bytes();
        has_pending_dst[0] = self.pending_request_id.is_some() as u8;
        *pending_request_id_dst = self.pending_request_id.unwrap_or_default().to_le_bytes();
        *request_counter_dst = self.request_counter.to_le_bytes();
        recent_winner_dst.copy_from_slice(self.recent_winner.as_ref());
        *recent_payout_dst = self.recent_payout.to_le_bytes();

        let live = self.entrants.len() * PUBKEY_BYTES;
        for (slot, entrant) in slots[..live]
            .chunks_exact_mut(PUBKEY_BYTES)
            .zip(self.entrants.iter())
        {
            slot.copy_from_slice(entrant.as_ref());
        }
        slots[live..].fill(0);
        Ok(())
    }
}

/// Outstanding randomness request, alive between issuance and fulfillment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomnessRequest {
    pub is_initialized: bool,
    pub bump: u8,
    /// Lottery that issued the request
    pub lottery: Pubkey,
    pub request_id: u64,
    pub requested_at: UnixTimestamp,
}

impl Sealed for RandomnessRequest {}

impl IsInitialized for RandomnessRequest {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Pack for RandomnessRequest {
    const LEN: usize = 1 + 1 + 32 + 8 + 8;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let src = array_ref![src, 0, RandomnessRequest::LEN];
        let (is_initialized, bump, lottery, request_id, requested_at) =
            array_refs![src, 1, 1, 32, 8, 8];

        Ok(RandomnessRequest {
            is_initialized: is_initialized[0] != 0,
            bump: bump[0],
            lottery: Pubkey::new_from_array(*lottery),
            request_id: u64::from_le_bytes(*request_id),
            requested_at: UnixTimestamp::from_le_bytes(*requested_at),
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, RandomnessRequest::LEN];
        let (is_initialized_dst, bump_dst, lottery_dst, request_id_dst, requested_at_dst) =
            mut_array_refs![dst, 1, 1, 32, 8, 8];

        is_initialized_dst[0] = self.is_initialized as u8;
        bump_dst[0] = self.bump;
        lottery_dst.copy_from_slice(self.lottery.as_ref());
        *request_id_dst = self.request_id.to_le_bytes();
        *requested_at_dst = self.requested_at.to_le_bytes();
    }
}
