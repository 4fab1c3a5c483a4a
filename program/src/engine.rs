//! Lottery state machine.
//!
//! Every operation validates first and only then mutates, so a failed call
//! leaves the `Lottery` exactly as it found it.
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{clock::UnixTimestamp, msg, program_error::ProgramError, pubkey::Pubkey};
use std::fmt;

use crate::{
    error::LotteryError,
    events::LotteryEvent,
    gateway::{RandomValue, RandomnessGateway},
    payout::PrizeVault,
    state::{Lottery, LotteryParams, LotteryStatus},
    utils::winner_index,
};

/// Snapshot of the four draw conditions
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Eligibility {
    pub is_open: bool,
    pub interval_elapsed: bool,
    pub has_entrants: bool,
    pub has_balance: bool,
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        self.is_open && self.interval_elapsed && self.has_entrants && self.has_balance
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "open={} interval_elapsed={} has_entrants={} has_balance={}",
            self.is_open, self.interval_elapsed, self.has_entrants, self.has_balance
        )
    }
}

impl Lottery {
    pub fn new(
        params: &LotteryParams,
        authority: Pubkey,
        bump: u8,
        now: UnixTimestamp,
    ) -> Result<Self, LotteryError> {
        params.validate()?;
        Ok(Lottery {
            is_initialized: true,
            bump,
            status: LotteryStatus::Open,
            authority,
            oracle: params.oracle,
            entrance_fee: params.entrance_fee,
            interval: params.interval,
            last_draw_timestamp: now,
            pool: 0,
            max_entrants: params.max_entrants,
            pending_request_id: None,
            request_counter: 0,
            recent_winner: Pubkey::default(),
            recent_payout: 0,
            entrants: Vec::with_capacity(params.max_entrants as usize),
        })
    }

    /// Record one paid entry for `entrant`
    pub fn enter(&mut self, entrant: Pubkey, payment: u64) -> Result<LotteryEvent, LotteryError> {
        if self.status != LotteryStatus::Open {
            return Err(LotteryError::RaffleNotOpen);
        }
        if payment < self.entrance_fee {
            msg!("Entrance fee is {}, got {}", self.entrance_fee, payment);
            return Err(LotteryError::InsufficientPayment);
        }
        if self.entrants.len() >= self.max_entrants as usize {
            return Err(LotteryError::LotteryFull);
        }
        let pool = self
            .pool
            .checked_add(payment)
            .ok_or(LotteryError::ArithmeticOverflow)?;

        let position = self.entrants.len() as u32;
        self.entrants.push(entrant);
        self.pool = pool;

        Ok(LotteryEvent::EntryRecorded { entrant, position })
    }

    pub fn check_eligibility(&self, now: UnixTimestamp) -> Eligibility {
        let elapsed = now.saturating_sub(self.last_draw_timestamp);
        Eligibility {
            is_open: self.status == LotteryStatus::Open,
            interval_elapsed: elapsed >= 0 && elapsed as u64 >= self.interval,
            has_entrants: !self.entrants.is_empty(),
            has_balance: self.pool > 0,
        }
    }

    /// Start a draw by asking `gateway` for randomness.
    ///
    /// Eligibility is re-checked here; a keeper's earlier check is never trusted.
    pub fn trigger_draw<G: RandomnessGateway>(
        &mut self,
        now: UnixTimestamp,
        gateway: &mut G,
    ) -> Result<LotteryEvent, ProgramError> {
        let eligibility = self.check_eligibility(now);
        if !eligibility.is_eligible() {
            msg!("Draw not due: {}", eligibility);
            return Err(LotteryError::EligibilityNotMet.into());
        }

        let nonce = self
            .request_counter
            .checked_add(1)
            .ok_or(LotteryError::ArithmeticOverflow)?;
        let request_id = gateway.request_randomness(nonce)?;

        self.request_counter = nonce;
        self.status = LotteryStatus::Drawing;
        self.pending_request_id = Some(request_id);

        Ok(LotteryEvent::DrawRequested { request_id })
    }

    /// Entrant selected by `random_value` from the current round
    pub fn winner_for(&self, random_value: &RandomValue) -> Option<Pubkey> {
        winner_index(random_value, self.entrants.len()).map(|index| self.entrants[index])
    }

    /// Finish the pending draw: pay the whole pool to the selected entrant
    /// and open the next round.
    pub fn settle<V: PrizeVault>(
        &mut self,
        request_id: u64,
        random_value: &RandomValue,
        now: UnixTimestamp,
        vault: &mut V,
    ) -> Result<LotteryEvent, ProgramError> {
        if self.status != LotteryStatus::Drawing || self.pending_request_id != Some(request_id) {
            msg!(
                "Fulfillment for request {} does not match pending request {:?}",
                request_id,
                self.pending_request_id
            );
            return Err(LotteryError::UnknownRequest.into());
        }
        let winner = self
            .winner_for(random_value)
            .ok_or(LotteryError::InvalidLotteryAccount)?;
        let payout = self.pool;

        vault.pay(&winner, payout)?;

        self.entrants.clear();
        self.pool = 0;
        self.status = LotteryStatus::Open;
        self.pending_request_id = None;
        self.last_draw_timestamp = now;
        self.recent_winner = winner;
        self.recent_payout = payout;

        Ok(LotteryEvent::WinnerPicked {
            request_id,
            winner,
            payout,
        })
    }
}
