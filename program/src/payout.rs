use solana_program::{
    account_info::AccountInfo, entrypoint::ProgramResult, msg, pubkey::Pubkey,
};

use crate::error::LotteryError;

/// Custodian of the pool at settlement time.
///
/// `pay` must either move the full amount to `winner` or fail without
/// moving anything.
pub trait PrizeVault {
    fn pay(&mut self, winner: &Pubkey, amount: u64) -> ProgramResult;
}

/// Pays out of the program-owned lottery account by moving lamports
/// directly to the winner's account.
pub struct LamportVault<'a, 'info> {
    pub vault_info: &'a AccountInfo<'info>,
    pub winner_info: &'a AccountInfo<'info>,
}

impl<'a, 'info> PrizeVault for LamportVault<'a, 'info> {
    fn pay(&mut self, winner: &Pubkey, amount: u64) -> ProgramResult {
        if self.winner_info.key != winner {
            msg!("Winner is {}, but payout account is {}", winner, self.winner_info.key);
            return Err(LotteryError::PayoutTransferFailed.into());
        }
        if !self.winner_info.is_writable {
            msg!("Winner account {} is not writable", winner);
            return Err(LotteryError::PayoutTransferFailed.into());
        }

        let vault_balance = self
            .vault_info
            .lamports()
            .checked_sub(amount)
            .ok_or(LotteryError::PayoutTransferFailed)?;
        let winner_balance = self
            .winner_info
            .lamports()
            .checked_add(amount)
            .ok_or(LotteryError::PayoutTransferFailed)?;

        **self.vault_info.try_borrow_mut_lamports()? = vault_balance;
        **self.winner_info.try_borrow_mut_lamports()? = winner_balance;

        msg!("Paid {} lamports to {}", amount, winner);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_program::{clock::Epoch, program_error::ProgramError};

    #[test]
    fn pays_the_named_winner() {
        let owner = Pubkey::new_unique();
        let (vault_key, winner_key) = (Pubkey::new_unique(), Pubkey::new_unique());
        let (mut vault_lamports, mut winner_lamports) = (1_000u64, 5u64);
        let (mut vault_data, mut winner_data) = (Vec::<u8>::new(), Vec::<u8>::new());
        {
            let vault_info = AccountInfo::new(
                &vault_key, false, true, &mut vault_lamports, &mut vault_data, &owner, false,
                Epoch::default(),
            );
            let winner_info = AccountInfo::new(
                &winner_key, false, true, &mut winner_lamports, &mut winner_data, &owner, false,
                Epoch::default(),
            );
            let mut vault = LamportVault {
                vault_info: &vault_info,
                winner_info: &winner_info,
            };
            vault.pay(&winner_key, 400).unwrap();
        }
        assert_eq!(vault_lamports, 600);
        assert_eq!(winner_lamports, 405);
    }

    #[test]
    fn refuses_an_account_other_than_the_winner() {
        let owner = Pubkey::new_unique();
        let (vault_key, other_key) = (Pubkey::new_unique(), Pubkey::new_unique());
        let (mut vault_lamports, mut other_lamports) = (1_000u64, 5u64);
        let (mut vault_data, mut other_data) = (Vec::<u8>::new(), Vec::<u8>::new());
        {
            let vault_info = AccountInfo::new(
                &vault_key, false, true, &mut vault_lamports, &mut vault_data, &owner, false,
                Epoch::default(),
            );
            let other_info = AccountInfo::new(
                &other_key, false, true, &mut other_lamports, &mut other_data, &owner, false,
                Epoch::default(),
            );
            let mut vault = LamportVault {
                vault_info: &vault_info,
                winner_info: &other_info,
            };
            assert_eq!(
                vault.pay(&Pubkey::new_unique(), 400).unwrap_err(),
                ProgramError::from(LotteryError::PayoutTransferFailed)
            );
        }
        assert_eq!(vault_lamports, 1_000);
        assert_eq!(other_lamports, 5);
    }

    #[test]
    fn refuses_to_overdraw_the_vault() {
        let owner = Pubkey::new_unique();
        let (vault_key, winner_key) = (Pubkey::new_unique(), Pubkey::new_unique());
        let (mut vault_lamports, mut winner_lamports) = (100u64, 0u64);
        let (mut vault_data, mut winner_data) = (Vec::<u8>::new(), Vec::<u8>::new());
        let vault_info = AccountInfo::new(
            &vault_key, false, true, &mut vault_lamports, &mut vault_data, &owner, false,
            Epoch::default(),
        );
        let winner_info = AccountInfo::new(
            &winner_key, false, true, &mut winner_lamports, &mut winner_data, &owner, false,
            Epoch::default(),
        );
        let mut vault = LamportVault {
            vault_info: &vault_info,
            winner_info: &winner_info,
        };
        assert_eq!(
            vault.pay(&winner_key, 101).unwrap_err(),
            ProgramError::from(LotteryError::PayoutTransferFailed)
        );
        assert_eq!(vault_info.lamports(), 100);
    }
}
