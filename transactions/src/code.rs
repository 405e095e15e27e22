//! Response codes and their error categories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad class of a transaction failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed bytes or envelope.
    Decode,
    /// Well-formed but not acceptable in the current state.
    Validation,
    /// Would break an economic rule: funds, reserves, supply, liquidity.
    EconomicInvariant,
    /// A bounded resource is full: block gas, stake list slots.
    Capacity,
    /// Already applied, expired, or bound to another chain.
    Replay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum Code {
    Ok = 0,

    WrongNonce = 101,
    CoinNotExists = 102,
    TxTooLarge = 105,
    DecodeError = 106,
    InsufficientFunds = 107,
    TxPayloadTooLarge = 109,
    CoinSupplyOverflow = 112,
    TooLowGasPrice = 114,
    WrongChainId = 115,
    CoinReserveUnderflow = 116,
    CommissionCoinNotSufficient = 119,
    BlockGasLimitReached = 120,

    CoinHasNotReserve = 200,
    CoinAlreadyExists = 201,
    WrongCrr = 202,

    CrossConvert = 301,
    MinimumValueToBuyReached = 303,

    CandidateExists = 401,
    WrongCommission = 402,
    CandidateNotFound = 403,
    StakeNotFound = 404,
    InsufficientStake = 405,
    IsNotOwnerOfCandidate = 406,
    StakeShouldBePositive = 408,
    TooLowStake = 409,

    CheckInvalidLock = 501,
    CheckExpired = 502,
    CheckUsed = 503,
    TooHighGasPrice = 504,
    WrongGasCoin = 505,
    TooLongNonce = 506,

    PairNotExists = 700,
    InsufficientLiquidity = 701,
    InsufficientOutputAmount = 702,
    InsufficientInputAmount = 703,
    PairAlreadyExists = 704,
}

impl Code {
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// `None` for `Ok`.
    pub fn category(self) -> Option<ErrorCategory> {
        use Code::*;
        let category = match self {
            Ok => return None,
            TxTooLarge | DecodeError | TxPayloadTooLarge => ErrorCategory::Decode,
            WrongNonce | WrongChainId | CheckExpired | CheckUsed => ErrorCategory::Replay,
            BlockGasLimitReached | TooLowStake => ErrorCategory::Capacity,
            InsufficientFunds
            | CoinSupplyOverflow
            | CoinReserveUnderflow
            | CommissionCoinNotSufficient
            | CoinHasNotReserve
            | MinimumValueToBuyReached
            | InsufficientStake
            | InsufficientLiquidity
            | InsufficientOutputAmount
            | InsufficientInputAmount => ErrorCategory::EconomicInvariant,
            CoinNotExists | TooLowGasPrice | CoinAlreadyExists | WrongCrr | CrossConvert
            | CandidateExists | WrongCommission | CandidateNotFound | StakeNotFound
            | IsNotOwnerOfCandidate | StakeShouldBePositive | CheckInvalidLock
            | TooHighGasPrice | WrongGasCoin | TooLongNonce | PairNotExists
            | PairAlreadyExists => ErrorCategory::Validation,
        };
        Some(category)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_values_are_stable() {
        assert_eq!(Code::Ok.as_u32(), 0);
        assert_eq!(Code::WrongNonce.as_u32(), 101);
        assert_eq!(Code::CheckUsed.as_u32(), 503);
        assert_eq!(Code::PairNotExists.as_u32(), 700);
    }

    #[test]
    fn categories() {
        assert_eq!(Code::Ok.category(), None);
        assert_eq!(Code::DecodeError.category(), Some(ErrorCategory::Decode));
        assert_eq!(Code::CheckUsed.category(), Some(ErrorCategory::Replay));
        assert_eq!(Code::TooLowStake.category(), Some(ErrorCategory::Capacity));
        assert_eq!(
            Code::InsufficientFunds.category(),
            Some(ErrorCategory::EconomicInvariant)
        );
        assert_eq!(Code::WrongGasCoin.category(), Some(ErrorCategory::Validation));
    }
}
