use candid::CandidType;
use serde::Deserialize;

/// Yield Strategy Result
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Yield Strategy Errors
#[derive(Clone, CandidType, Debug, Deserialize, PartialEq)]
pub enum ManagerError {
    /// Unauthorized access
    Unauthorized,
    /// The strategy is already executing a call
    Locked,
    /// The sell order exceeds the outstanding shares
    InsufficientShares,
    /// The sell leg realised less than the caller's minimum
    SlippageExceeded,
    /// The buy leg minted fewer shares than the caller's minimum
    InsufficientSharesFromBuy,
    /// The external protocol rejected or failed a deposit
    ExternalDepositFailed(String),
    /// The external protocol rejected or failed a withdrawal
    ExternalWithdrawFailed(String),
    /// Any other external call (reward claim, swap) failed
    ExternalCallFailed(String),
    /// A token transfer or approval reported failure
    TransferFailed(String),
    /// A requested value does not exist
    NonExistentValue,
    /// Decoding issue
    DecodingError(String),
    /// Unknown/Custom error
    Custom(String),
    /// Arithmetic error
    Arithmetic(String),
}

pub fn arithmetic_err<S: AsRef<str>>(s: S) -> ManagerError {
    ManagerError::Arithmetic(s.as_ref().to_string())
}

/// Message carried by an error, without the variant around it
fn describe(err: ManagerError) -> String {
    match err {
        ManagerError::ExternalDepositFailed(message)
        | ManagerError::ExternalWithdrawFailed(message)
        | ManagerError::ExternalCallFailed(message)
        | ManagerError::TransferFailed(message)
        | ManagerError::DecodingError(message)
        | ManagerError::Custom(message)
        | ManagerError::Arithmetic(message) => message,
        other => format!("{:?}", other),
    }
}

/// Reports a collaborator failure as a failed deposit. Deposit failures pass through.
pub fn deposit_err(err: ManagerError) -> ManagerError {
    match err {
        err @ ManagerError::ExternalDepositFailed(_) => err,
        other => ManagerError::ExternalDepositFailed(describe(other)),
    }
}

/// Reports a collaborator failure as a failed withdrawal. Withdrawal failures pass through.
pub fn withdraw_err(err: ManagerError) -> ManagerError {
    match err {
        err @ ManagerError::ExternalWithdrawFailed(_) => err,
        other => ManagerError::ExternalWithdrawFailed(describe(other)),
    }
}

/// Reports a collaborator failure as a failed external call. Such failures pass through.
pub fn external_err(err: ManagerError) -> ManagerError {
    match err {
        err @ ManagerError::ExternalCallFailed(_) => err,
        other => ManagerError::ExternalCallFailed(describe(other)),
    }
}
