//! Common utility and helper functions that are used across the project

use std::str::FromStr;

use alloy_primitives::{Address, U256};
use candid::Nat;
use num_bigint::BigUint;

use super::error::*;
use crate::types::CallContext;

/// Returns Err if the `caller` is not the strategy's controller
pub fn only_controller(caller: Address, controller: Address) -> ManagerResult<()> {
    if caller != controller {
        // only the controller routes orders into the strategy
        return Err(ManagerError::Unauthorized);
    }
    Ok(())
}

/// Returns Err if the `caller` is not the strategy's owner
pub fn only_owner(caller: Address, owner: Address) -> ManagerResult<()> {
    if caller != owner {
        return Err(ManagerError::Unauthorized);
    }
    Ok(())
}

/// Returns Err if the call was relayed through an intermediary contract
pub fn only_direct_caller(context: &CallContext) -> ManagerResult<()> {
    if !context.is_direct_caller {
        return Err(ManagerError::Unauthorized);
    }
    Ok(())
}

/// Converts String to Address and returns ManagerError on failure
pub fn string_to_address(input: String) -> ManagerResult<Address> {
    Address::from_str(&input).map_err(|err| ManagerError::DecodingError(format!("{:#?}", err)))
}

/// Converts values of type `Nat` to `U256`
pub fn nat_to_u256(n: &Nat) -> ManagerResult<U256> {
    let be_bytes = n.0.to_bytes_be();
    if be_bytes.len() > 32 {
        return Err(ManagerError::DecodingError("The `Nat` input length exceedes 32 bytes when converted to big-endian bytes representation.".to_string()));
    }
    // Ensure the byte array is exactly 32 bytes long
    let mut padded_bytes = [0u8; 32];
    let start_pos = 32 - be_bytes.len();
    padded_bytes[start_pos..].copy_from_slice(&be_bytes);

    Ok(U256::from_be_bytes(padded_bytes))
}

/// Converts values of type `U256` to `Nat`
pub fn u256_to_nat(value: &U256) -> Nat {
    Nat(BigUint::from_bytes_be(&value.to_be_bytes::<32>()))
}

/// Computes `a * b / denominator`, rounding down.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> ManagerResult<U256> {
    a.checked_mul(b)
        .ok_or_else(|| arithmetic_err("Multiplication overflowed."))?
        .checked_div(denominator)
        .ok_or_else(|| arithmetic_err("Division by zero."))
}

/// Computes `a * b / denominator`, rounding up.
pub fn mul_div_up(a: U256, b: U256, denominator: U256) -> ManagerResult<U256> {
    let product = a
        .checked_mul(b)
        .ok_or_else(|| arithmetic_err("Multiplication overflowed."))?;
    if denominator.is_zero() {
        return Err(arithmetic_err("Division by zero."));
    }
    let quotient = product / denominator;
    if (product % denominator).is_zero() {
        Ok(quotient)
    } else {
        Ok(quotient + U256::from(1))
    }
}

/// Share of `total_value` owned by `part` out of `whole`, rounding down.
/// Returns zero while either the value or the whole is empty.
pub fn proportion(part: U256, total_value: U256, whole: U256) -> ManagerResult<U256> {
    if whole.is_zero() || total_value.is_zero() {
        return Ok(U256::ZERO);
    }
    mul_div(part, total_value, whole)
}
