//! Wire fixtures shared by the integration tests.

#![allow(dead_code)]

use base64::Engine as _;

use stellar_custody::address::AccountId;
use stellar_custody::asset::Asset;
use stellar_custody::xdr::{XdrCodec, XdrWriter};

/// An account ledger entry with no signers and an empty extension.
pub fn account_entry(account: AccountId, balance: i64) -> Vec<u8> {
    let mut w = XdrWriter::new();
    w.write_i32(0);
    account.encode(&mut w);
    w.write_i64(balance);
    w.write_i64(1);
    w.write_u32(0);
    w.write_bool(false);
    w.write_u32(0);
    w.write_var_opaque(b"");
    w.write_fixed_opaque(&[1, 0, 0, 0]);
    w.write_u32(0);
    w.write_i32(0);
    w.into_bytes()
}

/// A trustline ledger entry for an issued asset.
pub fn trustline_entry(account: AccountId, asset: &Asset, balance: i64) -> Vec<u8> {
    let mut w = XdrWriter::new();
    w.write_i32(1);
    account.encode(&mut w);
    asset.encode(&mut w);
    w.write_i64(balance);
    w.write_i64(i64::MAX);
    w.write_u32(1);
    w.write_i32(0);
    w.into_bytes()
}

/// Base64 `TransactionResult`: the fee, txSUCCESS, no operation
/// results, empty extension.
pub fn success_result(fee_charged: i64) -> String {
    let mut w = XdrWriter::new();
    w.write_i64(fee_charged);
    w.write_i32(0);
    w.write_u32(0);
    w.write_i32(0);
    base64::engine::general_purpose::STANDARD.encode(w.into_bytes())
}
