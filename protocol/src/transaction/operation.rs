//! Operations: the individual actions a transaction carries.
//!
//! Each operation is self-describing on the wire:
//!
//! ```text
//! Operation = { MuxedAccount* sourceAccount; i32 type; body }
//! ```
//!
//! Every operation type the network defines (0 through 26) is modelled so
//! that any transaction handed to the coordinator can be decoded, hashed
//! and re-encoded without loss.

use std::fmt;

use crate::address::{AccountId, MuxedAccount};
use crate::asset::{Asset, AssetCode12, AssetCode4, ChangeTrustAsset, PoolId};
use crate::config::{DATA_ENTRY_MAX, HOME_DOMAIN_MAX, MAX_CLAIMANTS, MAX_PATH_LENGTH};
use crate::error::{Error, Result};
use crate::ledger::LedgerKey;
use crate::transaction::soroban::{HostFunction, SorobanAuthorizationEntry};
use crate::transaction::types::{ClaimableBalanceId, Claimant, Price, Signer, SignerKey};
use crate::xdr::{XdrCodec, XdrError, XdrReader, XdrWriter};

fn invalid_discriminant(type_name: &'static str, value: i32) -> Error {
    XdrError::InvalidDiscriminant { type_name, value }.into()
}

/// Asset code of an allow-trust operation (issuer implied by the source).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetCode {
    AlphaNum4(AssetCode4),
    AlphaNum12(AssetCode12),
}

impl AssetCode {
    /// Picks the width from the code length.
    pub fn new(code: &str) -> Result<Self> {
        if code.len() <= 4 {
            Ok(AssetCode::AlphaNum4(AssetCode4::new(code)?))
        } else {
            Ok(AssetCode::AlphaNum12(AssetCode12::new(code)?))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AssetCode::AlphaNum4(code) => code.as_str(),
            AssetCode::AlphaNum12(code) => code.as_str(),
        }
    }
}

impl XdrCodec for AssetCode {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            AssetCode::AlphaNum4(code) => {
                w.write_i32(1);
                w.write_fixed_opaque(&code.to_padded());
            }
            AssetCode::AlphaNum12(code) => {
                w.write_i32(2);
                w.write_fixed_opaque(&code.to_padded());
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        match r.read_i32()? {
            1 => Ok(AssetCode::AlphaNum4(AssetCode4::from_padded(&r.read_fixed::<4>()?)?)),
            2 => Ok(AssetCode::AlphaNum12(AssetCode12::from_padded(&r.read_fixed::<12>()?)?)),
            other => Err(Error::UnknownAssetType(other)),
        }
    }
}

/// Target of a revoke-sponsorship operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RevokeSponsorship {
    LedgerEntry(LedgerKey),
    Signer {
        account_id: AccountId,
        signer_key: SignerKey,
    },
}

impl XdrCodec for RevokeSponsorship {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            RevokeSponsorship::LedgerEntry(key) => {
                w.write_i32(0);
                key.encode(w);
            }
            RevokeSponsorship::Signer {
                account_id,
                signer_key,
            } => {
                w.write_i32(1);
                account_id.encode(w);
                signer_key.encode(w);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        match r.read_i32()? {
            0 => Ok(RevokeSponsorship::LedgerEntry(LedgerKey::decode(r)?)),
            1 => Ok(RevokeSponsorship::Signer {
                account_id: AccountId::decode(r)?,
                signer_key: SignerKey::decode(r)?,
            }),
            value => Err(invalid_discriminant("RevokeSponsorshipType", value)),
        }
    }
}

/// Account-settings changes; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SetOptions {
    pub inflation_dest: Option<AccountId>,
    pub clear_flags: Option<u32>,
    pub set_flags: Option<u32>,
    pub master_weight: Option<u32>,
    pub low_threshold: Option<u32>,
    pub med_threshold: Option<u32>,
    pub high_threshold: Option<u32>,
    pub home_domain: Option<String>,
    /// Adds, updates (same key) or removes (weight 0) a signer.
    pub signer: Option<Signer>,
}

/// `ManageData`'s optional value. Wrapped so it gets its own codec.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DataValue(Vec<u8>);

impl XdrCodec for DataValue {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_var_opaque(&self.0);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(Self(r.read_var_opaque(DATA_ENTRY_MAX, "DataValue")?))
    }
}

/// `string32` home domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct HomeDomain(String);

impl XdrCodec for HomeDomain {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_var_opaque(self.0.as_bytes());
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(Self(r.read_string(HOME_DOMAIN_MAX, "HomeDomain")?))
    }
}

/// The body of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationBody {
    CreateAccount {
        destination: AccountId,
        starting_balance: i64,
    },
    Payment {
        destination: MuxedAccount,
        asset: Asset,
        amount: i64,
    },
    PathPaymentStrictReceive {
        send_asset: Asset,
        send_max: i64,
        destination: MuxedAccount,
        dest_asset: Asset,
        dest_amount: i64,
        path: Vec<Asset>,
    },
    ManageSellOffer {
        selling: Asset,
        buying: Asset,
        amount: i64,
        price: Price,
        offer_id: i64,
    },
    CreatePassiveSellOffer {
        selling: Asset,
        buying: Asset,
        amount: i64,
        price: Price,
    },
    SetOptions(SetOptions),
    ChangeTrust {
        line: ChangeTrustAsset,
        limit: i64,
    },
    AllowTrust {
        trustor: AccountId,
        asset: AssetCode,
        authorize: u32,
    },
    AccountMerge(MuxedAccount),
    Inflation,
    ManageData {
        name: String,
        value: Option<Vec<u8>>,
    },
    BumpSequence {
        bump_to: i64,
    },
    ManageBuyOffer {
        selling: Asset,
        buying: Asset,
        buy_amount: i64,
        price: Price,
        offer_id: i64,
    },
    PathPaymentStrictSend {
        send_asset: Asset,
        send_amount: i64,
        destination: MuxedAccount,
        dest_asset: Asset,
        dest_min: i64,
        path: Vec<Asset>,
    },
    CreateClaimableBalance {
        asset: Asset,
        amount: i64,
        claimants: Vec<Claimant>,
    },
    ClaimClaimableBalance {
        balance_id: ClaimableBalanceId,
    },
    BeginSponsoringFutureReserves {
        sponsored_id: AccountId,
    },
    EndSponsoringFutureReserves,
    RevokeSponsorship(RevokeSponsorship),
    Clawback {
        asset: Asset,
        from: MuxedAccount,
        amount: i64,
    },
    ClawbackClaimableBalance {
        balance_id: ClaimableBalanceId,
    },
    SetTrustLineFlags {
        trustor: AccountId,
        asset: Asset,
        clear_flags: u32,
        set_flags: u32,
    },
    LiquidityPoolDeposit {
        pool_id: PoolId,
        max_amount_a: i64,
        max_amount_b: i64,
        min_price: Price,
        max_price: Price,
    },
    LiquidityPoolWithdraw {
        pool_id: PoolId,
        amount: i64,
        min_amount_a: i64,
        min_amount_b: i64,
    },
    InvokeHostFunction {
        host_function: HostFunction,
        auth: Vec<SorobanAuthorizationEntry>,
    },
    ExtendFootprintTtl {
        extend_to: u32,
    },
    RestoreFootprint,
}

impl OperationBody {
    /// XDR `OperationType` discriminant.
    pub fn op_type(&self) -> i32 {
        match self {
            OperationBody::CreateAccount { .. } => 0,
            OperationBody::Payment { .. } => 1,
            OperationBody::PathPaymentStrictReceive { .. } => 2,
            OperationBody::ManageSellOffer { .. } => 3,
            OperationBody::CreatePassiveSellOffer { .. } => 4,
            OperationBody::SetOptions(_) => 5,
            OperationBody::ChangeTrust { .. } => 6,
            OperationBody::AllowTrust { .. } => 7,
            OperationBody::AccountMerge(_) => 8,
            OperationBody::Inflation => 9,
            OperationBody::ManageData { .. } => 10,
            OperationBody::BumpSequence { .. } => 11,
            OperationBody::ManageBuyOffer { .. } => 12,
            OperationBody::PathPaymentStrictSend { .. } => 13,
            OperationBody::CreateClaimableBalance { .. } => 14,
            OperationBody::ClaimClaimableBalance { .. } => 15,
            OperationBody::BeginSponsoringFutureReserves { .. } => 16,
            OperationBody::EndSponsoringFutureReserves => 17,
            OperationBody::RevokeSponsorship(_) => 18,
            OperationBody::Clawback { .. } => 19,
            OperationBody::ClawbackClaimableBalance { .. } => 20,
            OperationBody::SetTrustLineFlags { .. } => 21,
            OperationBody::LiquidityPoolDeposit { .. } => 22,
            OperationBody::LiquidityPoolWithdraw { .. } => 23,
            OperationBody::InvokeHostFunction { .. } => 24,
            OperationBody::ExtendFootprintTtl { .. } => 25,
            OperationBody::RestoreFootprint => 26,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OperationBody::CreateAccount { .. } => "create_account",
            OperationBody::Payment { .. } => "payment",
            OperationBody::PathPaymentStrictReceive { .. } => "path_payment_strict_receive",
            OperationBody::ManageSellOffer { .. } => "manage_sell_offer",
            OperationBody::CreatePassiveSellOffer { .. } => "create_passive_sell_offer",
            OperationBody::SetOptions(_) => "set_options",
            OperationBody::ChangeTrust { .. } => "change_trust",
            OperationBody::AllowTrust { .. } => "allow_trust",
            OperationBody::AccountMerge(_) => "account_merge",
            OperationBody::Inflation => "inflation",
            OperationBody::ManageData { .. } => "manage_data",
            OperationBody::BumpSequence { .. } => "bump_sequence",
            OperationBody::ManageBuyOffer { .. } => "manage_buy_offer",
            OperationBody::PathPaymentStrictSend { .. } => "path_payment_strict_send",
            OperationBody::CreateClaimableBalance { .. } => "create_claimable_balance",
            OperationBody::ClaimClaimableBalance { .. } => "claim_claimable_balance",
            OperationBody::BeginSponsoringFutureReserves { .. } => {
                "begin_sponsoring_future_reserves"
            }
            OperationBody::EndSponsoringFutureReserves => "end_sponsoring_future_reserves",
            OperationBody::RevokeSponsorship(_) => "revoke_sponsorship",
            OperationBody::Clawback { .. } => "clawback",
            OperationBody::ClawbackClaimableBalance { .. } => "clawback_claimable_balance",
            OperationBody::SetTrustLineFlags { .. } => "set_trust_line_flags",
            OperationBody::LiquidityPoolDeposit { .. } => "liquidity_pool_deposit",
            OperationBody::LiquidityPoolWithdraw { .. } => "liquidity_pool_withdraw",
            OperationBody::InvokeHostFunction { .. } => "invoke_host_function",
            OperationBody::ExtendFootprintTtl { .. } => "extend_footprint_ttl",
            OperationBody::RestoreFootprint => "restore_footprint",
        }
    }

    /// Contract operations: invoke, extend-ttl and restore.
    pub fn is_soroban(&self) -> bool {
        matches!(
            self,
            OperationBody::InvokeHostFunction { .. }
                | OperationBody::ExtendFootprintTtl { .. }
                | OperationBody::RestoreFootprint
        )
    }
}

impl fmt::Display for OperationBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl XdrCodec for OperationBody {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(self.op_type());
        match self {
            OperationBody::CreateAccount {
                destination,
                starting_balance,
            } => {
                destination.encode(w);
                w.write_i64(*starting_balance);
            }
            OperationBody::Payment {
                destination,
                asset,
                amount,
            } => {
                destination.encode(w);
                asset.encode(w);
                w.write_i64(*amount);
            }
            OperationBody::PathPaymentStrictReceive {
                send_asset,
                send_max,
                destination,
                dest_asset,
                dest_amount,
                path,
            } => {
                send_asset.encode(w);
                w.write_i64(*send_max);
                destination.encode(w);
                dest_asset.encode(w);
                w.write_i64(*dest_amount);
                w.write_array(path);
            }
            OperationBody::ManageSellOffer {
                selling,
                buying,
                amount,
                price,
                offer_id,
            } => {
                selling.encode(w);
                buying.encode(w);
                w.write_i64(*amount);
                price.encode(w);
                w.write_i64(*offer_id);
            }
            OperationBody::CreatePassiveSellOffer {
                selling,
                buying,
                amount,
                price,
            } => {
                selling.encode(w);
                buying.encode(w);
                w.write_i64(*amount);
                price.encode(w);
            }
            OperationBody::SetOptions(opts) => {
                w.write_option(opts.inflation_dest.as_ref());
                w.write_option(opts.clear_flags.as_ref());
                w.write_option(opts.set_flags.as_ref());
                w.write_option(opts.master_weight.as_ref());
                w.write_option(opts.low_threshold.as_ref());
                w.write_option(opts.med_threshold.as_ref());
                w.write_option(opts.high_threshold.as_ref());
                w.write_option(opts.home_domain.clone().map(HomeDomain).as_ref());
                w.write_option(opts.signer.as_ref());
            }
            OperationBody::ChangeTrust { line, limit } => {
                line.encode(w);
                w.write_i64(*limit);
            }
            OperationBody::AllowTrust {
                trustor,
                asset,
                authorize,
            } => {
                trustor.encode(w);
                asset.encode(w);
                w.write_u32(*authorize);
            }
            OperationBody::AccountMerge(destination) => destination.encode(w),
            OperationBody::Inflation
            | OperationBody::EndSponsoringFutureReserves => {}
            OperationBody::ManageData { name, value } => {
                w.write_var_opaque(name.as_bytes());
                w.write_option(value.clone().map(DataValue).as_ref());
            }
            OperationBody::BumpSequence { bump_to } => w.write_i64(*bump_to),
            OperationBody::ManageBuyOffer {
                selling,
                buying,
                buy_amount,
                price,
                offer_id,
            } => {
                selling.encode(w);
                buying.encode(w);
                w.write_i64(*buy_amount);
                price.encode(w);
                w.write_i64(*offer_id);
            }
            OperationBody::PathPaymentStrictSend {
                send_asset,
                send_amount,
                destination,
                dest_asset,
                dest_min,
                path,
            } => {
                send_asset.encode(w);
                w.write_i64(*send_amount);
                destination.encode(w);
                dest_asset.encode(w);
                w.write_i64(*dest_min);
                w.write_array(path);
            }
            OperationBody::CreateClaimableBalance {
                asset,
                amount,
                claimants,
            } => {
                asset.encode(w);
                w.write_i64(*amount);
                w.write_array(claimants);
            }
            OperationBody::ClaimClaimableBalance { balance_id }
            | OperationBody::ClawbackClaimableBalance { balance_id } => balance_id.encode(w),
            OperationBody::BeginSponsoringFutureReserves { sponsored_id } => {
                sponsored_id.encode(w)
            }
            OperationBody::RevokeSponsorship(target) => target.encode(w),
            OperationBody::Clawback {
                asset,
                from,
                amount,
            } => {
                asset.encode(w);
                from.encode(w);
                w.write_i64(*amount);
            }
            OperationBody::SetTrustLineFlags {
                trustor,
                asset,
                clear_flags,
                set_flags,
            } => {
                trustor.encode(w);
                asset.encode(w);
                w.write_u32(*clear_flags);
                w.write_u32(*set_flags);
            }
            OperationBody::LiquidityPoolDeposit {
                pool_id,
                max_amount_a,
                max_amount_b,
                min_price,
                max_price,
            } => {
                pool_id.encode(w);
                w.write_i64(*max_amount_a);
                w.write_i64(*max_amount_b);
                min_price.encode(w);
                max_price.encode(w);
            }
            OperationBody::LiquidityPoolWithdraw {
                pool_id,
                amount,
                min_amount_a,
                min_amount_b,
            } => {
                pool_id.encode(w);
                w.write_i64(*amount);
                w.write_i64(*min_amount_a);
                w.write_i64(*min_amount_b);
            }
            OperationBody::InvokeHostFunction {
                host_function,
                auth,
            } => {
                host_function.encode(w);
                w.write_array(auth);
            }
            OperationBody::ExtendFootprintTtl { extend_to } => {
                // ExtensionPoint v0
                w.write_i32(0);
                w.write_u32(*extend_to);
            }
            OperationBody::RestoreFootprint => w.write_i32(0),
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(match r.read_i32()? {
            0 => OperationBody::CreateAccount {
                destination: AccountId::decode(r)?,
                starting_balance: r.read_i64()?,
            },
            1 => OperationBody::Payment {
                destination: MuxedAccount::decode(r)?,
                asset: Asset::decode(r)?,
                amount: r.read_i64()?,
            },
            2 => OperationBody::PathPaymentStrictReceive {
                send_asset: Asset::decode(r)?,
                send_max: r.read_i64()?,
                destination: MuxedAccount::decode(r)?,
                dest_asset: Asset::decode(r)?,
                dest_amount: r.read_i64()?,
                path: r.read_array(MAX_PATH_LENGTH, "path")?,
            },
            3 => OperationBody::ManageSellOffer {
                selling: Asset::decode(r)?,
                buying: Asset::decode(r)?,
                amount: r.read_i64()?,
                price: Price::decode(r)?,
                offer_id: r.read_i64()?,
            },
            4 => OperationBody::CreatePassiveSellOffer {
                selling: Asset::decode(r)?,
                buying: Asset::decode(r)?,
                amount: r.read_i64()?,
                price: Price::decode(r)?,
            },
            5 => OperationBody::SetOptions(SetOptions {
                inflation_dest: r.read_option()?,
                clear_flags: r.read_option()?,
                set_flags: r.read_option()?,
                master_weight: r.read_option()?,
                low_threshold: r.read_option()?,
                med_threshold: r.read_option()?,
                high_threshold: r.read_option()?,
                home_domain: r.read_option::<HomeDomain>()?.map(|d| d.0),
                signer: r.read_option()?,
            }),
            6 => OperationBody::ChangeTrust {
                line: ChangeTrustAsset::decode(r)?,
                limit: r.read_i64()?,
            },
            7 => OperationBody::AllowTrust {
                trustor: AccountId::decode(r)?,
                asset: AssetCode::decode(r)?,
                authorize: r.read_u32()?,
            },
            8 => OperationBody::AccountMerge(MuxedAccount::decode(r)?),
            9 => OperationBody::Inflation,
            10 => OperationBody::ManageData {
                name: r.read_string(DATA_ENTRY_MAX, "DataName")?,
                value: r.read_option::<DataValue>()?.map(|v| v.0),
            },
            11 => OperationBody::BumpSequence {
                bump_to: r.read_i64()?,
            },
            12 => OperationBody::ManageBuyOffer {
                selling: Asset::decode(r)?,
                buying: Asset::decode(r)?,
                buy_amount: r.read_i64()?,
                price: Price::decode(r)?,
                offer_id: r.read_i64()?,
            },
            13 => OperationBody::PathPaymentStrictSend {
                send_asset: Asset::decode(r)?,
                send_amount: r.read_i64()?,
                destination: MuxedAccount::decode(r)?,
                dest_asset: Asset::decode(r)?,
                dest_min: r.read_i64()?,
                path: r.read_array(MAX_PATH_LENGTH, "path")?,
            },
            14 => OperationBody::CreateClaimableBalance {
                asset: Asset::decode(r)?,
                amount: r.read_i64()?,
                claimants: r.read_array(MAX_CLAIMANTS, "claimants")?,
            },
            15 => OperationBody::ClaimClaimableBalance {
                balance_id: ClaimableBalanceId::decode(r)?,
            },
            16 => OperationBody::BeginSponsoringFutureReserves {
                sponsored_id: AccountId::decode(r)?,
            },
            17 => OperationBody::EndSponsoringFutureReserves,
            18 => OperationBody::RevokeSponsorship(RevokeSponsorship::decode(r)?),
            19 => OperationBody::Clawback {
                asset: Asset::decode(r)?,
                from: MuxedAccount::decode(r)?,
                amount: r.read_i64()?,
            },
            20 => OperationBody::ClawbackClaimableBalance {
                balance_id: ClaimableBalanceId::decode(r)?,
            },
            21 => OperationBody::SetTrustLineFlags {
                trustor: AccountId::decode(r)?,
                asset: Asset::decode(r)?,
                clear_flags: r.read_u32()?,
                set_flags: r.read_u32()?,
            },
            22 => OperationBody::LiquidityPoolDeposit {
                pool_id: PoolId::decode(r)?,
                max_amount_a: r.read_i64()?,
                max_amount_b: r.read_i64()?,
                min_price: Price::decode(r)?,
                max_price: Price::decode(r)?,
            },
            23 => OperationBody::LiquidityPoolWithdraw {
                pool_id: PoolId::decode(r)?,
                amount: r.read_i64()?,
                min_amount_a: r.read_i64()?,
                min_amount_b: r.read_i64()?,
            },
            24 => OperationBody::InvokeHostFunction {
                host_function: HostFunction::decode(r)?,
                auth: r.read_array(u32::MAX as usize, "auth")?,
            },
            25 => {
                read_extension_point(r)?;
                OperationBody::ExtendFootprintTtl {
                    extend_to: r.read_u32()?,
                }
            }
            26 => {
                read_extension_point(r)?;
                OperationBody::RestoreFootprint
            }
            value => return Err(invalid_discriminant("OperationType", value)),
        })
    }
}

fn read_extension_point(r: &mut XdrReader<'_>) -> Result<()> {
    match r.read_i32()? {
        0 => Ok(()),
        value => Err(invalid_discriminant("ExtensionPoint", value)),
    }
}

/// One operation, optionally executed on behalf of a different account
/// than the transaction source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operation {
    pub source_account: Option<MuxedAccount>,
    pub body: OperationBody,
}

impl Operation {
    pub fn new(body: OperationBody) -> Self {
        Self {
            source_account: None,
            body,
        }
    }

    pub fn with_source(mut self, source: MuxedAccount) -> Self {
        self.source_account = Some(source);
        self
    }

    /// Convenience constructor for the most common custody operation.
    pub fn payment(destination: MuxedAccount, asset: Asset, amount: i64) -> Self {
        Self::new(OperationBody::Payment {
            destination,
            asset,
            amount,
        })
    }
}

impl From<OperationBody> for Operation {
    fn from(body: OperationBody) -> Self {
        Self::new(body)
    }
}

impl XdrCodec for Operation {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_option(self.source_account.as_ref());
        self.body.encode(w);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(Self {
            source_account: r.read_option()?,
            body: OperationBody::decode(r)?,
        })
    }
}
