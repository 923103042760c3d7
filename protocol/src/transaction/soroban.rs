//! Smart-contract (Soroban) wire types.
//!
//! Contract calls travel inside an `InvokeHostFunction` operation; the
//! resources they may consume travel in the V1 transaction extension as
//! [`SorobanTransactionData`]. Values passed to contracts are [`ScVal`]s.
//!
//! Everything here is recursive in at least one direction (vectors of
//! values, maps of values, trees of authorized invocations), so every
//! recursive decode goes through the reader's depth guard.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::address::{AccountId, ContractId, MuxedAccount};
use crate::asset::{Asset, PoolId};
use crate::config::SC_SYMBOL_MAX;
use crate::crypto::strkey::{self, Version};
use crate::error::{Error, Result};
use crate::ledger::LedgerKey;
use crate::transaction::types::ClaimableBalanceId;
use crate::xdr::{XdrCodec, XdrError, XdrReader, XdrWriter};

/// Bound used for XDR arrays declared without a maximum.
const UNBOUNDED: usize = u32::MAX as usize;

fn invalid_discriminant(type_name: &'static str, value: i32) -> Error {
    XdrError::InvalidDiscriminant { type_name, value }.into()
}

fn read_nested_array<T: XdrCodec>(r: &mut XdrReader<'_>, type_name: &'static str) -> Result<Vec<T>> {
    r.enter()?;
    let items = r.read_array(UNBOUNDED, type_name);
    r.leave();
    items
}

fn read_symbol(r: &mut XdrReader<'_>) -> Result<String> {
    Ok(r.read_string(SC_SYMBOL_MAX, "SCSymbol")?)
}

// ---------------------------------------------------------------------------
// ScAddress
// ---------------------------------------------------------------------------

/// Any entity a contract can address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScAddress {
    Account(AccountId),
    Contract(ContractId),
    MuxedAccount { id: u64, ed25519: [u8; 32] },
    ClaimableBalance(ClaimableBalanceId),
    LiquidityPool(PoolId),
}

impl fmt::Display for ScAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScAddress::Account(account) => write!(f, "{account}"),
            ScAddress::Contract(contract) => write!(f, "{contract}"),
            ScAddress::MuxedAccount { id, ed25519 } => write!(
                f,
                "{}",
                MuxedAccount::MuxedEd25519 {
                    id: *id,
                    ed25519: *ed25519
                }
            ),
            ScAddress::ClaimableBalance(id) => f.write_str(&id.to_strkey()),
            ScAddress::LiquidityPool(id) => f.write_str(&id.to_strkey()),
        }
    }
}

impl FromStr for ScAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (version, payload) =
            strkey::decode_any(s).map_err(|e| Error::InvalidAddress(format!("{s}: {e}")))?;
        let mut hash = [0u8; 32];
        match version {
            Version::AccountId => {
                hash.copy_from_slice(&payload);
                Ok(ScAddress::Account(AccountId(hash)))
            }
            Version::Contract => {
                hash.copy_from_slice(&payload);
                Ok(ScAddress::Contract(ContractId(hash)))
            }
            Version::MuxedAccount => match s.parse::<MuxedAccount>()? {
                MuxedAccount::MuxedEd25519 { id, ed25519 } => {
                    Ok(ScAddress::MuxedAccount { id, ed25519 })
                }
                MuxedAccount::Ed25519(key) => Ok(ScAddress::Account(AccountId(key))),
            },
            Version::LiquidityPool => {
                hash.copy_from_slice(&payload);
                Ok(ScAddress::LiquidityPool(PoolId(hash)))
            }
            Version::ClaimableBalance if payload[0] == 0 => {
                hash.copy_from_slice(&payload[1..]);
                Ok(ScAddress::ClaimableBalance(ClaimableBalanceId(hash)))
            }
            other => Err(Error::InvalidAddress(format!(
                "{s}: {other:?} cannot be a contract address"
            ))),
        }
    }
}

impl XdrCodec for ScAddress {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            ScAddress::Account(account) => {
                w.write_i32(0);
                account.encode(w);
            }
            ScAddress::Contract(contract) => {
                w.write_i32(1);
                contract.encode(w);
            }
            ScAddress::MuxedAccount { id, ed25519 } => {
                w.write_i32(2);
                w.write_u64(*id);
                w.write_fixed_opaque(ed25519);
            }
            ScAddress::ClaimableBalance(id) => {
                w.write_i32(3);
                id.encode(w);
            }
            ScAddress::LiquidityPool(id) => {
                w.write_i32(4);
                id.encode(w);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        match r.read_i32()? {
            0 => Ok(ScAddress::Account(AccountId::decode(r)?)),
            1 => Ok(ScAddress::Contract(ContractId::decode(r)?)),
            2 => Ok(ScAddress::MuxedAccount {
                id: r.read_u64()?,
                ed25519: r.read_fixed::<32>()?,
            }),
            3 => Ok(ScAddress::ClaimableBalance(ClaimableBalanceId::decode(r)?)),
            4 => Ok(ScAddress::LiquidityPool(PoolId::decode(r)?)),
            value => Err(invalid_discriminant("SCAddressType", value)),
        }
    }
}

// ---------------------------------------------------------------------------
// ScVal
// ---------------------------------------------------------------------------

/// A contract error value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScError {
    /// Error raised by contract code, with its contract-defined number.
    Contract(u32),
    /// Host error: error type (1..=9) and error code (0..=9).
    Host { error_type: i32, code: i32 },
}

impl XdrCodec for ScError {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            ScError::Contract(code) => {
                w.write_i32(0);
                w.write_u32(*code);
            }
            ScError::Host { error_type, code } => {
                w.write_i32(*error_type);
                w.write_i32(*code);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        match r.read_i32()? {
            0 => Ok(ScError::Contract(r.read_u32()?)),
            error_type @ 1..=9 => match r.read_i32()? {
                code @ 0..=9 => Ok(ScError::Host { error_type, code }),
                value => Err(invalid_discriminant("SCErrorCode", value)),
            },
            value => Err(invalid_discriminant("SCErrorType", value)),
        }
    }
}

/// One entry of an [`ScVal::Map`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScMapEntry {
    pub key: ScVal,
    pub val: ScVal,
}

impl XdrCodec for ScMapEntry {
    fn encode(&self, w: &mut XdrWriter) {
        self.key.encode(w);
        self.val.encode(w);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(Self {
            key: ScVal::decode(r)?,
            val: ScVal::decode(r)?,
        })
    }
}

/// A deployed contract's executable and instance storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScContractInstance {
    pub executable: ContractExecutable,
    pub storage: Option<Vec<ScMapEntry>>,
}

/// A contract value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScVal {
    Bool(bool),
    Void,
    Error(ScError),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    Timepoint(u64),
    Duration(u64),
    U128(u128),
    I128(i128),
    /// Big-endian 256-bit unsigned integer.
    U256([u8; 32]),
    /// Big-endian 256-bit two's-complement integer.
    I256([u8; 32]),
    Bytes(Vec<u8>),
    String(Vec<u8>),
    Symbol(String),
    Vec(Option<Vec<ScVal>>),
    Map(Option<Vec<ScMapEntry>>),
    Address(ScAddress),
    ContractInstance(ScContractInstance),
    LedgerKeyContractInstance,
    LedgerKeyNonce(i64),
}

impl ScVal {
    /// A symbol: at most 32 characters from `[a-zA-Z0-9_]`.
    pub fn symbol(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if s.len() > SC_SYMBOL_MAX
            || !s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            return Err(Error::InvalidValue(format!("invalid symbol {s:?}")));
        }
        Ok(ScVal::Symbol(s))
    }

    pub fn string(s: impl Into<String>) -> Self {
        ScVal::String(s.into().into_bytes())
    }

    fn discriminant(&self) -> i32 {
        match self {
            ScVal::Bool(_) => 0,
            ScVal::Void => 1,
            ScVal::Error(_) => 2,
            ScVal::U32(_) => 3,
            ScVal::I32(_) => 4,
            ScVal::U64(_) => 5,
            ScVal::I64(_) => 6,
            ScVal::Timepoint(_) => 7,
            ScVal::Duration(_) => 8,
            ScVal::U128(_) => 9,
            ScVal::I128(_) => 10,
            ScVal::U256(_) => 11,
            ScVal::I256(_) => 12,
            ScVal::Bytes(_) => 13,
            ScVal::String(_) => 14,
            ScVal::Symbol(_) => 15,
            ScVal::Vec(_) => 16,
            ScVal::Map(_) => 17,
            ScVal::Address(_) => 18,
            ScVal::ContractInstance(_) => 19,
            ScVal::LedgerKeyContractInstance => 20,
            ScVal::LedgerKeyNonce(_) => 21,
        }
    }
}

impl From<ScAddress> for ScVal {
    fn from(address: ScAddress) -> Self {
        ScVal::Address(address)
    }
}

impl XdrCodec for ScVal {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(self.discriminant());
        match self {
            ScVal::Bool(b) => w.write_bool(*b),
            ScVal::Void | ScVal::LedgerKeyContractInstance => {}
            ScVal::Error(e) => e.encode(w),
            ScVal::U32(v) => w.write_u32(*v),
            ScVal::I32(v) => w.write_i32(*v),
            ScVal::U64(v) | ScVal::Timepoint(v) | ScVal::Duration(v) => w.write_u64(*v),
            ScVal::I64(v) | ScVal::LedgerKeyNonce(v) => w.write_i64(*v),
            ScVal::U128(v) => {
                w.write_u64((*v >> 64) as u64);
                w.write_u64(*v as u64);
            }
            ScVal::I128(v) => {
                w.write_i64((*v >> 64) as i64);
                w.write_u64(*v as u64);
            }
            ScVal::U256(bytes) | ScVal::I256(bytes) => w.write_fixed_opaque(bytes),
            ScVal::Bytes(bytes) | ScVal::String(bytes) => w.write_var_opaque(bytes),
            ScVal::Symbol(s) => w.write_var_opaque(s.as_bytes()),
            ScVal::Vec(items) => {
                w.write_bool(items.is_some());
                if let Some(items) = items {
                    w.write_array(items);
                }
            }
            ScVal::Map(entries) => {
                w.write_bool(entries.is_some());
                if let Some(entries) = entries {
                    w.write_array(entries);
                }
            }
            ScVal::Address(address) => address.encode(w),
            ScVal::ContractInstance(instance) => {
                instance.executable.encode(w);
                w.write_bool(instance.storage.is_some());
                if let Some(storage) = &instance.storage {
                    w.write_array(storage);
                }
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(match r.read_i32()? {
            0 => ScVal::Bool(r.read_bool()?),
            1 => ScVal::Void,
            2 => ScVal::Error(ScError::decode(r)?),
            3 => ScVal::U32(r.read_u32()?),
            4 => ScVal::I32(r.read_i32()?),
            5 => ScVal::U64(r.read_u64()?),
            6 => ScVal::I64(r.read_i64()?),
            7 => ScVal::Timepoint(r.read_u64()?),
            8 => ScVal::Duration(r.read_u64()?),
            9 => {
                let hi = r.read_u64()?;
                let lo = r.read_u64()?;
                ScVal::U128((u128::from(hi) << 64) | u128::from(lo))
            }
            10 => {
                let hi = r.read_i64()?;
                let lo = r.read_u64()?;
                ScVal::I128((i128::from(hi) << 64) | i128::from(lo))
            }
            11 => ScVal::U256(r.read_fixed::<32>()?),
            12 => ScVal::I256(r.read_fixed::<32>()?),
            13 => ScVal::Bytes(r.read_var_opaque(UNBOUNDED, "SCBytes")?),
            14 => ScVal::String(r.read_var_opaque(UNBOUNDED, "SCString")?),
            15 => ScVal::Symbol(read_symbol(r)?),
            16 => ScVal::Vec(if r.read_bool()? {
                Some(read_nested_array(r, "SCVec")?)
            } else {
                None
            }),
            17 => ScVal::Map(if r.read_bool()? {
                Some(read_nested_array(r, "SCMap")?)
            } else {
                None
            }),
            18 => ScVal::Address(ScAddress::decode(r)?),
            19 => {
                let executable = ContractExecutable::decode(r)?;
                let storage = if r.read_bool()? {
                    Some(read_nested_array(r, "SCMap")?)
                } else {
                    None
                };
                ScVal::ContractInstance(ScContractInstance {
                    executable,
                    storage,
                })
            }
            20 => ScVal::LedgerKeyContractInstance,
            21 => ScVal::LedgerKeyNonce(r.read_i64()?),
            value => return Err(invalid_discriminant("SCValType", value)),
        })
    }
}

// ---------------------------------------------------------------------------
// Host functions
// ---------------------------------------------------------------------------

/// What a contract instance runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContractExecutable {
    /// Hash of uploaded wasm code.
    Wasm([u8; 32]),
    /// The built-in token contract for a classic asset.
    StellarAsset,
}

impl XdrCodec for ContractExecutable {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            ContractExecutable::Wasm(hash) => {
                w.write_i32(0);
                w.write_fixed_opaque(hash);
            }
            ContractExecutable::StellarAsset => w.write_i32(1),
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        match r.read_i32()? {
            0 => Ok(ContractExecutable::Wasm(r.read_fixed::<32>()?)),
            1 => Ok(ContractExecutable::StellarAsset),
            value => Err(invalid_discriminant("ContractExecutableType", value)),
        }
    }
}

/// Input from which a new contract's id is derived.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContractIdPreimage {
    Address { address: ScAddress, salt: [u8; 32] },
    Asset(Asset),
}

impl XdrCodec for ContractIdPreimage {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            ContractIdPreimage::Address { address, salt } => {
                w.write_i32(0);
                address.encode(w);
                w.write_fixed_opaque(salt);
            }
            ContractIdPreimage::Asset(asset) => {
                w.write_i32(1);
                asset.encode(w);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        match r.read_i32()? {
            0 => Ok(ContractIdPreimage::Address {
                address: ScAddress::decode(r)?,
                salt: r.read_fixed::<32>()?,
            }),
            1 => Ok(ContractIdPreimage::Asset(Asset::decode(r)?)),
            value => Err(invalid_discriminant("ContractIDPreimageType", value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvokeContractArgs {
    pub contract_address: ScAddress,
    pub function_name: String,
    pub args: Vec<ScVal>,
}

impl XdrCodec for InvokeContractArgs {
    fn encode(&self, w: &mut XdrWriter) {
        self.contract_address.encode(w);
        w.write_var_opaque(self.function_name.as_bytes());
        w.write_array(&self.args);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(Self {
            contract_address: ScAddress::decode(r)?,
            function_name: read_symbol(r)?,
            args: read_nested_array(r, "args")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CreateContractArgs {
    pub preimage: ContractIdPreimage,
    pub executable: ContractExecutable,
}

impl XdrCodec for CreateContractArgs {
    fn encode(&self, w: &mut XdrWriter) {
        self.preimage.encode(w);
        self.executable.encode(w);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(Self {
            preimage: ContractIdPreimage::decode(r)?,
            executable: ContractExecutable::decode(r)?,
        })
    }
}

/// Contract creation with constructor arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CreateContractArgsV2 {
    pub preimage: ContractIdPreimage,
    pub executable: ContractExecutable,
    pub constructor_args: Vec<ScVal>,
}

impl XdrCodec for CreateContractArgsV2 {
    fn encode(&self, w: &mut XdrWriter) {
        self.preimage.encode(w);
        self.executable.encode(w);
        w.write_array(&self.constructor_args);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(Self {
            preimage: ContractIdPreimage::decode(r)?,
            executable: ContractExecutable::decode(r)?,
            constructor_args: read_nested_array(r, "constructorArgs")?,
        })
    }
}

/// The body of an `InvokeHostFunction` operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostFunction {
    InvokeContract(InvokeContractArgs),
    CreateContract(CreateContractArgs),
    UploadWasm(Vec<u8>),
    CreateContractV2(CreateContractArgsV2),
}

impl XdrCodec for HostFunction {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            HostFunction::InvokeContract(args) => {
                w.write_i32(0);
                args.encode(w);
            }
            HostFunction::CreateContract(args) => {
                w.write_i32(1);
                args.encode(w);
            }
            HostFunction::UploadWasm(wasm) => {
                w.write_i32(2);
                w.write_var_opaque(wasm);
            }
            HostFunction::CreateContractV2(args) => {
                w.write_i32(3);
                args.encode(w);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        match r.read_i32()? {
            0 => Ok(HostFunction::InvokeContract(InvokeContractArgs::decode(r)?)),
            1 => Ok(HostFunction::CreateContract(CreateContractArgs::decode(r)?)),
            2 => Ok(HostFunction::UploadWasm(r.read_var_opaque(UNBOUNDED, "wasm")?)),
            3 => Ok(HostFunction::CreateContractV2(CreateContractArgsV2::decode(r)?)),
            value => Err(invalid_discriminant("HostFunctionType", value)),
        }
    }
}

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SorobanAddressCredentials {
    pub address: ScAddress,
    pub nonce: i64,
    pub signature_expiration_ledger: u32,
    pub signature: ScVal,
}

/// Who authorizes an invocation tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SorobanCredentials {
    /// The transaction source's signature covers it.
    SourceAccount,
    Address(SorobanAddressCredentials),
}

impl XdrCodec for SorobanCredentials {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            SorobanCredentials::SourceAccount => w.write_i32(0),
            SorobanCredentials::Address(creds) => {
                w.write_i32(1);
                creds.address.encode(w);
                w.write_i64(creds.nonce);
                w.write_u32(creds.signature_expiration_ledger);
                creds.signature.encode(w);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        match r.read_i32()? {
            0 => Ok(SorobanCredentials::SourceAccount),
            1 => Ok(SorobanCredentials::Address(SorobanAddressCredentials {
                address: ScAddress::decode(r)?,
                nonce: r.read_i64()?,
                signature_expiration_ledger: r.read_u32()?,
                signature: ScVal::decode(r)?,
            })),
            value => Err(invalid_discriminant("SorobanCredentialsType", value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SorobanAuthorizedFunction {
    ContractFn(InvokeContractArgs),
    CreateContractHostFn(CreateContractArgs),
    CreateContractV2HostFn(CreateContractArgsV2),
}

impl XdrCodec for SorobanAuthorizedFunction {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            SorobanAuthorizedFunction::ContractFn(args) => {
                w.write_i32(0);
                args.encode(w);
            }
            SorobanAuthorizedFunction::CreateContractHostFn(args) => {
                w.write_i32(1);
                args.encode(w);
            }
            SorobanAuthorizedFunction::CreateContractV2HostFn(args) => {
                w.write_i32(2);
                args.encode(w);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        match r.read_i32()? {
            0 => Ok(SorobanAuthorizedFunction::ContractFn(
                InvokeContractArgs::decode(r)?,
            )),
            1 => Ok(SorobanAuthorizedFunction::CreateContractHostFn(
                CreateContractArgs::decode(r)?,
            )),
            2 => Ok(SorobanAuthorizedFunction::CreateContractV2HostFn(
                CreateContractArgsV2::decode(r)?,
            )),
            value => Err(invalid_discriminant("SorobanAuthorizedFunctionType", value)),
        }
    }
}

/// A node in the tree of calls an authorization entry covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SorobanAuthorizedInvocation {
    pub function: SorobanAuthorizedFunction,
    pub sub_invocations: Vec<SorobanAuthorizedInvocation>,
}

impl XdrCodec for SorobanAuthorizedInvocation {
    fn encode(&self, w: &mut XdrWriter) {
        self.function.encode(w);
        w.write_array(&self.sub_invocations);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(Self {
            function: SorobanAuthorizedFunction::decode(r)?,
            sub_invocations: read_nested_array(r, "subInvocations")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SorobanAuthorizationEntry {
    pub credentials: SorobanCredentials,
    pub root_invocation: SorobanAuthorizedInvocation,
}

impl XdrCodec for SorobanAuthorizationEntry {
    fn encode(&self, w: &mut XdrWriter) {
        self.credentials.encode(w);
        self.root_invocation.encode(w);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(Self {
            credentials: SorobanCredentials::decode(r)?,
            root_invocation: SorobanAuthorizedInvocation::decode(r)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Transaction extension
// ---------------------------------------------------------------------------

/// Ledger keys a contract transaction may read and write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LedgerFootprint {
    pub read_only: Vec<LedgerKey>,
    pub read_write: Vec<LedgerKey>,
}

impl XdrCodec for LedgerFootprint {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_array(&self.read_only);
        w.write_array(&self.read_write);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(Self {
            read_only: r.read_array(UNBOUNDED, "readOnly")?,
            read_write: r.read_array(UNBOUNDED, "readWrite")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SorobanResources {
    pub footprint: LedgerFootprint,
    pub instructions: u32,
    pub disk_read_bytes: u32,
    pub write_bytes: u32,
}

impl XdrCodec for SorobanResources {
    fn encode(&self, w: &mut XdrWriter) {
        self.footprint.encode(w);
        w.write_u32(self.instructions);
        w.write_u32(self.disk_read_bytes);
        w.write_u32(self.write_bytes);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(Self {
            footprint: LedgerFootprint::decode(r)?,
            instructions: r.read_u32()?,
            disk_read_bytes: r.read_u32()?,
            write_bytes: r.read_u32()?,
        })
    }
}

/// Resource declaration attached to a contract transaction, normally
/// produced by the fee oracle's prepare (simulation) step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SorobanTransactionData {
    /// Indices into the footprint of archived entries to restore
    /// automatically. `None` encodes the v0 extension.
    pub archived_soroban_entries: Option<Vec<u32>>,
    pub resources: SorobanResources,
    /// Fee reserved for resource consumption, in stroops.
    pub resource_fee: i64,
}

impl XdrCodec for SorobanTransactionData {
    fn encode(&self, w: &mut XdrWriter) {
        match &self.archived_soroban_entries {
            None => w.write_i32(0),
            Some(entries) => {
                w.write_i32(1);
                w.write_array(entries);
            }
        }
        self.resources.encode(w);
        w.write_i64(self.resource_fee);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        let archived_soroban_entries = match r.read_i32()? {
            0 => None,
            1 => Some(r.read_array(UNBOUNDED, "archivedSorobanEntries")?),
            value => return Err(invalid_discriminant("SorobanTransactionDataExt", value)),
        };
        Ok(Self {
            archived_soroban_entries,
            resources: SorobanResources::decode(r)?,
            resource_fee: r.read_i64()?,
        })
    }
}
