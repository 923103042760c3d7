//! # Assets
//!
//! The network's asset model is a three-way tagged union:
//!
//! ```text
//! Asset = NATIVE                                   i32 0
//!       | ALPHANUM4  { code[4],  issuer PublicKey } i32 1
//!       | ALPHANUM12 { code[12], issuer PublicKey } i32 2
//! ```
//!
//! Codes are NUL-padded to their fixed width on the wire and stripped on
//! decode. Length bounds (1..=4 and 5..=12) are enforced when an asset is
//! constructed, so an `Asset` value is always encodable.
//!
//! Assets are totally ordered (native < alphanum4 < alphanum12, then code,
//! then issuer) so balance queries can be sorted and de-duplicated.
//!
//! Trustlines and trust changes extend the union with liquidity-pool shares;
//! those live in [`TrustLineAsset`] and [`ChangeTrustAsset`] so a plain
//! `Asset` can never be a pool share.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::address::{AccountId, ContractId};
use crate::config::{NetworkId, ENVELOPE_TYPE_CONTRACT_ID};
use crate::crypto::hash::sha256_array;
use crate::crypto::strkey::{self, Version};
use crate::error::{Error, Result};
use crate::xdr::{XdrCodec, XdrError, XdrReader, XdrWriter};

const ASSET_TYPE_NATIVE: i32 = 0;
const ASSET_TYPE_CREDIT_ALPHANUM4: i32 = 1;
const ASSET_TYPE_CREDIT_ALPHANUM12: i32 = 2;
const ASSET_TYPE_POOL_SHARE: i32 = 3;

const CONTRACT_ID_PREIMAGE_FROM_ASSET: i32 = 1;
const LIQUIDITY_POOL_CONSTANT_PRODUCT: i32 = 0;

/// Fee of the only pool type the network offers, in basis points.
pub const LIQUIDITY_POOL_FEE_V18: i32 = 30;

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// A native or issued asset.
///
/// Codes are held as [`AssetCode4`] / [`AssetCode12`], which can only be
/// obtained through validation, so every `Asset` value is encodable.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Asset {
    Native,
    AlphaNum4 { code: AssetCode4, issuer: AccountId },
    AlphaNum12 { code: AssetCode12, issuer: AccountId },
}

fn validate_code(kind: &'static str, code: &str, min: usize, max: usize) -> Result<()> {
    if code.len() < min || code.len() > max {
        return Err(Error::CodeLengthOutOfRange {
            kind,
            len: code.len(),
            min,
            max,
        });
    }
    if !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(Error::InvalidAssetCode(code.to_string()));
    }
    Ok(())
}

/// Strips the NUL padding of a wire code. Anything left that is not ASCII
/// alphanumeric fails validation afterwards, so no byte is ever dropped or
/// replaced.
fn strip_code(raw: &[u8]) -> Result<String> {
    let end = raw.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    String::from_utf8(raw[..end].to_vec())
        .map_err(|_| Error::InvalidAssetCode(hex::encode(&raw[..end])))
}

/// A 1-4 character alphanumeric asset code.
///
/// ```compile_fail
/// use stellar_custody::asset::AssetCode4;
/// let code = AssetCode4("TOOLONG".to_string());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetCode4(String);

impl AssetCode4 {
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        validate_code("alphanum4", &code, 1, 4)?;
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The NUL-padded wire form.
    pub fn to_padded(&self) -> [u8; 4] {
        let mut out = [0u8; 4];
        out[..self.0.len()].copy_from_slice(self.0.as_bytes());
        out
    }

    pub fn from_padded(raw: &[u8; 4]) -> Result<Self> {
        Self::new(strip_code(raw)?)
    }
}

/// A 5-12 character alphanumeric asset code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetCode12(String);

impl AssetCode12 {
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        validate_code("alphanum12", &code, 5, 12)?;
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_padded(&self) -> [u8; 12] {
        let mut out = [0u8; 12];
        out[..self.0.len()].copy_from_slice(self.0.as_bytes());
        out
    }

    pub fn from_padded(raw: &[u8; 12]) -> Result<Self> {
        Self::new(strip_code(raw)?)
    }
}

impl fmt::Display for AssetCode4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for AssetCode12 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Asset {
    pub fn native() -> Self {
        Asset::Native
    }

    /// An asset with a 1-4 character code.
    pub fn alphanum4(code: impl Into<String>, issuer: AccountId) -> Result<Self> {
        Ok(Asset::AlphaNum4 {
            code: AssetCode4::new(code)?,
            issuer,
        })
    }

    /// An asset with a 5-12 character code.
    pub fn alphanum12(code: impl Into<String>, issuer: AccountId) -> Result<Self> {
        Ok(Asset::AlphaNum12 {
            code: AssetCode12::new(code)?,
            issuer,
        })
    }

    /// Picks alphanum4 or alphanum12 from the code length.
    pub fn credit(code: impl Into<String>, issuer: AccountId) -> Result<Self> {
        let code = code.into();
        if code.len() <= 4 {
            Self::alphanum4(code, issuer)
        } else {
            Self::alphanum12(code, issuer)
        }
    }

    /// XDR discriminant.
    pub fn asset_type(&self) -> i32 {
        match self {
            Asset::Native => ASSET_TYPE_NATIVE,
            Asset::AlphaNum4 { .. } => ASSET_TYPE_CREDIT_ALPHANUM4,
            Asset::AlphaNum12 { .. } => ASSET_TYPE_CREDIT_ALPHANUM12,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native)
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            Asset::Native => None,
            Asset::AlphaNum4 { code, .. } => Some(code.as_str()),
            Asset::AlphaNum12 { code, .. } => Some(code.as_str()),
        }
    }

    pub fn issuer(&self) -> Option<&AccountId> {
        match self {
            Asset::Native => None,
            Asset::AlphaNum4 { issuer, .. } | Asset::AlphaNum12 { issuer, .. } => Some(issuer),
        }
    }

    /// Identifier of the asset's built-in token contract on `network`.
    ///
    /// `SHA-256(ENVELOPE_TYPE_CONTRACT_ID || network_id || FROM_ASSET || asset)`,
    /// which must match the network's own derivation exactly.
    pub fn contract_id(&self, network_id: &NetworkId) -> ContractId {
        let mut w = XdrWriter::with_capacity(96);
        w.write_i32(ENVELOPE_TYPE_CONTRACT_ID);
        w.write_fixed_opaque(network_id.as_bytes());
        w.write_i32(CONTRACT_ID_PREIMAGE_FROM_ASSET);
        self.encode(&mut w);
        ContractId(sha256_array(w.as_bytes()))
    }

    fn encode_body(&self, w: &mut XdrWriter) {
        match self {
            Asset::Native => {}
            Asset::AlphaNum4 { code, issuer } => {
                w.write_fixed_opaque(&code.to_padded());
                issuer.encode(w);
            }
            Asset::AlphaNum12 { code, issuer } => {
                w.write_fixed_opaque(&code.to_padded());
                issuer.encode(w);
            }
        }
    }

    /// Decodes the arm selected by an already-read discriminant.
    fn decode_body(asset_type: i32, r: &mut XdrReader<'_>) -> Result<Self> {
        match asset_type {
            ASSET_TYPE_NATIVE => Ok(Asset::Native),
            ASSET_TYPE_CREDIT_ALPHANUM4 => Ok(Asset::AlphaNum4 {
                code: AssetCode4::from_padded(&r.read_fixed::<4>()?)?,
                issuer: AccountId::decode(r)?,
            }),
            ASSET_TYPE_CREDIT_ALPHANUM12 => Ok(Asset::AlphaNum12 {
                code: AssetCode12::from_padded(&r.read_fixed::<12>()?)?,
                issuer: AccountId::decode(r)?,
            }),
            other => Err(Error::UnknownAssetType(other)),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Asset::Native => 0,
            Asset::AlphaNum4 { .. } => 1,
            Asset::AlphaNum12 { .. } => 2,
        }
    }
}

impl XdrCodec for Asset {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(self.asset_type());
        self.encode_body(w);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        let asset_type = r.read_i32()?;
        Self::decode_body(asset_type, r)
    }
}

impl Ord for Asset {
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind_rank()
            .cmp(&other.kind_rank())
            .then_with(|| self.code().cmp(&other.code()))
            .then_with(|| {
                self.issuer()
                    .map(AccountId::to_strkey)
                    .cmp(&other.issuer().map(AccountId::to_strkey))
            })
    }
}

impl PartialOrd for Asset {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => write!(f, "native"),
            Asset::AlphaNum4 { code, issuer } => write!(f, "{code}:{issuer}"),
            Asset::AlphaNum12 { code, issuer } => write!(f, "{code}:{issuer}"),
        }
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Asset({self})")
    }
}

/// Parses `native` / `XLM` or `CODE:ISSUER`.
impl FromStr for Asset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("native") || s == "XLM" {
            return Ok(Asset::Native);
        }
        let (code, issuer) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidValue(format!("expected CODE:ISSUER, got {s:?}")))?;
        Asset::credit(code, issuer.parse()?)
    }
}

impl Serialize for Asset {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Asset {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Liquidity pools
// ---------------------------------------------------------------------------

/// A liquidity pool id: SHA-256 of the pool's parameters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(pub [u8; 32]);

impl PoolId {
    pub fn to_strkey(&self) -> String {
        strkey::encode(Version::LiquidityPool, &self.0)
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoolId({})", hex::encode(self.0))
    }
}

impl XdrCodec for PoolId {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_fixed_opaque(&self.0);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(Self(r.read_fixed::<32>()?))
    }
}

/// Parameters of a constant-product pool. Assets must be in ascending
/// order (`asset_a < asset_b`) for the pool id to match the network's.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiquidityPoolParameters {
    ConstantProduct {
        asset_a: Asset,
        asset_b: Asset,
        fee: i32,
    },
}

impl LiquidityPoolParameters {
    /// Standard-fee pool over two assets, ordered as the network requires.
    pub fn constant_product(a: Asset, b: Asset) -> Self {
        let (asset_a, asset_b) = if a <= b { (a, b) } else { (b, a) };
        LiquidityPoolParameters::ConstantProduct {
            asset_a,
            asset_b,
            fee: LIQUIDITY_POOL_FEE_V18,
        }
    }

    pub fn pool_id(&self) -> PoolId {
        PoolId(sha256_array(&self.to_xdr()))
    }
}

impl XdrCodec for LiquidityPoolParameters {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            LiquidityPoolParameters::ConstantProduct {
                asset_a,
                asset_b,
                fee,
            } => {
                w.write_i32(LIQUIDITY_POOL_CONSTANT_PRODUCT);
                asset_a.encode(w);
                asset_b.encode(w);
                w.write_i32(*fee);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        match r.read_i32()? {
            LIQUIDITY_POOL_CONSTANT_PRODUCT => Ok(LiquidityPoolParameters::ConstantProduct {
                asset_a: Asset::decode(r)?,
                asset_b: Asset::decode(r)?,
                fee: r.read_i32()?,
            }),
            value => Err(XdrError::InvalidDiscriminant {
                type_name: "LiquidityPoolType",
                value,
            }
            .into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Trustline / ChangeTrust assets
// ---------------------------------------------------------------------------

/// The asset of a trustline: an issued asset or a pool share (by pool id).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrustLineAsset {
    Asset(Asset),
    PoolShare(PoolId),
}

impl From<Asset> for TrustLineAsset {
    fn from(asset: Asset) -> Self {
        TrustLineAsset::Asset(asset)
    }
}

impl XdrCodec for TrustLineAsset {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            TrustLineAsset::Asset(asset) => asset.encode(w),
            TrustLineAsset::PoolShare(pool_id) => {
                w.write_i32(ASSET_TYPE_POOL_SHARE);
                pool_id.encode(w);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        match r.read_i32()? {
            ASSET_TYPE_POOL_SHARE => Ok(TrustLineAsset::PoolShare(PoolId::decode(r)?)),
            other => Ok(TrustLineAsset::Asset(Asset::decode_body(other, r)?)),
        }
    }
}

/// The line of a change-trust operation: an issued asset or the full
/// parameters of a pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChangeTrustAsset {
    Asset(Asset),
    PoolShare(LiquidityPoolParameters),
}

impl From<Asset> for ChangeTrustAsset {
    fn from(asset: Asset) -> Self {
        ChangeTrustAsset::Asset(asset)
    }
}

impl XdrCodec for ChangeTrustAsset {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            ChangeTrustAsset::Asset(asset) => asset.encode(w),
            ChangeTrustAsset::PoolShare(params) => {
                w.write_i32(ASSET_TYPE_POOL_SHARE);
                params.encode(w);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        match r.read_i32()? {
            ASSET_TYPE_POOL_SHARE => Ok(ChangeTrustAsset::PoolShare(
                LiquidityPoolParameters::decode(r)?,
            )),
            other => Ok(ChangeTrustAsset::Asset(Asset::decode_body(other, r)?)),
        }
    }
}
