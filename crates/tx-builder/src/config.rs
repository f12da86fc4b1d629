use bitcoin::{Address, Network, address::NetworkUnchecked, secp256k1::XOnlyPublicKey};
use tapstake_coin_select::FeeModel;
use tapstake_params::ProtocolParams;
use tapstake_primitives::{Utxo, ValidationError, validate_address, validate_fee_rate};

/// Settings shared by every builder call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildConfig {
    /// Network that caller-supplied addresses must belong to.
    pub network: Network,
    /// Fee rate in sat/vB.
    pub fee_rate: u64,
    pub fee_model: FeeModel,
}

impl BuildConfig {
    pub fn new(network: Network, fee_rate: u64) -> Self {
        Self {
            network,
            fee_rate,
            fee_model: FeeModel::default(),
        }
    }

    /// Network and fee model of a deployment, at the given fee rate.
    pub fn from_params(params: &ProtocolParams, fee_rate: u64) -> Self {
        Self {
            network: params.network,
            fee_rate,
            fee_model: params.fee_model,
        }
    }

    pub fn with_fee_model(mut self, fee_model: FeeModel) -> Self {
        self.fee_model = fee_model;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        validate_fee_rate(self.fee_rate)?;
        Ok(())
    }

    pub(crate) fn check_address(
        &self,
        address: &Address<NetworkUnchecked>,
    ) -> Result<Address, ValidationError> {
        validate_address(address, self.network)
    }
}

/// Wallet-side funds available to a funding transaction.
#[derive(Debug, Clone, Copy)]
pub struct FundingSource<'a> {
    pub utxos: &'a [Utxo],
    /// Where change goes.
    pub change_address: &'a Address<NetworkUnchecked>,
    /// Internal key of the wallet's key-path P2TR outputs, if it has any.
    pub tap_internal_key: Option<XOnlyPublicKey>,
}

impl<'a> FundingSource<'a> {
    pub fn new(utxos: &'a [Utxo], change_address: &'a Address<NetworkUnchecked>) -> Self {
        Self {
            utxos,
            change_address,
            tap_internal_key: None,
        }
    }

    pub fn with_tap_internal_key(mut self, key: XOnlyPublicKey) -> Self {
        self.tap_internal_key = Some(key);
        self
    }
}
