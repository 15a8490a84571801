//! # Contract Catalogue
//!
//! Function and event descriptors for the seven marketplace contracts.
//! Addresses are supplied at runtime through [`ContractAddresses`].
//!
//! ## Contracts
//!
//! | Module | Contract |
//! |--------|----------|
//! | [`campaign_registry`] | CampaignRegistry |
//! | [`donation_vault`] | DonationVault |
//! | [`design_marketplace`] | DesignMarketplace |
//! | [`file_registry`] | FileRegistry |
//! | [`admin_registry`] | AdminRegistry |
//! | [`ngo_registry`] | NgoRegistry |
//! | [`designer_registry`] | DesignerRegistry |

use serde::{Deserialize, Serialize};

use crate::abi::{Event, EventParam, Function, ParamType};
use crate::types::Address;

/// Deployed contract addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContractAddresses {
    pub campaign_registry: Address,
    pub donation_vault: Address,
    pub design_marketplace: Address,
    pub file_registry: Address,
    pub admin_registry: Address,
    pub ngo_registry: Address,
    pub designer_registry: Address,
}

impl ContractAddresses {
    /// Names of fields still set to the zero address.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("campaign_registry", self.campaign_registry),
            ("donation_vault", self.donation_vault),
            ("design_marketplace", self.design_marketplace),
            ("file_registry", self.file_registry),
            ("admin_registry", self.admin_registry),
            ("ngo_registry", self.ngo_registry),
            ("designer_registry", self.designer_registry),
        ]
        .into_iter()
        .filter(|(_, addr)| addr.is_zero())
        .map(|(name, _)| name)
        .collect()
    }
}

pub mod campaign_registry {
    use super::*;

    const CAMPAIGN_FIELDS: &[ParamType] = &[
        ParamType::Uint,
        ParamType::String,
        ParamType::String,
        ParamType::Uint,
        ParamType::Address,
        ParamType::Address,
        ParamType::Bool,
    ];

    /// `(id, title, description, goal, beneficiary, designer, active)`
    pub const CAMPAIGN_TUPLE: ParamType = ParamType::Tuple(CAMPAIGN_FIELDS);

    pub const CREATE_CAMPAIGN: Function = Function {
        name: "createCampaign",
        inputs: &[
            ParamType::String,
            ParamType::String,
            ParamType::Uint,
            ParamType::Address,
            ParamType::Address,
        ],
        outputs: &[ParamType::Uint],
    };

    pub const CAMPAIGN_COUNT: Function = Function {
        name: "campaignCount",
        inputs: &[],
        outputs: &[ParamType::Uint],
    };

    pub const GET_CAMPAIGN: Function = Function {
        name: "getCampaign",
        inputs: &[ParamType::Uint],
        outputs: &[CAMPAIGN_TUPLE],
    };

    pub const GET_ACTIVE_CAMPAIGNS: Function = Function {
        name: "getActiveCampaigns",
        inputs: &[],
        outputs: &[ParamType::Array(&ParamType::Uint)],
    };

    pub const DEACTIVATE_CAMPAIGN: Function = Function {
        name: "deactivateCampaign",
        inputs: &[ParamType::Uint],
        outputs: &[],
    };

    pub const CAMPAIGN_CREATED: Event = Event {
        name: "CampaignCreated",
        params: &[
            EventParam { ty: ParamType::Uint, indexed: true },
            EventParam { ty: ParamType::Address, indexed: true },
            EventParam { ty: ParamType::String, indexed: false },
            EventParam { ty: ParamType::Uint, indexed: false },
        ],
    };
}

pub mod donation_vault {
    use super::*;

    const DONATION_FIELDS: &[ParamType] = &[
        ParamType::Address,
        ParamType::Uint,
        ParamType::Uint,
        ParamType::Uint,
        ParamType::Uint,
    ];

    /// `(donor, campaignId, amount, timestamp, serial)`
    pub const DONATION_TUPLE: ParamType = ParamType::Tuple(DONATION_FIELDS);

    pub const DONATE: Function = Function {
        name: "donate",
        inputs: &[ParamType::Uint],
        outputs: &[],
    };

    pub const GET_CAMPAIGN_DONATIONS: Function = Function {
        name: "getCampaignDonations",
        inputs: &[ParamType::Uint],
        outputs: &[ParamType::Array(&DONATION_TUPLE)],
    };
}

pub mod design_marketplace {
    use super::*;

    const DESIGN_FIELDS: &[ParamType] = &[
        ParamType::Uint,
        ParamType::Uint,
        ParamType::Address,
        ParamType::String,
        ParamType::Uint,
        ParamType::String,
        ParamType::String,
        ParamType::Bool,
    ];

    /// `(id, campaignId, owner, name, price, fileCid, previewCid, active)`
    pub const DESIGN_TUPLE: ParamType = ParamType::Tuple(DESIGN_FIELDS);

    pub const CREATE_DESIGN: Function = Function {
        name: "createDesign",
        inputs: &[
            ParamType::Uint,
            ParamType::String,
            ParamType::Uint,
            ParamType::String,
            ParamType::String,
        ],
        outputs: &[ParamType::Uint],
    };

    pub const DESIGN_COUNT: Function = Function {
        name: "designCount",
        inputs: &[],
        outputs: &[ParamType::Uint],
    };

    pub const GET_DESIGN: Function = Function {
        name: "getDesign",
        inputs: &[ParamType::Uint],
        outputs: &[DESIGN_TUPLE],
    };

    pub const PURCHASE_DESIGN: Function = Function {
        name: "purchaseDesign",
        inputs: &[ParamType::Uint],
        outputs: &[],
    };

    pub const PURCHASE_DESIGNS: Function = Function {
        name: "purchaseDesigns",
        inputs: &[ParamType::Array(&ParamType::Uint)],
        outputs: &[],
    };

    pub const DEACTIVATE_DESIGN: Function = Function {
        name: "deactivateDesign",
        inputs: &[ParamType::Uint],
        outputs: &[],
    };

    pub const DESIGN_CREATED: Event = Event {
        name: "DesignCreated",
        params: &[
            EventParam { ty: ParamType::Uint, indexed: true },
            EventParam { ty: ParamType::Uint, indexed: true },
            EventParam { ty: ParamType::Address, indexed: false },
        ],
    };
}

pub mod file_registry {
    use super::*;

    pub const STORE_FILE_HASH: Function = Function {
        name: "storeFileHash",
        inputs: &[ParamType::String, ParamType::Address],
        outputs: &[],
    };

    pub const VERIFY_FILE: Function = Function {
        name: "verifyFile",
        inputs: &[ParamType::String],
        outputs: &[ParamType::Bool],
    };
}

pub mod admin_registry {
    use super::*;

    pub const IS_ADMIN: Function = Function {
        name: "isAdmin",
        inputs: &[ParamType::Address],
        outputs: &[ParamType::Bool],
    };

    pub const ADD_ADMIN: Function = Function {
        name: "addAdmin",
        inputs: &[ParamType::Address],
        outputs: &[],
    };
}

pub mod ngo_registry {
    use super::*;

    pub const IS_VERIFIED_NGO: Function = Function {
        name: "isVerifiedNgo",
        inputs: &[ParamType::Address],
        outputs: &[ParamType::Bool],
    };

    pub const VERIFY_NGO: Function = Function {
        name: "verifyNgo",
        inputs: &[ParamType::Address],
        outputs: &[],
    };
}

pub mod designer_registry {
    use super::*;

    pub const IS_VERIFIED_DESIGNER: Function = Function {
        name: "isVerifiedDesigner",
        inputs: &[ParamType::Address],
        outputs: &[ParamType::Bool],
    };

    pub const VERIFY_DESIGNER: Function = Function {
        name: "verifyDesigner",
        inputs: &[ParamType::Address],
        outputs: &[],
    };
}
