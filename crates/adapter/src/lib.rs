//! # merchfund Domain Adapter
//!
//! Business operations of the donation and merchandise marketplace on top of
//! the chain call layer.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `marketplace` | [`Marketplace`] client object, reads, admin actions |
//! | `campaign` | campaign creation protocol and id resolution tiers |
//! | `design` | design creation with file re-registration retry |
//! | `donation` | donations, active-campaign pre-flight |
//! | `purchase` | single and batch design purchases |
//! | `roles` | role resolution |
//! | `records` | canonical records and their decoders |
//! | `translate` | revert to [`ErrorKind`] rules |
//! | `errors` | [`AdapterError`], [`ErrorKind`] |
//! | `registrar` | [`HashRegistrar`]: direct and relayer-backed |
//!
//! ## Error Flow
//!
//! ```text
//! ChainError::Write(RevertData) ──► translate() ──► AdapterError::Rejected(kind)
//! ChainError::Read(..)          ──────────────────► AdapterError::Chain(..)
//! ```
//!
//! Every [`AdapterError`] maps to a fixed user message via
//! [`AdapterError::user_message`].

pub mod campaign;
pub mod design;
pub mod donation;
pub mod errors;
pub mod marketplace;
pub mod purchase;
pub mod records;
pub mod registrar;
pub mod roles;
pub mod translate;

pub use campaign::{CampaignCreation, IdSource, NewCampaign};
pub use design::{DesignCreation, NewDesign};
pub use errors::{AdapterError, ErrorKind};
pub use marketplace::{AdapterConfig, Marketplace};
pub use purchase::{BatchMode, BatchPurchase};
pub use records::{Campaign, Design, DonationRecord, RoleFlags};
pub use registrar::{DirectRegistrar, HashRegistrar, Registration, RegistrarError, RelayerRegistrar};
pub use translate::{translate, translate_chain_error};
