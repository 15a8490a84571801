//! Role resolution over the three registries.

use merchfund_common::contracts::{admin_registry, designer_registry, ngo_registry};
use merchfund_common::{Address, Token};

use crate::errors::Result;
use crate::marketplace::Marketplace;
use crate::records::{decode_flag, RoleFlags};

impl Marketplace {
    /// Read admin, NGO and designer flags for `account`.
    ///
    /// Three sequential reads; the first failure propagates. Nothing is
    /// cached, so repeated calls always reflect the ledger.
    pub async fn resolve_roles(&self, account: Address) -> Result<RoleFlags> {
        let arg = [Token::Address(account)];

        let is_admin = self
            .chain
            .read(self.contracts.admin_registry, &admin_registry::IS_ADMIN, &arg)
            .await?;
        let is_ngo = self
            .chain
            .read(self.contracts.ngo_registry, &ngo_registry::IS_VERIFIED_NGO, &arg)
            .await?;
        let is_designer = self
            .chain
            .read(
                self.contracts.designer_registry,
                &designer_registry::IS_VERIFIED_DESIGNER,
                &arg,
            )
            .await?;

        Ok(RoleFlags {
            is_admin: decode_flag(is_admin, "isAdmin")?,
            is_ngo: decode_flag(is_ngo, "isVerifiedNgo")?,
            is_designer: decode_flag(is_designer, "isVerifiedDesigner")?,
        })
    }
}
