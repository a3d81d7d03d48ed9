//! Default access and anonymous group methods on DynSecClient.

use serde_json::json;

use super::{require, DynSecClient};
use crate::commands::CommandName;
use crate::types::{AnonymousGroupResponse, DefaultAclAccess, DefaultAclAccessList};
use crate::Result;

impl DynSecClient {
    // ========================================
    // General
    // ========================================

    /// Get the default ACL access rules.
    pub async fn get_default_acl_access(&self) -> Result<DefaultAclAccessList> {
        self.invoke(CommandName::GetDefaultAclAccess, &json!({})).await
    }

    /// Set one or more default ACL access rules.
    pub async fn set_default_acl_access(&self, acls: &[DefaultAclAccess]) -> Result<()> {
        self.invoke_void(CommandName::SetDefaultAclAccess, &json!({ "acls": acls }))
            .await
    }

    /// Get the group anonymous clients are placed in.
    pub async fn get_anonymous_group(&self) -> Result<AnonymousGroupResponse> {
        self.invoke(CommandName::GetAnonymousGroup, &json!({})).await
    }

    /// Set the group anonymous clients are placed in.
    pub async fn set_anonymous_group(&self, groupname: &str) -> Result<()> {
        require("groupname", groupname)?;
        self.invoke_void(CommandName::SetAnonymousGroup, &json!({ "groupname": groupname }))
            .await
    }
}
