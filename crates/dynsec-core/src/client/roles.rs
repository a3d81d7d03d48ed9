//! Role and ACL methods on DynSecClient.

use serde_json::json;

use super::{require, DynSecClient};
use crate::commands::CommandName;
use crate::types::{
    AclType, AddRoleAclRequest, CreateRoleRequest, GetRoleResponse, ListRequest, ListRolesResponse,
    RemoveRoleAclRequest, RoleInfo,
};
use crate::Result;

impl DynSecClient {
    // ========================================
    // Roles
    // ========================================

    pub async fn create_role(&self, request: &CreateRoleRequest) -> Result<()> {
        require("rolename", &request.rolename)?;
        for acl in &request.acls {
            require("topic", &acl.topic)?;
        }
        self.invoke_void(CommandName::CreateRole, request).await
    }

    pub async fn delete_role(&self, rolename: &str) -> Result<()> {
        require("rolename", rolename)?;
        self.invoke_void(CommandName::DeleteRole, &json!({ "rolename": rolename }))
            .await
    }

    pub async fn add_role_acl(&self, request: &AddRoleAclRequest) -> Result<()> {
        require("rolename", &request.rolename)?;
        require("topic", &request.acl.topic)?;
        self.invoke_void(CommandName::AddRoleAcl, request).await
    }

    pub async fn remove_role_acl(&self, rolename: &str, acltype: AclType, topic: &str) -> Result<()> {
        require("rolename", rolename)?;
        require("topic", topic)?;
        self.invoke_void(
            CommandName::RemoveRoleAcl,
            &RemoveRoleAclRequest::new(rolename, acltype, topic),
        )
        .await
    }

    pub async fn get_role(&self, rolename: &str) -> Result<RoleInfo> {
        require("rolename", rolename)?;
        let response: GetRoleResponse = self
            .invoke(CommandName::GetRole, &json!({ "rolename": rolename }))
            .await?;
        Ok(response.role)
    }

    pub async fn list_roles(&self, request: ListRequest) -> Result<ListRolesResponse> {
        self.invoke(CommandName::ListRoles, &request).await
    }
}
