//! Group methods on DynSecClient.

use serde_json::json;

use super::{require, DynSecClient};
use crate::commands::CommandName;
use crate::types::{
    CreateGroupRequest, GetGroupResponse, GroupClientRequest, GroupInfo, GroupRoleRequest,
    ListGroupsResponse, ListRequest,
};
use crate::Result;

impl DynSecClient {
    // ========================================
    // Groups
    // ========================================

    pub async fn create_group(&self, request: &CreateGroupRequest) -> Result<()> {
        require("groupname", &request.groupname)?;
        self.invoke_void(CommandName::CreateGroup, request).await
    }

    pub async fn delete_group(&self, groupname: &str) -> Result<()> {
        require("groupname", groupname)?;
        self.invoke_void(CommandName::DeleteGroup, &json!({ "groupname": groupname }))
            .await
    }

    pub async fn add_group_role(&self, request: &GroupRoleRequest) -> Result<()> {
        require("groupname", &request.groupname)?;
        require("rolename", &request.rolename)?;
        self.invoke_void(CommandName::AddGroupRole, request).await
    }

    pub async fn remove_group_role(&self, groupname: &str, rolename: &str) -> Result<()> {
        require("groupname", groupname)?;
        require("rolename", rolename)?;
        self.invoke_void(CommandName::RemoveGroupRole, &GroupRoleRequest::new(groupname, rolename))
            .await
    }

    pub async fn add_group_client(&self, request: &GroupClientRequest) -> Result<()> {
        require("groupname", &request.groupname)?;
        require("username", &request.username)?;
        self.invoke_void(CommandName::AddGroupClient, request).await
    }

    pub async fn remove_group_client(&self, groupname: &str, username: &str) -> Result<()> {
        require("groupname", groupname)?;
        require("username", username)?;
        self.invoke_void(
            CommandName::RemoveGroupClient,
            &GroupClientRequest::new(groupname, username),
        )
        .await
    }

    pub async fn get_group(&self, groupname: &str) -> Result<GroupInfo> {
        require("groupname", groupname)?;
        let response: GetGroupResponse = self
            .invoke(CommandName::GetGroup, &json!({ "groupname": groupname }))
            .await?;
        Ok(response.group)
    }

    pub async fn list_groups(&self, request: ListRequest) -> Result<ListGroupsResponse> {
        self.invoke(CommandName::ListGroups, &request).await
    }
}
