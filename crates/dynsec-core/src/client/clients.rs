//! Client account methods on DynSecClient.

use serde_json::json;

use super::{require, DynSecClient};
use crate::commands::CommandName;
use crate::types::{
    ClientInfo, ClientRoleRequest, CreateClientRequest, GetClientResponse, ListClientsResponse,
    ListRequest, SetClientIdRequest, SetClientPasswordRequest,
};
use crate::Result;

impl DynSecClient {
    // ========================================
    // Clients
    // ========================================

    pub async fn create_client(&self, request: &CreateClientRequest) -> Result<()> {
        require("username", &request.username)?;
        self.invoke_void(CommandName::CreateClient, request).await
    }

    pub async fn delete_client(&self, username: &str) -> Result<()> {
        require("username", username)?;
        self.invoke_void(CommandName::DeleteClient, &json!({ "username": username }))
            .await
    }

    pub async fn set_client_password(&self, username: &str, password: &str) -> Result<()> {
        require("username", username)?;
        let request = SetClientPasswordRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.invoke_void(CommandName::SetClientPassword, &request).await
    }

    /// Set or, with `None`, clear the client id bound to a username.
    pub async fn set_client_id(&self, username: &str, clientid: Option<&str>) -> Result<()> {
        require("username", username)?;
        let request = SetClientIdRequest {
            username: username.to_string(),
            clientid: clientid.map(str::to_string),
        };
        self.invoke_void(CommandName::SetClientId, &request).await
    }

    pub async fn add_client_role(&self, request: &ClientRoleRequest) -> Result<()> {
        require("username", &request.username)?;
        require("rolename", &request.rolename)?;
        self.invoke_void(CommandName::AddClientRole, request).await
    }

    pub async fn remove_client_role(&self, username: &str, rolename: &str) -> Result<()> {
        require("username", username)?;
        require("rolename", rolename)?;
        self.invoke_void(CommandName::RemoveClientRole, &ClientRoleRequest::new(username, rolename))
            .await
    }

    pub async fn get_client(&self, username: &str) -> Result<ClientInfo> {
        require("username", username)?;
        let response: GetClientResponse = self
            .invoke(CommandName::GetClient, &json!({ "username": username }))
            .await?;
        Ok(response.client)
    }

    pub async fn list_clients(&self, request: ListRequest) -> Result<ListClientsResponse> {
        self.invoke(CommandName::ListClients, &request).await
    }

    pub async fn enable_client(&self, username: &str) -> Result<()> {
        require("username", username)?;
        self.invoke_void(CommandName::EnableClient, &json!({ "username": username }))
            .await
    }

    pub async fn disable_client(&self, username: &str) -> Result<()> {
        require("username", username)?;
        self.invoke_void(CommandName::DisableClient, &json!({ "username": username }))
            .await
    }
}
