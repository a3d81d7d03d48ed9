//! Client (user account) requests and records.

use super::{GroupRef, Named, RoleRef};
use serde::{Deserialize, Serialize};

/// Parameters of `createClient`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateClientRequest {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clientid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textdescription: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<RoleRef>,
}

impl CreateClientRequest {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_clientid(mut self, clientid: impl Into<String>) -> Self {
        self.clientid = Some(clientid.into());
        self
    }

    pub fn with_role(mut self, role: RoleRef) -> Self {
        self.roles.push(role);
        self
    }

    pub fn with_group(mut self, group: GroupRef) -> Self {
        self.groups.push(group);
        self
    }
}

/// Parameters of `setClientPassword`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetClientPasswordRequest {
    pub username: String,
    pub password: String,
}

/// Parameters of `setClientId`. A missing `clientid` clears it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetClientIdRequest {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clientid: Option<String>,
}

/// Parameters of `addClientRole` / `removeClientRole`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRoleRequest {
    pub username: String,
    pub rolename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

impl ClientRoleRequest {
    pub fn new(username: impl Into<String>, rolename: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            rolename: rolename.into(),
            priority: None,
        }
    }
}

/// A client as reported by `getClient` or a verbose `listClients`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clientid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textdescription: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub roles: Vec<RoleRef>,
    #[serde(default)]
    pub groups: Vec<GroupRef>,
}

impl Named for ClientInfo {
    fn name(&self) -> &str {
        &self.username
    }
}

/// Response of `getClient`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetClientResponse {
    pub client: ClientInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_client_minimal_wire_shape() {
        let req = CreateClientRequest::new("a").with_password("b");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"username": "a", "password": "b"})
        );
    }

    #[test]
    fn test_create_client_with_roles_and_groups() {
        let req = CreateClientRequest::new("jonas")
            .with_clientid("jonas1234")
            .with_role(RoleRef::new("admin").with_priority(1))
            .with_group(GroupRef::new("staff"));
        let value = serde_json::to_value(&req).unwrap();

        assert_eq!(value["clientid"], "jonas1234");
        assert_eq!(value["roles"], json!([{"rolename": "admin", "priority": 1}]));
        assert_eq!(value["groups"], json!([{"groupname": "staff"}]));
    }

    #[test]
    fn test_client_info_tolerates_missing_fields() {
        let resp: GetClientResponse = serde_json::from_value(json!({
            "client": {
                "username": "admin-user",
                "roles": [{"rolename": "admin"}],
                "groups": []
            }
        }))
        .unwrap();

        assert_eq!(resp.client.name(), "admin-user");
        assert!(!resp.client.disabled);
        assert!(resp.client.clientid.is_none());
        assert_eq!(resp.client.roles[0].rolename, "admin");
    }
}
