//! Group requests and records.

use super::{ClientRef, Named, RoleRef};
use serde::{Deserialize, Serialize};

/// Parameters of `createGroup`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub groupname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textdescription: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<RoleRef>,
}

impl CreateGroupRequest {
    pub fn new(groupname: impl Into<String>) -> Self {
        Self {
            groupname: groupname.into(),
            ..Self::default()
        }
    }

    pub fn with_role(mut self, role: RoleRef) -> Self {
        self.roles.push(role);
        self
    }
}

/// Parameters of `addGroupRole` / `removeGroupRole`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRoleRequest {
    pub groupname: String,
    pub rolename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

impl GroupRoleRequest {
    pub fn new(groupname: impl Into<String>, rolename: impl Into<String>) -> Self {
        Self {
            groupname: groupname.into(),
            rolename: rolename.into(),
            priority: None,
        }
    }
}

/// Parameters of `addGroupClient` / `removeGroupClient`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupClientRequest {
    pub groupname: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

impl GroupClientRequest {
    pub fn new(groupname: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            groupname: groupname.into(),
            username: username.into(),
            priority: None,
        }
    }
}

/// A group as reported by `getGroup` or a verbose `listGroups`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub groupname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textdescription: Option<String>,
    #[serde(default)]
    pub roles: Vec<RoleRef>,
    #[serde(default)]
    pub clients: Vec<ClientRef>,
}

impl Named for GroupInfo {
    fn name(&self) -> &str {
        &self.groupname
    }
}

/// Response of `getGroup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetGroupResponse {
    pub group: GroupInfo,
}

/// Name-only group reference returned by `getAnonymousGroup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymousGroup {
    pub groupname: String,
}

/// Response of `getAnonymousGroup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymousGroupResponse {
    pub group: AnonymousGroup,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_group_info_parses_members() {
        let resp: GetGroupResponse = serde_json::from_value(json!({
            "group": {
                "groupname": "staff",
                "roles": [{"rolename": "reader", "priority": 2}],
                "clients": [{"username": "jonas"}]
            }
        }))
        .unwrap();

        assert_eq!(resp.group.name(), "staff");
        assert_eq!(resp.group.roles[0].priority, Some(2));
        assert_eq!(resp.group.clients[0].username, "jonas");
    }

    #[test]
    fn test_group_client_request_shape() {
        let req = GroupClientRequest::new("staff", "jonas");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"groupname": "staff", "username": "jonas"})
        );
    }
}
