//! Typed parameters and results of the Dynamic Security commands.
//!
//! Request structs serialize to the parameter objects the plugin expects,
//! with unset optional fields omitted. Response structs tolerate missing
//! optional fields so that older brokers still decode.

mod acl;
mod client;
mod group;
mod role;

pub use acl::{AclEntry, AclType, DefaultAclAccess, DefaultAclAccessList, DefaultAclType};
pub use client::{
    ClientInfo, ClientRoleRequest, CreateClientRequest, GetClientResponse, SetClientIdRequest,
    SetClientPasswordRequest,
};
pub use group::{
    AnonymousGroup, AnonymousGroupResponse, CreateGroupRequest, GetGroupResponse, GroupClientRequest,
    GroupInfo, GroupRoleRequest,
};
pub use role::{AddRoleAclRequest, CreateRoleRequest, GetRoleResponse, RemoveRoleAclRequest, RoleInfo};

use serde::{Deserialize, Serialize};

/// Records addressable by a primary name.
pub trait Named {
    fn name(&self) -> &str;
}

/// Role membership of a client or group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
    pub rolename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

impl RoleRef {
    pub fn new(rolename: impl Into<String>) -> Self {
        Self {
            rolename: rolename.into(),
            priority: None,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Group membership of a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub groupname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

impl GroupRef {
    pub fn new(groupname: impl Into<String>) -> Self {
        Self {
            groupname: groupname.into(),
            priority: None,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Client member of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRef {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

/// Paging and detail options shared by the list commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

impl ListRequest {
    pub fn verbose() -> Self {
        Self {
            verbose: Some(true),
            ..Self::default()
        }
    }

    pub fn page(mut self, offset: i64, count: i64) -> Self {
        self.offset = Some(offset);
        self.count = Some(count);
        self
    }
}

/// A list entry: a bare name, or the full record when `verbose` was set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListEntry<T> {
    Name(String),
    Detailed(T),
}

impl<T: Named> ListEntry<T> {
    pub fn name(&self) -> &str {
        match self {
            ListEntry::Name(name) => name,
            ListEntry::Detailed(record) => record.name(),
        }
    }

    pub fn detailed(&self) -> Option<&T> {
        match self {
            ListEntry::Name(_) => None,
            ListEntry::Detailed(record) => Some(record),
        }
    }
}

/// Response of `listClients`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListClientsResponse {
    #[serde(rename = "totalCount", default)]
    pub total_count: u64,
    #[serde(default)]
    pub clients: Vec<ListEntry<ClientInfo>>,
}

/// Response of `listGroups`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListGroupsResponse {
    #[serde(rename = "totalCount", default)]
    pub total_count: u64,
    #[serde(default)]
    pub groups: Vec<ListEntry<GroupInfo>>,
}

/// Response of `listRoles`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRolesResponse {
    #[serde(rename = "totalCount", default)]
    pub total_count: u64,
    #[serde(default)]
    pub roles: Vec<ListEntry<RoleInfo>>,
}
