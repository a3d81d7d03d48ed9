//! Role requests and records.

use super::{AclEntry, AclType, Named};
use serde::{Deserialize, Serialize};

/// Parameters of `createRole`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoleRequest {
    pub rolename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textdescription: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acls: Vec<AclEntry>,
}

impl CreateRoleRequest {
    pub fn new(rolename: impl Into<String>) -> Self {
        Self {
            rolename: rolename.into(),
            ..Self::default()
        }
    }

    pub fn with_acl(mut self, acl: AclEntry) -> Self {
        self.acls.push(acl);
        self
    }
}

/// Parameters of `addRoleACL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddRoleAclRequest {
    pub rolename: String,
    #[serde(flatten)]
    pub acl: AclEntry,
}

impl AddRoleAclRequest {
    pub fn new(rolename: impl Into<String>, acl: AclEntry) -> Self {
        Self {
            rolename: rolename.into(),
            acl,
        }
    }
}

/// Parameters of `removeRoleACL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveRoleAclRequest {
    pub rolename: String,
    pub acltype: AclType,
    pub topic: String,
}

impl RemoveRoleAclRequest {
    pub fn new(rolename: impl Into<String>, acltype: AclType, topic: impl Into<String>) -> Self {
        Self {
            rolename: rolename.into(),
            acltype,
            topic: topic.into(),
        }
    }
}

/// A role as reported by `getRole` or a verbose `listRoles`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInfo {
    pub rolename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textdescription: Option<String>,
    #[serde(default)]
    pub acls: Vec<AclEntry>,
}

impl Named for RoleInfo {
    fn name(&self) -> &str {
        &self.rolename
    }
}

/// Response of `getRole`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRoleResponse {
    pub role: RoleInfo,
}
