//! Catalog of Dynamic Security command names.

use std::fmt;

/// Every command understood by the Dynamic Security plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    // General
    GetDefaultAclAccess,
    SetDefaultAclAccess,
    GetAnonymousGroup,
    SetAnonymousGroup,
    // Clients
    CreateClient,
    DeleteClient,
    SetClientPassword,
    SetClientId,
    AddClientRole,
    RemoveClientRole,
    GetClient,
    ListClients,
    EnableClient,
    DisableClient,
    // Groups
    CreateGroup,
    DeleteGroup,
    AddGroupRole,
    RemoveGroupRole,
    AddGroupClient,
    RemoveGroupClient,
    GetGroup,
    ListGroups,
    // Roles
    CreateRole,
    DeleteRole,
    AddRoleAcl,
    RemoveRoleAcl,
    GetRole,
    ListRoles,
}

impl CommandName {
    pub const ALL: [CommandName; 28] = [
        CommandName::GetDefaultAclAccess,
        CommandName::SetDefaultAclAccess,
        CommandName::GetAnonymousGroup,
        CommandName::SetAnonymousGroup,
        CommandName::CreateClient,
        CommandName::DeleteClient,
        CommandName::SetClientPassword,
        CommandName::SetClientId,
        CommandName::AddClientRole,
        CommandName::RemoveClientRole,
        CommandName::GetClient,
        CommandName::ListClients,
        CommandName::EnableClient,
        CommandName::DisableClient,
        CommandName::CreateGroup,
        CommandName::DeleteGroup,
        CommandName::AddGroupRole,
        CommandName::RemoveGroupRole,
        CommandName::AddGroupClient,
        CommandName::RemoveGroupClient,
        CommandName::GetGroup,
        CommandName::ListGroups,
        CommandName::CreateRole,
        CommandName::DeleteRole,
        CommandName::AddRoleAcl,
        CommandName::RemoveRoleAcl,
        CommandName::GetRole,
        CommandName::ListRoles,
    ];

    /// Wire name of the command.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandName::GetDefaultAclAccess => "getDefaultACLAccess",
            CommandName::SetDefaultAclAccess => "setDefaultACLAccess",
            CommandName::GetAnonymousGroup => "getAnonymousGroup",
            CommandName::SetAnonymousGroup => "setAnonymousGroup",
            CommandName::CreateClient => "createClient",
            CommandName::DeleteClient => "deleteClient",
            CommandName::SetClientPassword => "setClientPassword",
            CommandName::SetClientId => "setClientId",
            CommandName::AddClientRole => "addClientRole",
            CommandName::RemoveClientRole => "removeClientRole",
            CommandName::GetClient => "getClient",
            CommandName::ListClients => "listClients",
            CommandName::EnableClient => "enableClient",
            CommandName::DisableClient => "disableClient",
            CommandName::CreateGroup => "createGroup",
            CommandName::DeleteGroup => "deleteGroup",
            CommandName::AddGroupRole => "addGroupRole",
            CommandName::RemoveGroupRole => "removeGroupRole",
            CommandName::AddGroupClient => "addGroupClient",
            CommandName::RemoveGroupClient => "removeGroupClient",
            CommandName::GetGroup => "getGroup",
            CommandName::ListGroups => "listGroups",
            CommandName::CreateRole => "createRole",
            CommandName::DeleteRole => "deleteRole",
            CommandName::AddRoleAcl => "addRoleACL",
            CommandName::RemoveRoleAcl => "removeRoleACL",
            CommandName::GetRole => "getRole",
            CommandName::ListRoles => "listRoles",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
