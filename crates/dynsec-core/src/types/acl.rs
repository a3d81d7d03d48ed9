//! ACL types shared by roles and default access.

use serde::{Deserialize, Serialize};

/// Kind of ACL entry attached to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AclType {
    PublishClientSend,
    PublishClientReceive,
    SubscribeLiteral,
    SubscribePattern,
    UnsubscribeLiteral,
    UnsubscribePattern,
}

/// Kind of default access rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DefaultAclType {
    PublishClientSend,
    PublishClientReceive,
    Subscribe,
    Unsubscribe,
}

/// One default access rule, as used by get/setDefaultACLAccess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultAclAccess {
    pub acltype: DefaultAclType,
    pub allow: bool,
}

impl DefaultAclAccess {
    pub fn new(acltype: DefaultAclType, allow: bool) -> Self {
        Self { acltype, allow }
    }
}

/// Response of `getDefaultACLAccess`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultAclAccessList {
    #[serde(default)]
    pub acls: Vec<DefaultAclAccess>,
}

/// An ACL entry on a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclEntry {
    pub acltype: AclType,
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow: Option<bool>,
}

impl AclEntry {
    pub fn new(acltype: AclType, topic: impl Into<String>) -> Self {
        Self {
            acltype,
            topic: topic.into(),
            priority: None,
            allow: None,
        }
    }

    pub fn allow(mut self, allow: bool) -> Self {
        self.allow = Some(allow);
        self
    }

    pub fn priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_acl_type_wire_names() {
        assert_eq!(
            serde_json::to_value(AclType::PublishClientSend).unwrap(),
            json!("publishClientSend")
        );
        assert_eq!(
            serde_json::to_value(AclType::UnsubscribePattern).unwrap(),
            json!("unsubscribePattern")
        );
        assert_eq!(
            serde_json::to_value(DefaultAclType::Subscribe).unwrap(),
            json!("subscribe")
        );
    }

    #[test]
    fn test_acl_entry_omits_unset_fields() {
        let entry = AclEntry::new(AclType::SubscribeLiteral, "sensors/#");
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"acltype": "subscribeLiteral", "topic": "sensors/#"})
        );

        let entry = entry.allow(true).priority(5);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["allow"], json!(true));
        assert_eq!(value["priority"], json!(5));
    }

    #[test]
    fn test_default_acl_list_parses_broker_data() {
        let list: DefaultAclAccessList = serde_json::from_value(json!({
            "acls": [
                {"acltype": "publishClientSend", "allow": false},
                {"acltype": "subscribe", "allow": true}
            ]
        }))
        .unwrap();
        assert_eq!(list.acls.len(), 2);
        assert_eq!(list.acls[1], DefaultAclAccess::new(DefaultAclType::Subscribe, true));
    }
}
