use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use hookline_core::{DomainError, DomainResult, Entity, EntityKind, GroupId};

/// Group new users join unless configured otherwise.
pub const DEFAULT_GROUP: GroupName = GroupName(Cow::Borrowed("User"));

/// Validated group name.
///
/// Names are compared exactly (case-sensitive) and may not be blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupName(Cow<'static, str>);

impl GroupName {
    pub fn parse(name: impl Into<Cow<'static, str>>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("group name must not be blank"));
        }
        if name.trim() != name {
            return Err(DomainError::validation(
                "group name must not have leading or trailing whitespace",
            ));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GroupName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<GroupName> for String {
    fn from(value: GroupName) -> Self {
        value.0.into_owned()
    }
}

impl core::fmt::Display for GroupName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named collection users can belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: GroupName,
}

impl Group {
    pub fn new(name: GroupName) -> Self {
        Self {
            id: GroupId::new(),
            name,
        }
    }
}

impl Entity for Group {
    type Id = GroupId;
    const KIND: EntityKind = EntityKind::from_static("Group");

    fn id(&self) -> &GroupId {
        &self.id
    }
}
