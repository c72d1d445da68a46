use std::fmt;

use crate::engine::errors::IngestError;

/// A single log field: name plus textual value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Identifier of a log stream within a part.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StreamId(pub u128);

/// Tenant identifier in `account:project` form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TenantID {
    pub account_id: u32,
    pub project_id: u32,
}

impl TenantID {
    pub fn parse(s: &str) -> Result<Self, IngestError> {
        let Some((account, project)) = s.split_once(':') else {
            return Err(IngestError::InvalidTenantId(s.to_string()));
        };
        let account_id = account
            .parse::<u32>()
            .map_err(|_| IngestError::InvalidTenantId(s.to_string()))?;
        let project_id = project
            .parse::<u32>()
            .map_err(|_| IngestError::InvalidTenantId(s.to_string()))?;
        Ok(Self {
            account_id,
            project_id,
        })
    }
}

impl fmt::Display for TenantID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.account_id, self.project_id)
    }
}
