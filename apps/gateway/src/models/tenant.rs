use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `tenants` table. The middleware only ever reads these.
///
/// `id` is the isolation key stamped on every tenant-owned record; `domain`
/// is an optional vanity subdomain label, unique when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub id: String,
    pub domain: Option<String>,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    pub fn new(id: impl Into<String>, domain: Option<&str>) -> Self {
        Self {
            id: id.into(),
            domain: domain.map(String::from),
            name: None,
            created_at: Utc::now(),
        }
    }
}
