//! Tenant resolution for the request pipeline.
//!
//! Every non-exempt request is mapped to a tenant partition from its `Host`
//! header:
//!
//! - `acme.example.com` → tenant whose `domain` is `acme`, else whose `id` is `acme`
//! - `t1.localhost:9002` → same lookup for `t1` (local hosts need two labels)
//! - `example.com`, `www.example.com`, `localhost` → default partition
//!
//! Unknown subdomains and directory outages both resolve to the default
//! partition. See [`TenantResolver`] for the full order.

mod directory;
mod exemptions;
mod host;
mod resolver;
mod source;

pub use directory::{
    parse_seed, DirectoryError, InMemoryTenantDirectory, PgTenantDirectory, TenantDirectory,
};
pub use resolver::{Resolution, ResolvedTenant, TenantResolver};
pub use source::TenantSource;
