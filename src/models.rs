//! Record shapes for users and the four tracked-entity kinds, plus the
//! request/response payloads the HTTP surface exchanges.
//!
//! Statuses are plain tagged enumerations: any value may replace any other,
//! there is no server-enforced transition graph. Patch structs carry one
//! `Option` per mutable field; absent fields leave the record untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Keyed;

// --- users ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Contributor,
}

impl Default for Role {
    fn default() -> Self { Role::Contributor }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    /// PHC digest; never serialized into API responses (see `UserResponse`).
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Keyed for User {
    fn key(&self) -> &str { &self.id }
}

/// Outward-facing user record, without the password digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(u: &User) -> Self {
        UserResponse {
            id: u.id.clone(),
            username: u.username.clone(),
            email: u.email.clone(),
            role: u.role,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

fn bearer() -> String { "bearer".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    pub user: UserResponse,
}

// --- shared enumerations ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self { Priority::Medium }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

// --- defects ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectStatus {
    Open,
    InProgress,
    Resolved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defect {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: DefectStatus,
    pub assigned_to: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Keyed for Defect {
    fn key(&self) -> &str { &self.id }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DefectCreate {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<DefectStatus>,
    pub assigned_to: Option<String>,
}

// --- remediations ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemediationStatus {
    Pending,
    Deployed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Remediation {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Soft reference to a defect; never validated to exist.
    pub related_defect_id: Option<String>,
    pub status: RemediationStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Keyed for Remediation {
    fn key(&self) -> &str { &self.id }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemediationCreate {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub related_defect_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemediationPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<RemediationStatus>,
}

// --- releases ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub id: String,
    pub version: String,
    pub description: String,
    pub environment: Environment,
    /// Free-text change descriptors; no entity linkage.
    pub changes: Vec<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Keyed for Release {
    fn key(&self) -> &str { &self.id }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseCreate {
    pub version: String,
    pub description: String,
    pub environment: Environment,
    #[serde(default)]
    pub changes: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleasePatch {
    pub version: Option<String>,
    pub description: Option<String>,
    pub environment: Option<Environment>,
    pub changes: Option<Vec<String>>,
}

// --- proposals ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    New,
    UnderReview,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: ProposalStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Keyed for Proposal {
    fn key(&self) -> &str { &self.id }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProposalCreate {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProposalPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<ProposalStatus>,
}
