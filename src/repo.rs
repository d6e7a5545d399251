//! Generic entity repository shared by the four tracked kinds.
//!
//! Create never rejects on business rules: no duplicate-title checks, no
//! referential validation of soft references. Listing is global; only update
//! and delete are ownership-scoped, and the existence check strictly precedes
//! the permission check on both.

use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::identity::can_mutate;
use crate::models::{
    Defect, DefectCreate, DefectPatch, DefectStatus, Proposal, ProposalCreate, ProposalPatch,
    ProposalStatus, Release, ReleaseCreate, ReleasePatch, Remediation, RemediationCreate,
    RemediationPatch, RemediationStatus, User,
};
use crate::store::{Collection, Keyed};

/// A record kind the generic repository can manage.
pub trait Tracked: Keyed + Clone {
    /// Kind name used in error messages.
    const KIND: &'static str;
    type Create;
    type Patch;

    /// Construct a new record with a server-assigned id and creation
    /// timestamp, owned by the given user.
    fn build(owner_id: &str, payload: Self::Create) -> Self;
    fn created_by(&self) -> &str;
    /// Apply only the fields present in the patch; absent fields are left
    /// untouched.
    fn apply(&mut self, patch: Self::Patch);
    fn touch(&mut self);
}

pub struct Repository<'c, T> {
    coll: &'c Collection<T>,
}

impl<'c, T: Tracked> Repository<'c, T> {
    pub fn new(coll: &'c Collection<T>) -> Self {
        Self { coll }
    }

    fn not_found() -> AppError {
        AppError::not_found("not_found", format!("{} not found", T::KIND))
    }

    fn permission_denied() -> AppError {
        AppError::forbidden("permission_denied", "permission denied")
    }

    pub fn create(&self, user: &User, payload: T::Create) -> T {
        let row = T::build(&user.id, payload);
        self.coll.insert_one(row.clone());
        row
    }

    /// Every record of the kind, in insertion order, regardless of owner.
    pub fn list(&self) -> Vec<T> {
        self.coll.find_all()
    }

    pub fn get(&self, id: &str) -> AppResult<T> {
        self.coll.find_one(id).ok_or_else(Self::not_found)
    }

    pub fn update(&self, user: &User, id: &str, patch: T::Patch) -> AppResult<T> {
        let existing = self.get(id)?;
        if !can_mutate(user, existing.created_by()) {
            return Err(Self::permission_denied());
        }
        self.coll
            .update_one(id, |row| {
                row.apply(patch);
                row.touch();
            })
            .ok_or_else(Self::not_found)
    }

    pub fn delete(&self, user: &User, id: &str) -> AppResult<()> {
        let existing = self.get(id)?;
        if !can_mutate(user, existing.created_by()) {
            return Err(Self::permission_denied());
        }
        if self.coll.delete_one(id) {
            Ok(())
        } else {
            Err(Self::not_found())
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl Tracked for Defect {
    const KIND: &'static str = "defect";
    type Create = DefectCreate;
    type Patch = DefectPatch;

    fn build(owner_id: &str, p: DefectCreate) -> Self {
        Defect {
            id: new_id(),
            title: p.title,
            description: p.description,
            priority: p.priority,
            status: DefectStatus::Open,
            assigned_to: p.assigned_to,
            created_by: owner_id.to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn created_by(&self) -> &str { &self.created_by }

    fn apply(&mut self, p: DefectPatch) {
        if let Some(v) = p.title { self.title = v; }
        if let Some(v) = p.description { self.description = v; }
        if let Some(v) = p.priority { self.priority = v; }
        if let Some(v) = p.status { self.status = v; }
        if let Some(v) = p.assigned_to { self.assigned_to = Some(v); }
    }

    fn touch(&mut self) { self.updated_at = Some(Utc::now()); }
}

impl Tracked for Remediation {
    const KIND: &'static str = "remediation";
    type Create = RemediationCreate;
    type Patch = RemediationPatch;

    fn build(owner_id: &str, p: RemediationCreate) -> Self {
        Remediation {
            id: new_id(),
            title: p.title,
            description: p.description,
            related_defect_id: p.related_defect_id,
            status: RemediationStatus::Pending,
            created_by: owner_id.to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn created_by(&self) -> &str { &self.created_by }

    fn apply(&mut self, p: RemediationPatch) {
        if let Some(v) = p.title { self.title = v; }
        if let Some(v) = p.description { self.description = v; }
        if let Some(v) = p.status { self.status = v; }
    }

    fn touch(&mut self) { self.updated_at = Some(Utc::now()); }
}

impl Tracked for Release {
    const KIND: &'static str = "release";
    type Create = ReleaseCreate;
    type Patch = ReleasePatch;

    fn build(owner_id: &str, p: ReleaseCreate) -> Self {
        Release {
            id: new_id(),
            version: p.version,
            description: p.description,
            environment: p.environment,
            changes: p.changes,
            created_by: owner_id.to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn created_by(&self) -> &str { &self.created_by }

    fn apply(&mut self, p: ReleasePatch) {
        if let Some(v) = p.version { self.version = v; }
        if let Some(v) = p.description { self.description = v; }
        if let Some(v) = p.environment { self.environment = v; }
        if let Some(v) = p.changes { self.changes = v; }
    }

    fn touch(&mut self) { self.updated_at = Some(Utc::now()); }
}

impl Tracked for Proposal {
    const KIND: &'static str = "proposal";
    type Create = ProposalCreate;
    type Patch = ProposalPatch;

    fn build(owner_id: &str, p: ProposalCreate) -> Self {
        Proposal {
            id: new_id(),
            title: p.title,
            description: p.description,
            priority: p.priority,
            status: ProposalStatus::New,
            created_by: owner_id.to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn created_by(&self) -> &str { &self.created_by }

    fn apply(&mut self, p: ProposalPatch) {
        if let Some(v) = p.title { self.title = v; }
        if let Some(v) = p.description { self.description = v; }
        if let Some(v) = p.priority { self.priority = v; }
        if let Some(v) = p.status { self.status = v; }
    }

    fn touch(&mut self) { self.updated_at = Some(Utc::now()); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, Role};

    fn user(id: &str, role: Role) -> User {
        User {
            id: id.into(),
            username: id.into(),
            email: format!("{id}@example.com"),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
        }
    }

    fn defect_payload(title: &str) -> DefectCreate {
        DefectCreate {
            title: title.into(),
            description: "desc".into(),
            priority: Priority::default(),
            assigned_to: None,
        }
    }

    #[test]
    fn create_assigns_identity_defaults_and_owner() {
        let coll: Collection<Defect> = Collection::new();
        let repo = Repository::new(&coll);
        let owner = user("u1", Role::Contributor);
        let d = repo.create(&owner, defect_payload("crash"));
        assert!(!d.id.is_empty());
        assert_eq!(d.status, DefectStatus::Open);
        assert_eq!(d.priority, Priority::Medium);
        assert_eq!(d.created_by, "u1");
        assert!(d.updated_at.is_none());
        assert_eq!(repo.get(&d.id).unwrap().title, "crash");
    }

    #[test]
    fn update_is_a_sparse_patch() {
        let coll: Collection<Defect> = Collection::new();
        let repo = Repository::new(&coll);
        let owner = user("u1", Role::Contributor);
        let d = repo.create(&owner, defect_payload("crash"));

        let patch = DefectPatch { status: Some(DefectStatus::Resolved), ..Default::default() };
        let updated = repo.update(&owner, &d.id, patch).unwrap();
        assert_eq!(updated.status, DefectStatus::Resolved);
        assert_eq!(updated.title, "crash");
        assert_eq!(updated.description, "desc");
        assert!(updated.updated_at.is_some());
    }

    #[test]
    fn not_found_takes_precedence_over_permission() {
        let coll: Collection<Defect> = Collection::new();
        let repo = Repository::new(&coll);
        let owner = user("u1", Role::Contributor);
        let stranger = user("u2", Role::Contributor);
        let d = repo.create(&owner, defect_payload("crash"));

        // Missing id reported as NotFound even for a caller who could never mutate it.
        let err = repo.update(&stranger, "missing", DefectPatch::default()).unwrap_err();
        assert_eq!(err.http_status(), 404);

        // Existing id owned by someone else is a permission failure.
        let err = repo.update(&stranger, &d.id, DefectPatch::default()).unwrap_err();
        assert_eq!(err.http_status(), 403);
    }

    #[test]
    fn delete_follows_the_same_ordering_and_admin_override() {
        let coll: Collection<Defect> = Collection::new();
        let repo = Repository::new(&coll);
        let owner = user("u1", Role::Contributor);
        let stranger = user("u2", Role::Contributor);
        let admin = user("u3", Role::Admin);
        let d = repo.create(&owner, defect_payload("crash"));

        assert_eq!(repo.delete(&stranger, "missing").unwrap_err().http_status(), 404);
        assert_eq!(repo.delete(&stranger, &d.id).unwrap_err().http_status(), 403);
        repo.delete(&admin, &d.id).unwrap();
        assert_eq!(repo.get(&d.id).unwrap_err().http_status(), 404);
    }

    #[test]
    fn list_is_global_and_insertion_ordered() {
        let coll: Collection<Defect> = Collection::new();
        let repo = Repository::new(&coll);
        let a = user("u1", Role::Contributor);
        let b = user("u2", Role::Contributor);
        let first = repo.create(&a, defect_payload("one"));
        let second = repo.create(&b, defect_payload("two"));
        let ids: Vec<String> = repo.list().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }
}
