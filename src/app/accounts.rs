//! Account operations: registration, profile updates, role grants and deletion.

use crate::app::enterprises::{create_enterprise_in, CreateEnterprise};
use crate::app::MarketplaceService;
use crate::domain::audit::{self, Action, EntityKind};
use crate::domain::cascade;
use crate::domain::error::{LedgerError, LedgerResult};
use crate::domain::snapshot::{self, AccountPart, AccountSnapshot, EnterpriseSnapshot};
use crate::storage::entities::{
    self, AccountPatch, AccountRecord, EnterpriseRecord, EntityTable, ExternalLink, RelatedRef,
};
use crate::storage::relations::{self, Relation};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use tracing::{info, warn};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateAccount {
    pub username: String,
    pub email: String,
    /// Stored as given; hashing happens before the engine.
    pub password_hash: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Ids that match no role are skipped.
    #[serde(default)]
    pub role_ids: Vec<i32>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterEnterpriseAccount {
    pub account: CreateAccount,
    /// `owner_account_id` is ignored; the new account becomes the owner.
    pub enterprise: CreateEnterprise,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisteredEnterpriseAccount {
    pub account: AccountSnapshot,
    pub enterprise: EnterpriseSnapshot,
}

/// Account with everything a signed-in user sees about themselves.
#[derive(Debug, Clone, Serialize)]
pub struct AccountProfile {
    pub account: AccountRecord,
    pub roles: Vec<RelatedRef>,
    pub enterprise: Option<EnterpriseRecord>,
    pub external_links: Vec<ExternalLink>,
}

pub(crate) async fn create_account_in(
    conn: &mut PgConnection,
    input: &CreateAccount,
) -> LedgerResult<AccountSnapshot> {
    let account = entities::insert_account(
        conn,
        &input.username,
        &input.email,
        &input.password_hash,
        input.phone.as_deref(),
    )
    .await?;

    let mut requested = input.role_ids.clone();
    requested.sort_unstable();
    requested.dedup();
    let attached = relations::attach_existing(conn, Relation::AccountRole, account.id, &requested).await?;
    if attached < requested.len() as u64 {
        warn!(
            account_id = account.id,
            requested = requested.len(),
            attached,
            "unknown role ids skipped"
        );
    }

    let snapshot = snapshot::account_snapshot(conn, account.id, &[AccountPart::Roles]).await?;
    audit::log(conn, EntityKind::Account, account.id, Action::Created, &snapshot).await?;
    Ok(snapshot)
}

impl MarketplaceService {
    pub async fn create_account(&self, input: CreateAccount) -> LedgerResult<AccountSnapshot> {
        let mut tx = self.pool.begin().await?;
        let snapshot = create_account_in(&mut tx, &input).await?;
        tx.commit().await?;

        info!(account_id = snapshot.account.id, "account created");
        Ok(snapshot)
    }

    pub async fn update_account(&self, account_id: i32, patch: AccountPatch) -> LedgerResult<AccountSnapshot> {
        let mut tx = self.pool.begin().await?;
        entities::update_account(&mut tx, account_id, &patch)
            .await?
            .ok_or_else(|| LedgerError::not_found("account", account_id))?;

        let snapshot = snapshot::account_snapshot(&mut tx, account_id, &[AccountPart::Roles]).await?;
        audit::log(&mut tx, EntityKind::Account, account_id, Action::Updated, &snapshot).await?;
        tx.commit().await?;

        info!(account_id, "account updated");
        Ok(snapshot)
    }

    /// Deletes the account, its enterprise (with links and products), its
    /// saves and role associations. Returns the pre-deletion snapshot.
    pub async fn delete_account(&self, account_id: i32) -> LedgerResult<AccountSnapshot> {
        let mut tx = self.pool.begin().await?;
        let before = cascade::delete_account(&mut tx, self.delete_policy, account_id).await?;
        tx.commit().await?;
        Ok(before)
    }

    pub async fn add_role_to_account(&self, account_id: i32, role_id: i32) -> LedgerResult<AccountSnapshot> {
        let mut tx = self.pool.begin().await?;
        entities::require(&mut tx, EntityTable::Accounts, account_id).await?;
        entities::require(&mut tx, EntityTable::Roles, role_id).await?;
        relations::add(&mut tx, Relation::AccountRole, account_id, role_id).await?;

        let snapshot = snapshot::account_snapshot(&mut tx, account_id, &[AccountPart::Roles]).await?;
        audit::log(&mut tx, EntityKind::Account, account_id, Action::RoleAdded, &snapshot).await?;
        tx.commit().await?;

        info!(account_id, role_id, "role granted");
        Ok(snapshot)
    }

    pub async fn remove_role_from_account(&self, account_id: i32, role_id: i32) -> LedgerResult<AccountSnapshot> {
        let mut tx = self.pool.begin().await?;
        relations::remove(&mut tx, Relation::AccountRole, account_id, role_id).await?;

        let snapshot = snapshot::account_snapshot(&mut tx, account_id, &[AccountPart::Roles]).await?;
        audit::log(&mut tx, EntityKind::Account, account_id, Action::RoleRemoved, &snapshot).await?;
        tx.commit().await?;

        info!(account_id, role_id, "role revoked");
        Ok(snapshot)
    }

    /// Creates an account and the enterprise it owns in one transaction.
    pub async fn register_enterprise_account(
        &self,
        input: RegisterEnterpriseAccount,
    ) -> LedgerResult<RegisteredEnterpriseAccount> {
        let RegisterEnterpriseAccount { account, mut enterprise } = input;

        let mut tx = self.pool.begin().await?;
        let account = create_account_in(&mut tx, &account).await?;
        enterprise.owner_account_id = Some(account.account.id);
        let enterprise = create_enterprise_in(&mut tx, &enterprise).await?;
        tx.commit().await?;

        info!(
            account_id = account.account.id,
            enterprise_id = enterprise.enterprise.id,
            "enterprise account registered"
        );
        Ok(RegisteredEnterpriseAccount { account, enterprise })
    }

    pub async fn account_profile_by_email(&self, email: &str) -> LedgerResult<AccountProfile> {
        let mut conn = self.pool.acquire().await?;
        let account = entities::find_account_by_email(&mut conn, email)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("no account with email {}", email)))?;

        let roles = snapshot::related(&mut conn, Relation::AccountRole, account.id).await?;
        let enterprise = entities::find_enterprise_by_owner(&mut conn, account.id).await?;
        let external_links = match enterprise.as_ref() {
            Some(e) => entities::links_of(&mut conn, e.id).await?,
            None => Vec::new(),
        };

        Ok(AccountProfile {
            account,
            roles,
            enterprise,
            external_links,
        })
    }
}
