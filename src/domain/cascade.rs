//! Ordered deletion of audited entities.
//!
//! Each routine locks the parent row, takes the full pre-deletion snapshot,
//! appends the `deleted` entry, removes children in dependency order and
//! finally removes the parent, all on the caller's transaction. Children
//! that are themselves audited go through their own routine, so their
//! `deleted` entries are written too.

use crate::domain::audit::{self, Action, DeleteAuditPolicy, EntityKind};
use crate::domain::error::LedgerResult;
use crate::domain::snapshot::{
    self, AccountPart, AccountSnapshot, EnterprisePart, EnterpriseSnapshot, ProductPart,
    ProductSnapshot,
};
use crate::storage::entities::{self, EntityTable};
use crate::storage::relations::{self, Relation};
use sqlx::PgConnection;
use tracing::info;

/// Removes one save pair and logs `save_deleted` against the account.
async fn drop_save(conn: &mut PgConnection, account_id: i32, product_id: i32) -> LedgerResult<()> {
    let save = snapshot::save_snapshot(conn, account_id, product_id).await?;
    audit::log(conn, EntityKind::Save, account_id, Action::SaveDeleted, &save).await?;
    relations::remove(conn, Relation::AccountSave, account_id, product_id).await
}

/// Product: saves (logged), join rows, product row.
pub async fn delete_product(
    conn: &mut PgConnection,
    policy: DeleteAuditPolicy,
    product_id: i32,
) -> LedgerResult<ProductSnapshot> {
    entities::lock_row(conn, EntityTable::Products, product_id).await?;
    let before = snapshot::product_snapshot(conn, product_id, ProductPart::ALL).await?;
    audit::log_deletion(conn, policy, EntityKind::Product, product_id, &before).await?;

    for account_id in relations::owners(conn, Relation::AccountSave, product_id).await? {
        drop_save(conn, account_id, product_id).await?;
    }
    for rel in Relation::PRODUCT_RELATIONS {
        relations::clear_owner(conn, rel, product_id).await?;
    }
    entities::delete_product_row(conn, product_id).await?;

    info!(product_id, "product deleted");
    Ok(before)
}

/// Enterprise: products (each through [`delete_product`]), external links,
/// enterprise row.
pub async fn delete_enterprise(
    conn: &mut PgConnection,
    policy: DeleteAuditPolicy,
    enterprise_id: i32,
) -> LedgerResult<EnterpriseSnapshot> {
    entities::lock_row(conn, EntityTable::Enterprises, enterprise_id).await?;
    let before = snapshot::enterprise_snapshot(conn, enterprise_id, EnterprisePart::ALL).await?;
    audit::log_deletion(conn, policy, EntityKind::Enterprise, enterprise_id, &before).await?;

    for product_id in entities::product_ids_of_enterprise(conn, enterprise_id).await? {
        delete_product(conn, policy, product_id).await?;
    }
    let links = entities::delete_links_of(conn, enterprise_id).await?;
    entities::delete_enterprise_row(conn, enterprise_id).await?;

    info!(enterprise_id, links, "enterprise deleted");
    Ok(before)
}

/// Account: owned enterprise (through [`delete_enterprise`]), saves (logged),
/// role associations, account row.
pub async fn delete_account(
    conn: &mut PgConnection,
    policy: DeleteAuditPolicy,
    account_id: i32,
) -> LedgerResult<AccountSnapshot> {
    entities::lock_row(conn, EntityTable::Accounts, account_id).await?;
    let before = snapshot::account_snapshot(conn, account_id, AccountPart::ALL).await?;
    audit::log_deletion(conn, policy, EntityKind::Account, account_id, &before).await?;

    if let Some(enterprise) = before.enterprise.as_ref() {
        delete_enterprise(conn, policy, enterprise.id).await?;
    }
    for product_id in relations::targets(conn, Relation::AccountSave, account_id).await? {
        drop_save(conn, account_id, product_id).await?;
    }
    relations::clear_owner(conn, Relation::AccountRole, account_id).await?;
    entities::delete_account_row(conn, account_id).await?;

    info!(account_id, "account deleted");
    Ok(before)
}
