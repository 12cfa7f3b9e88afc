//! Enterprise account operations and their external links.

use crate::app::MarketplaceService;
use crate::domain::audit::{self, Action, EntityKind};
use crate::domain::cascade;
use crate::domain::error::{LedgerError, LedgerResult};
use crate::domain::snapshot::{self, EnterprisePart, EnterpriseSnapshot};
use crate::storage::entities::{self, EnterprisePatch, EntityTable, LinkPatch};
use serde::Deserialize;
use sqlx::PgConnection;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewExternalLink {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateEnterprise {
    pub tax_id: String,
    pub address: String,
    #[serde(default)]
    pub description: Option<String>,
    pub representative_name: String,
    pub representative_id_number: String,
    #[serde(default)]
    pub owner_account_id: Option<i32>,
    #[serde(default)]
    pub external_links: Vec<NewExternalLink>,
}

const WITH_LINKS: &[EnterprisePart] = &[EnterprisePart::ExternalLinks];

pub(crate) async fn create_enterprise_in(
    conn: &mut PgConnection,
    input: &CreateEnterprise,
) -> LedgerResult<EnterpriseSnapshot> {
    if let Some(owner) = input.owner_account_id {
        entities::require(conn, EntityTable::Accounts, owner).await?;
    }

    let enterprise = entities::insert_enterprise(
        conn,
        &input.tax_id,
        &input.address,
        input.description.as_deref(),
        &input.representative_name,
        &input.representative_id_number,
        input.owner_account_id,
    )
    .await?;
    for link in &input.external_links {
        entities::insert_link(conn, enterprise.id, &link.name, &link.url).await?;
    }

    let snapshot = snapshot::enterprise_snapshot(conn, enterprise.id, WITH_LINKS).await?;
    audit::log(conn, EntityKind::Enterprise, enterprise.id, Action::Created, &snapshot).await?;
    Ok(snapshot)
}

impl MarketplaceService {
    pub async fn create_enterprise(&self, input: CreateEnterprise) -> LedgerResult<EnterpriseSnapshot> {
        let mut tx = self.pool.begin().await?;
        let snapshot = create_enterprise_in(&mut tx, &input).await?;
        tx.commit().await?;

        info!(
            enterprise_id = snapshot.enterprise.id,
            links = input.external_links.len(),
            "enterprise created"
        );
        Ok(snapshot)
    }

    pub async fn update_enterprise(
        &self,
        enterprise_id: i32,
        patch: EnterprisePatch,
    ) -> LedgerResult<EnterpriseSnapshot> {
        self.patch_enterprise(enterprise_id, &patch, Action::Updated).await
    }

    pub async fn set_enterprise_enabled(
        &self,
        enterprise_id: i32,
        enabled: bool,
    ) -> LedgerResult<EnterpriseSnapshot> {
        let patch = EnterprisePatch {
            enabled: Some(enabled),
            ..EnterprisePatch::default()
        };
        let action = if enabled { Action::Enabled } else { Action::Disabled };
        self.patch_enterprise(enterprise_id, &patch, action).await
    }

    async fn patch_enterprise(
        &self,
        enterprise_id: i32,
        patch: &EnterprisePatch,
        action: Action,
    ) -> LedgerResult<EnterpriseSnapshot> {
        let mut tx = self.pool.begin().await?;
        if let Some(owner) = patch.owner_account_id {
            entities::require(&mut tx, EntityTable::Accounts, owner).await?;
        }
        entities::update_enterprise(&mut tx, enterprise_id, patch)
            .await?
            .ok_or_else(|| LedgerError::not_found("enterprise", enterprise_id))?;

        let snapshot = snapshot::enterprise_snapshot(&mut tx, enterprise_id, WITH_LINKS).await?;
        audit::log(&mut tx, EntityKind::Enterprise, enterprise_id, action, &snapshot).await?;
        tx.commit().await?;

        info!(enterprise_id, action = %action, "enterprise changed");
        Ok(snapshot)
    }

    /// Deletes the enterprise with its products and links. Returns the
    /// pre-deletion snapshot.
    pub async fn delete_enterprise(&self, enterprise_id: i32) -> LedgerResult<EnterpriseSnapshot> {
        let mut tx = self.pool.begin().await?;
        let before = cascade::delete_enterprise(&mut tx, self.delete_policy, enterprise_id).await?;
        tx.commit().await?;
        Ok(before)
    }

    pub async fn add_external_link(
        &self,
        enterprise_id: i32,
        link: NewExternalLink,
    ) -> LedgerResult<EnterpriseSnapshot> {
        let mut tx = self.pool.begin().await?;
        entities::require(&mut tx, EntityTable::Enterprises, enterprise_id).await?;
        let created = entities::insert_link(&mut tx, enterprise_id, &link.name, &link.url).await?;

        let snapshot = snapshot::enterprise_snapshot(&mut tx, enterprise_id, WITH_LINKS).await?;
        audit::log(
            &mut tx,
            EntityKind::Enterprise,
            enterprise_id,
            Action::ExternalLinkAdded,
            &snapshot,
        )
        .await?;
        tx.commit().await?;

        info!(enterprise_id, link_id = created.id, "external link added");
        Ok(snapshot)
    }

    pub async fn remove_external_link(&self, link_id: i32) -> LedgerResult<EnterpriseSnapshot> {
        let mut tx = self.pool.begin().await?;
        let link = entities::find_link(&mut tx, link_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("external link", link_id))?;
        entities::delete_link(&mut tx, link_id).await?;

        let snapshot = snapshot::enterprise_snapshot(&mut tx, link.enterprise_id, WITH_LINKS).await?;
        audit::log(
            &mut tx,
            EntityKind::Enterprise,
            link.enterprise_id,
            Action::ExternalLinkRemoved,
            &snapshot,
        )
        .await?;
        tx.commit().await?;

        info!(enterprise_id = link.enterprise_id, link_id, "external link removed");
        Ok(snapshot)
    }

    pub async fn update_external_link(
        &self,
        link_id: i32,
        patch: LinkPatch,
    ) -> LedgerResult<EnterpriseSnapshot> {
        let mut tx = self.pool.begin().await?;
        let link = entities::update_link(&mut tx, link_id, &patch)
            .await?
            .ok_or_else(|| LedgerError::not_found("external link", link_id))?;

        let snapshot = snapshot::enterprise_snapshot(&mut tx, link.enterprise_id, WITH_LINKS).await?;
        audit::log(
            &mut tx,
            EntityKind::Enterprise,
            link.enterprise_id,
            Action::ExternalLinkUpdated,
            &snapshot,
        )
        .await?;
        tx.commit().await?;

        info!(enterprise_id = link.enterprise_id, link_id, "external link updated");
        Ok(snapshot)
    }
}
