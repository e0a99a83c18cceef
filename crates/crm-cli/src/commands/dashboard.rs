use anyhow::Result;

use crm_core::DashboardStats;

use crate::output;

use super::{notice, Context};

pub async fn show(ctx: &Context) -> Result<()> {
    let crm = ctx.connect()?;
    let stats = DashboardStats::fetch(&crm)
        .await
        .map_err(|e| notice(e, "Failed to load dashboard"))?;
    ctx.emit(&stats, output::dashboard)
}
