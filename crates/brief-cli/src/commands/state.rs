use anyhow::Result;
use brief_core::intent::{IntentStatus, WorkflowStage};

use super::Context;

pub async fn status(ctx: &Context, name: &str, status: &str) -> Result<()> {
    let status: IntentStatus = status.parse()?;
    let mut session = ctx.open(name).await?;
    session.change_status(status).await?;
    println!("{} is now {}", name, session.status());
    session.dispose().await;
    Ok(())
}

pub async fn stage(ctx: &Context, name: &str, stage: &str) -> Result<()> {
    let stage: WorkflowStage = stage.parse()?;
    let mut session = ctx.open(name).await?;
    session.update_workflow(stage).await?;
    println!("{} is at stage {}", name, session.workflow().stage);
    session.dispose().await;
    Ok(())
}
