use anyhow::{Context as _, Result, bail};
use brief_application::IntentSession;
use brief_core::intent::IntentContent;

use super::{Context, FormArgs, print_warnings};

pub async fn create(ctx: &Context, name: &str, files: Vec<String>, form: FormArgs) -> Result<()> {
    let folder = ctx.services.folder_for(name)?;
    if ctx.services.store.read(&folder).await.is_some() {
        bail!("Intent '{}' already exists", name);
    }

    let form = form.into_form(name, &IntentContent::default());
    form.validate()?;

    let mut session = IntentSession::create(ctx.services.clone(), folder, files).await?;
    session.generate_intent(form).await?;
    print_warnings(&session);
    println!(
        "Created {} ({} files, ~{} tokens)",
        session.folder().display(),
        session.files().len(),
        session.tokens().estimated
    );
    session.dispose().await;
    Ok(())
}

pub async fn list(ctx: &Context) -> Result<()> {
    let intents = ctx.services.list_intents().await?;
    if intents.is_empty() {
        println!("No intents in {}", ctx.services.intents_root.display());
        return Ok(());
    }
    for intent in intents {
        println!(
            "{:<32} {:<12} {:<20} {:>3} files  {:>8} tokens",
            intent.name,
            intent.status.as_str(),
            intent.workflow.stage.as_str(),
            intent.files.len(),
            intent.tokens.estimated
        );
    }
    Ok(())
}

pub async fn show(ctx: &Context, name: &str) -> Result<()> {
    let folder = ctx.services.folder_for(name)?;
    let document = ctx
        .services
        .store
        .read(&folder)
        .await
        .with_context(|| format!("Intent '{}' not found", name))?;
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

pub async fn generate(ctx: &Context, name: &str, form: FormArgs) -> Result<()> {
    let mut session = ctx.open(name).await?;
    let form = form.into_form(name, session.content());
    session.generate_intent(form).await?;
    print_warnings(&session);
    println!("Generated {}", session.intent_document_path().display());
    session.dispose().await;
    Ok(())
}

pub async fn regenerate(ctx: &Context, name: &str, form: FormArgs) -> Result<()> {
    let mut session = ctx.open(name).await?;
    let form = form.into_form(name, session.content());
    session.regenerate_intent(form).await?;
    print_warnings(&session);
    println!("Regenerated {}", session.intent_document_path().display());
    session.dispose().await;
    Ok(())
}

pub async fn delete(ctx: &Context, name: &str, yes: bool) -> Result<()> {
    if !yes {
        bail!("Refusing to delete '{}' without --yes", name);
    }
    let session = ctx.open(name).await?;
    let folder = session.folder().to_path_buf();
    session.delete_intent().await?;
    println!("Deleted {}", folder.display());
    Ok(())
}
