use anyhow::Result;

use super::{Context, print_warnings};

pub async fn add(ctx: &Context, name: &str, files: Vec<String>) -> Result<()> {
    let mut session = ctx.open(name).await?;
    let added = session.add_files(files).await?;
    print_warnings(&session);
    println!(
        "Added {} file(s); {} selected, ~{} tokens",
        added,
        session.files().len(),
        session.tokens().estimated
    );
    session.dispose().await;
    Ok(())
}

pub async fn remove(ctx: &Context, name: &str, file: &str) -> Result<()> {
    let mut session = ctx.open(name).await?;
    if session.remove_file(file).await? {
        print_warnings(&session);
        println!("Removed {}", file);
    } else {
        println!("{} is not selected", file);
    }
    session.dispose().await;
    Ok(())
}

pub async fn tokens(ctx: &Context, name: &str) -> Result<()> {
    let session = ctx.open(name).await?;
    let tokens = session.tokens();
    println!(
        "~{} / {} tokens ({:.2}%, {:?})",
        tokens.estimated, tokens.limit, tokens.percentage, tokens.severity
    );
    session.dispose().await;
    Ok(())
}

pub async fn snapshot(ctx: &Context, name: &str) -> Result<()> {
    let mut session = ctx.open(name).await?;
    session.rebuild_snapshot().await?;
    print_warnings(&session);
    println!("Wrote {}", session.snapshot_path().display());
    session.dispose().await;
    Ok(())
}
