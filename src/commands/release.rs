//! `release` subcommands.

use log::{info, warn};

use crate::commands::{to_json, CommandContext};
use crate::config::{ReleaseCreateOptions, ReleaseDeleteOptions};
use crate::ctl_error::CtlError;
use crate::github::json::release::NewRelease;

pub async fn create(ctx: &CommandContext, options: &ReleaseCreateOptions) -> Result<String, CtlError> {
    let payload = NewRelease::new(&options.tag, options.draft, options.prerelease);
    let release = ctx.gateway.create_release(&options.repository, &payload).await?;
    info!("Created release [{}] at [{}].", release.id, release.html_url);

    if ctx.is_json() {
        return to_json(&release);
    }
    Ok(format!("Created {} release", options.tag))
}

/// Deletes the release published for a tag and, optionally, the tag itself.
pub async fn delete(ctx: &CommandContext, options: &ReleaseDeleteOptions) -> Result<String, CtlError> {
    let repository = &options.repository;
    let release = ctx.gateway.release_by_tag(repository, &options.tag).await?;

    if !options.force {
        ctx.confirm(&format!(
            "delete {:?} release? (y,n): ",
            format!("{}/{}", repository, options.tag)
        ))?;
    }

    ctx.gateway.delete_release(repository, release.id).await?;
    let mut output = vec![format!("Deleted {} release", options.tag)];

    if options.with_tag {
        if let Err(e) = ctx.gateway.delete_tag(repository, &options.tag).await {
            warn!("Release [{}] was deleted, but its tag was not.", options.tag);
            return Err(e);
        }
        output.push(format!("Deleted {} tag", options.tag));
    }

    Ok(output.join("\n"))
}
