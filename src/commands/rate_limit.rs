//! `ratelimit` command.

use crate::commands::{to_json, CommandContext};
use crate::ctl_error::CtlError;

pub async fn show(ctx: &CommandContext) -> Result<String, CtlError> {
    let rate_limit = ctx.gateway.rate_limit().await?;

    if ctx.is_json() {
        return to_json(&rate_limit);
    }

    let core = &rate_limit.resources.core;
    let reset = match core.reset_time() {
        Some(reset) => reset.to_string(),
        None => core.reset.to_string(),
    };

    Ok(format!(
        "Your rate limit: {}, Remaining: {}\nReset time: {}",
        core.limit, core.remaining, reset
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::*;
    use crate::github::client::gateway::MockForgeGateway;
    use crate::github::json::rate_limit::{Quota, RateLimit, RateLimitResources};

    #[tokio::test]
    async fn shows_the_core_quota() {
        let mut gateway = MockForgeGateway::new();
        gateway.expect_rate_limit().returning(|| {
            Ok(RateLimit {
                resources: RateLimitResources {
                    core: Quota {
                        limit: 5000,
                        remaining: 4321,
                        reset: 1372700873,
                    },
                },
            })
        });

        assert_eq!(
            show(&context(gateway)).await.unwrap(),
            "Your rate limit: 5000, Remaining: 4321\nReset time: 2013-07-01 17:47:53 UTC"
        );
    }
}
