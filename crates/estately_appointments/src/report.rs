// --- File: crates/estately_appointments/src/report.rs ---
use tracing::{error, info};

use crate::api::{ActionOutcome, ReportUserRequest};
use crate::context::SchedulingContext;
use crate::lifecycle::ActionError;

/// Reports a user to the marketplace moderators. The reason is required.
pub async fn report_user(
    ctx: &SchedulingContext,
    user_id: i64,
    reason: &str,
) -> Result<ActionOutcome, ActionError> {
    let reason = reason.trim();
    if reason.is_empty() {
        let err = ActionError::ReasonRequired;
        ctx.notifier.error(&err.user_message(ctx.translator.as_ref()));
        return Err(err);
    }
    let request = ReportUserRequest {
        user_id,
        reason: reason.to_string(),
    };
    match ctx.api.report_user(request).await {
        Ok(outcome) => {
            info!("Reported user {}", user_id);
            ctx.notify_success(outcome.message.as_deref(), "userReported");
            Ok(outcome)
        }
        Err(e) => {
            error!("Reporting user {} failed: {}", user_id, e);
            let err = ActionError::Api(e);
            ctx.notifier.error(&err.user_message(ctx.translator.as_ref()));
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{Call, MockMarketplaceApi};
    use crate::context::mock::{test_context, RecordingNotifier};
    use chrono::NaiveDate;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_report_requires_reason() {
        let api = Arc::new(MockMarketplaceApi::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let ctx = test_context(api.clone(), notifier.clone(), NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());

        assert!(matches!(report_user(&ctx, 9, "  ").await, Err(ActionError::ReasonRequired)));
        assert!(api.calls().is_empty());

        report_user(&ctx, 9, " spam ").await.unwrap();
        assert_eq!(
            api.calls(),
            vec![Call::Report(ReportUserRequest {
                user_id: 9,
                reason: "spam".to_string()
            })]
        );
        assert_eq!(notifier.successes(), vec!["Reported".to_string()]);
    }
}
