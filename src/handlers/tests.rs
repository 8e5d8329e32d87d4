//! Unit tests for command construction and validation.
//!
//! Handler write paths need a database and are covered by the integration
//! tests in tests/.

use uuid::Uuid;

use crate::domain::{Amount, MobileNumber, MobileProvider, ReviewDecision, WithdrawalDecision};
use crate::handlers::{
    CreateCampaignCommand, CreateSubmissionCommand, ProcessWithdrawalCommand,
    RequestWithdrawalCommand, ReviewSubmissionCommand, UpdateCampaignCommand,
};

#[test]
fn test_review_command_builder() {
    let submission_id = Uuid::new_v4();
    let cmd = ReviewSubmissionCommand::new(submission_id, "approved".to_string())
        .with_feedback("Great work".to_string());

    assert_eq!(cmd.submission_id, submission_id);
    assert_eq!(cmd.decision, "approved");
    assert_eq!(cmd.feedback, Some("Great work".to_string()));
}

#[test]
fn test_review_decision_rejects_unknown() {
    assert!("approved".parse::<ReviewDecision>().is_ok());
    assert!("rejected".parse::<ReviewDecision>().is_ok());
    assert!("deferred".parse::<ReviewDecision>().is_err());
}

#[test]
fn test_request_withdrawal_command_fields_parse() {
    let cmd = RequestWithdrawalCommand::new(
        "200000".to_string(),
        "mtn".to_string(),
        "+256772000000".to_string(),
    );

    let amount: Amount = cmd.amount.parse().unwrap();
    assert_eq!(amount.to_string(), "200000.00");
    assert_eq!(
        cmd.mobile_provider.parse::<MobileProvider>().unwrap(),
        MobileProvider::Mtn
    );
    assert!(MobileNumber::new(cmd.mobile_number).is_ok());
}

#[test]
fn test_request_withdrawal_rejects_bad_amount() {
    let cmd = RequestWithdrawalCommand::new(
        "-5".to_string(),
        "mtn".to_string(),
        "+256772000000".to_string(),
    );
    assert!(cmd.amount.parse::<Amount>().is_err());
}

#[test]
fn test_process_withdrawal_command_builder() {
    let withdrawal_id = Uuid::new_v4();
    let cmd = ProcessWithdrawalCommand::new(withdrawal_id, "processed".to_string())
        .with_transaction_id("TX123".to_string());

    assert_eq!(cmd.withdrawal_id, withdrawal_id);
    assert_eq!(cmd.transaction_id, Some("TX123".to_string()));
    assert!(cmd.decision.parse::<WithdrawalDecision>().is_ok());
}

#[test]
fn test_create_campaign_command() {
    let cmd = CreateCampaignCommand::new(
        "Kola Foods".to_string(),
        "Festive recipes".to_string(),
        "250000".to_string(),
    );

    assert_eq!(cmd.brand, "Kola Foods");
    let budget: Amount = cmd.budget_per_creator.parse().unwrap();
    assert_eq!(budget.value(), rust_decimal::Decimal::new(250_000, 0));
}

#[test]
fn test_update_campaign_command_empty() {
    let cmd = UpdateCampaignCommand::default();
    assert!(cmd.is_empty());

    let cmd = UpdateCampaignCommand {
        status: Some("closed".to_string()),
        ..Default::default()
    };
    assert!(!cmd.is_empty());
}

#[test]
fn test_create_submission_command() {
    let campaign_id = Uuid::new_v4();
    let cmd = CreateSubmissionCommand::new(
        campaign_id,
        "https://storage.example.com/videos/abc123".to_string(),
    );

    assert_eq!(cmd.campaign_id, campaign_id);
    assert!(!cmd.content_url.is_empty());
}
