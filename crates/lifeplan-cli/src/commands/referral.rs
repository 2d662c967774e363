use std::sync::Arc;

use clap::Subcommand;
use lifeplan_core::links::{LinkOpener, RecordingOpener, SystemLinkOpener};
use lifeplan_core::{Config, ReferralProgram};
use serde_json::json;

use super::{open_store, print_json, CommandResult};

#[derive(Subcommand)]
pub enum ReferralAction {
    /// Print the referral code, link and share count
    Show,
    /// Share the referral link
    Share {
        /// Print the link without opening a browser
        #[arg(long)]
        no_open: bool,
    },
    /// Redeem a friend's referral code
    Redeem { code: String },
}

pub async fn run(action: ReferralAction) -> CommandResult {
    let base_url = Config::load_or_default().referral.share_url()?;
    let opener: Arc<dyn LinkOpener> = match &action {
        ReferralAction::Share { no_open: true } => Arc::new(RecordingOpener::new()),
        _ => Arc::new(SystemLinkOpener),
    };
    let mut program = ReferralProgram::load(open_store()?, opener, base_url).await;

    match action {
        ReferralAction::Show => {}
        ReferralAction::Share { .. } => {
            program.share().await;
        }
        ReferralAction::Redeem { code } => {
            program.redeem(&code).await?;
        }
    }

    print_json(&json!({
        "code": program.code(),
        "link": program.share_link().as_str(),
        "message": program.share_message(),
        "shares": program.shares(),
        "redeemedCode": program.state().redeemed_code,
    }))
}
