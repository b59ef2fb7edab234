use super::swipe::RunOptions;
use anyhow::Result;
use clap::{Args, ValueEnum};
use dswipe_core::config::{BusyPolicy, SwipeSettings};
use dswipe_infrastructure::{ConfigService, DswipePaths};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyPolicyArg {
    Reject,
    CancelAndReplace,
}

impl From<BusyPolicyArg> for BusyPolicy {
    fn from(arg: BusyPolicyArg) -> Self {
        match arg {
            BusyPolicyArg::Reject => BusyPolicy::Reject,
            BusyPolicyArg::CancelAndReplace => BusyPolicy::CancelAndReplace,
        }
    }
}

/// Changes to the `[swipe]` settings; nothing given means "show".
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    #[arg(long)]
    pub enabled: Option<bool>,

    #[arg(long, value_enum)]
    pub busy_policy: Option<BusyPolicyArg>,

    /// Generation timeout in seconds; 0 disables it
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl ConfigArgs {
    fn is_empty(&self) -> bool {
        self.enabled.is_none() && self.busy_policy.is_none() && self.timeout_secs.is_none()
    }

    fn apply(&self, settings: &mut SwipeSettings) {
        if let Some(enabled) = self.enabled {
            settings.enabled = enabled;
        }
        if let Some(policy) = self.busy_policy {
            settings.busy_policy = policy.into();
        }
        if let Some(secs) = self.timeout_secs {
            settings.generation_timeout_secs = (secs > 0).then_some(secs);
        }
    }
}

pub fn config_service(options: &RunOptions) -> Result<ConfigService> {
    let service = match &options.config_dir {
        Some(dir) => ConfigService::with_paths(&DswipePaths::new(Some(dir.clone())))?,
        None => ConfigService::new()?,
    };
    Ok(service)
}

/// Shows the settings, or updates them and shows what is now on disk.
pub fn run(options: &RunOptions, args: &ConfigArgs) -> Result<SwipeSettings> {
    let service = config_service(options)?;
    if args.is_empty() {
        return Ok(service.get_settings()?);
    }

    let mut settings = service.get_settings()?;
    args.apply(&mut settings);
    service.save_settings(&settings)?;
    tracing::info!("[dswipe] Settings saved");

    service.invalidate_cache();
    Ok(service.get_settings()?)
}
