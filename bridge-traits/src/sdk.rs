//! Survey SDK Abstractions
//!
//! The third-party survey SDK is an external collaborator. The bridge never
//! reimplements its networking or rendering; it only hands it a fully
//! resolved [`AttachRequest`] and listens to the callbacks it fires.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::Result;

/// On-screen anchor for the survey indicator.
///
/// Resolved by the bridge from two independent alignment axes; the SDK only
/// ever sees the combined value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    TopLeft,
    TopRight,
    MiddleLeft,
    MiddleRight,
    BottomLeft,
    #[default]
    BottomRight,
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Placement::TopLeft => "top-left",
            Placement::TopRight => "top-right",
            Placement::MiddleLeft => "middle-left",
            Placement::MiddleRight => "middle-right",
            Placement::BottomLeft => "bottom-left",
            Placement::BottomRight => "bottom-right",
        };
        f.write_str(label)
    }
}

/// Respondent gender forwarded to the SDK's targeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Parses the host-facing spelling (`"male"`, `"female"`, `"other"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

/// User properties handed to the SDK with each attach call.
///
/// Only `gender` is forwarded today. Identity and location fields are
/// accepted and validated by the bridge but the SDK builder has no slot for
/// them, so they never reach this struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAttributes {
    pub gender: Option<Gender>,
}

/// Full configuration snapshot for one attach/initialize call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachRequest {
    /// Publisher API key
    pub api_key: String,
    /// Optional request correlation id passed through to the SDK
    pub request_uuid: Option<String>,
    /// Indicator anchor
    pub placement: Placement,
    /// Indicator padding from the anchored edge
    pub padding: i32,
    /// `false` while the publisher runs in developer mode
    pub release_mode: bool,
    /// Present an offerwall instead of a single survey
    pub offerwall_mode: bool,
    /// Reward-based survey flow
    pub reward_mode: bool,
    /// Targeting properties, if the host provided any
    pub user_attributes: Option<UserAttributes>,
}

/// Metadata the SDK reports for a received or completed survey.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyInfo {
    pub survey_cpa: i64,
    pub survey_ir: i64,
    pub survey_loi: i64,
    pub survey_class: String,
    pub reward_name: String,
    pub reward_value: String,
}

/// The six asynchronous notifications the SDK emits.
///
/// Platform adapters translate each SDK listener interface into one of these
/// variants so the bridge has a single consumer for all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkCallback {
    /// A survey is available. Some SDK builds omit the metadata.
    SurveyReceived(Option<SurveyInfo>),
    /// The user finished a survey.
    SurveyCompleted(SurveyInfo),
    /// No survey is available for this user right now.
    SurveyNotAvailable,
    /// The user was screened out.
    UserNotEligible,
    /// The full survey panel opened.
    Opened,
    /// The survey panel or the indicator closed.
    Closed,
}

impl SdkCallback {
    pub fn name(&self) -> &'static str {
        match self {
            SdkCallback::SurveyReceived(_) => "survey_received",
            SdkCallback::SurveyCompleted(_) => "survey_completed",
            SdkCallback::SurveyNotAvailable => "survey_not_available",
            SdkCallback::UserNotEligible => "user_not_eligible",
            SdkCallback::Opened => "opened",
            SdkCallback::Closed => "closed",
        }
    }
}

/// Receiver for SDK callbacks.
///
/// Called from whatever thread the SDK chooses; implementations must not
/// assume the host's script context.
pub trait SdkCallbackSink: Send + Sync {
    fn deliver(&self, callback: SdkCallback);

    fn on_survey_received(&self, info: Option<SurveyInfo>) {
        self.deliver(SdkCallback::SurveyReceived(info));
    }

    fn on_survey_completed(&self, info: SurveyInfo) {
        self.deliver(SdkCallback::SurveyCompleted(info));
    }

    fn on_survey_not_available(&self) {
        self.deliver(SdkCallback::SurveyNotAvailable);
    }

    fn on_user_not_eligible(&self) {
        self.deliver(SdkCallback::UserNotEligible);
    }

    fn on_opened(&self) {
        self.deliver(SdkCallback::Opened);
    }

    fn on_closed(&self) {
        self.deliver(SdkCallback::Closed);
    }
}

/// Survey SDK trait
///
/// `attach`, `show` and `hide` must be invoked from the SDK's designated UI
/// context. The bridge guarantees this by routing them through a
/// [`TaskExecutor`](crate::background::TaskExecutor). `is_present` is a
/// read-only query and may be called from any thread.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::sdk::SurveySdk;
///
/// fn present_if_ready(sdk: &dyn SurveySdk) -> Result<()> {
///     if sdk.is_present() {
///         sdk.show()?;
///     }
///     Ok(())
/// }
/// ```
pub trait SurveySdk: Send + Sync {
    /// Initialize the SDK with `request` and start loading a survey.
    ///
    /// Calling this again replaces the previous configuration. Callbacks for
    /// the new session are delivered to `callbacks`.
    fn attach(&self, request: &AttachRequest, callbacks: Arc<dyn SdkCallbackSink>) -> Result<()>;

    /// Present the survey panel.
    fn show(&self) -> Result<()>;

    /// Hide the survey panel and indicator.
    fn hide(&self) -> Result<()>;

    /// Whether the SDK currently holds presentable content.
    ///
    /// May report `true` after an app restart before any attach; callers
    /// combine it with their own load state.
    fn is_present(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<SdkCallback>>,
    }

    impl SdkCallbackSink for Recorder {
        fn deliver(&self, callback: SdkCallback) {
            self.seen.lock().unwrap().push(callback);
        }
    }

    #[test]
    fn test_gender_parsing() {
        assert_eq!(Gender::from_name("male"), Some(Gender::Male));
        assert_eq!(Gender::from_name("female"), Some(Gender::Female));
        assert_eq!(Gender::from_name("other"), Some(Gender::Other));
        assert_eq!(Gender::from_name("Male"), None);
        assert_eq!(Gender::Female.as_str(), "female");
    }

    #[test]
    fn test_default_placement() {
        assert_eq!(Placement::default(), Placement::BottomRight);
        assert_eq!(Placement::MiddleLeft.to_string(), "middle-left");
    }

    #[test]
    fn test_listener_helpers_map_to_callbacks() {
        let recorder = Recorder::default();
        recorder.on_opened();
        recorder.on_survey_received(None);
        recorder.on_user_not_eligible();
        recorder.on_closed();

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                SdkCallback::Opened,
                SdkCallback::SurveyReceived(None),
                SdkCallback::UserNotEligible,
                SdkCallback::Closed,
            ]
        );
    }
}
