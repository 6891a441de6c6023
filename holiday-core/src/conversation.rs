//! Conversational front-end adapter.
//!
//! Chat platforms deliver an intent name plus loosely structured
//! parameters. This module turns such intents into engine calls and renders
//! the outcome as a short reply. Missing or unusable values yield a
//! clarification reply instead of an error, since the reader is a person.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::distance::DistanceResolver;
use crate::engine::{EngineError, RecommendationEngine, RecommendationPage};
use crate::ranking::{Recommendation, SortKey};
use crate::repository::SightingRepository;
use crate::session::{SessionId, SessionStore};

/// Address components supplied with a set-origin intent.
///
/// # Examples
/// ```
/// use holiday_core::OriginParts;
///
/// let parts = OriginParts {
///     city: "Irvine".to_owned(),
///     state: "CA".to_owned(),
///     ..OriginParts::default()
/// };
/// assert_eq!(parts.compose().as_deref(), Some("Irvine, CA"));
/// assert_eq!(OriginParts::default().compose(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct OriginParts {
    /// Street address.
    pub street_address: String,
    /// Sub-administrative area such as a county.
    pub subadmin_area: String,
    /// Administrative area such as a province.
    pub admin_area: String,
    /// City named within a county parameter.
    pub county_city: String,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
}

impl OriginParts {
    /// Join the non-blank components, most specific first, with `", "`.
    #[must_use]
    pub fn compose(&self) -> Option<String> {
        let parts: Vec<&str> = [
            &self.street_address,
            &self.subadmin_area,
            &self.admin_area,
            &self.county_city,
            &self.city,
            &self.state,
        ]
        .into_iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

/// A request from the conversational front end.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Intent {
    /// Set the origin from address components.
    SetOrigin(OriginParts),
    /// Set the distance threshold; `None` when no number was recognised.
    SetDistance(Option<f64>),
    /// Show the first page of recommendations.
    GetRecommendations(SortKey),
    /// Show the following page of recommendations.
    NextRecommendations(SortKey),
    /// Forget the session.
    ResetSession,
    /// Anything else, carrying the intent name.
    Unknown(String),
}

/// Text returned to the front end, with the recommendations it lists.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reply {
    /// Message shown to the user.
    pub text: String,
    /// Recommendations mentioned in the message, if any.
    pub recommendations: Vec<Recommendation>,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            recommendations: Vec::new(),
        }
    }
}

const MISSING_BOTH: &str =
    "Please specify the place name for the origin and the distance threshold before asking for recommendations.";
const MISSING_ORIGIN: &str =
    "Please specify the place name for the origin before asking for recommendations.";
const MISSING_DISTANCE: &str =
    "Please specify the distance threshold before asking for recommendations.";

/// Handle `intent` for `session`.
///
/// # Errors
/// Returns [`EngineError::Repository`] when sightings cannot be loaded.
/// Invalid user input never produces an error.
///
/// # Examples
/// ```
/// use holiday_core::{
///     ChunkedDistanceResolver, EngineConfig, Intent, MemorySessionStore, RecommendationEngine,
///     SessionId, respond,
/// };
/// use holiday_core::test_support::{MemorySightingRepository, StubRouteMatrixClient};
///
/// let engine = RecommendationEngine::new(
///     MemorySightingRepository::default(),
///     ChunkedDistanceResolver::new(StubRouteMatrixClient::uniform(1_000, 60)),
///     MemorySessionStore::new(),
///     EngineConfig::default(),
/// )
/// .expect("valid configuration");
/// let session = SessionId::new("chat");
///
/// let reply = respond(&engine, &session, Intent::SetDistance(Some(120.0)))?;
/// assert!(reply.text.contains("120 miles"));
/// assert!(reply.text.contains("origin next"));
/// # Ok::<(), holiday_core::EngineError>(())
/// ```
pub fn respond<R, D, S>(
    engine: &RecommendationEngine<R, D, S>,
    session: &SessionId,
    intent: Intent,
) -> Result<Reply, EngineError>
where
    R: SightingRepository,
    D: DistanceResolver,
    S: SessionStore,
{
    match intent {
        Intent::SetOrigin(parts) => Ok(set_origin(engine, session, &parts)),
        Intent::SetDistance(miles) => Ok(set_distance(engine, session, miles)),
        Intent::GetRecommendations(sort_by) => {
            if let Some(reply) = missing_settings(engine, session) {
                return Ok(reply);
            }
            let page = engine.first_page(session, sort_by)?;
            if page.page.is_empty() {
                return Ok(Reply::text(
                    "Sorry, I couldn't find any recommendations based on your preferences.",
                ));
            }
            Ok(render_page(&page, "Here are some top recommendations for you:", true))
        }
        Intent::NextRecommendations(sort_by) => {
            if let Some(reply) = missing_settings(engine, session) {
                return Ok(reply);
            }
            let page = engine.next_page(session, sort_by)?;
            if page.page.is_empty() {
                return Ok(Reply::text("Sorry, there are no more recommendations."));
            }
            Ok(render_page(&page, "Here are more recommendations for you:", false))
        }
        Intent::ResetSession => {
            engine.reset_session(session);
            Ok(Reply::text("Session has been reset successfully."))
        }
        Intent::Unknown(_) => Ok(Reply::text("Sorry, I couldn't understand that.")),
    }
}

fn set_origin<R, D, S>(
    engine: &RecommendationEngine<R, D, S>,
    session: &SessionId,
    parts: &OriginParts,
) -> Reply
where
    R: SightingRepository,
    D: DistanceResolver,
    S: SessionStore,
{
    let Some(origin) = parts.compose() else {
        return Reply::text("Please specify the place name for the origin.");
    };
    if engine.set_origin(session, &origin).is_err() {
        return Reply::text("Please specify the place name for the origin.");
    }
    let next = if engine.session_settings(session).distance_threshold.is_some() {
        "You can now ask for place recommendations."
    } else {
        "Please specify the distance threshold next."
    };
    Reply::text(format!("Origin set to {origin}.\n{next}"))
}

fn set_distance<R, D, S>(
    engine: &RecommendationEngine<R, D, S>,
    session: &SessionId,
    miles: Option<f64>,
) -> Reply
where
    R: SightingRepository,
    D: DistanceResolver,
    S: SessionStore,
{
    const INVALID: &str = "Please specify a valid distance value.";
    let Some(miles) = miles else {
        return Reply::text(INVALID);
    };
    if engine.set_distance_threshold(session, miles).is_err() {
        return Reply::text(INVALID);
    }
    let next = if engine.session_settings(session).origin.is_some() {
        "You can now ask for place recommendations."
    } else {
        "Please specify the place name for the origin next."
    };
    Reply::text(format!("Distance threshold set to {miles} miles.\n{next}"))
}

fn missing_settings<R, D, S>(
    engine: &RecommendationEngine<R, D, S>,
    session: &SessionId,
) -> Option<Reply>
where
    R: SightingRepository,
    D: DistanceResolver,
    S: SessionStore,
{
    let settings = engine.session_settings(session);
    match (settings.origin.is_some(), settings.distance_threshold.is_some()) {
        (true, true) => None,
        (false, false) => Some(Reply::text(MISSING_BOTH)),
        (false, true) => Some(Reply::text(MISSING_ORIGIN)),
        (true, false) => Some(Reply::text(MISSING_DISTANCE)),
    }
}

fn render_page(page: &RecommendationPage, heading: &str, invite_more: bool) -> Reply {
    let mut text = format!("{heading}\n\nOrigin is {}.\n\nDestinations:", page.origin);
    for recommendation in &page.page.items {
        text.push_str(&format!(
            "\n\n{}\n  - {:.2} miles\n  - {} away",
            recommendation.place_name, recommendation.distance_miles, recommendation.duration_label
        ));
    }
    if invite_more {
        text.push_str("\n\nFor more recommendations, simply say 'next'.");
    }
    Reply {
        text,
        recommendations: page.page.items.clone(),
    }
}
