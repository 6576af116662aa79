//! Agos - flood risk over SMS for Philippine locations
//!
//! Turns free-form location text into a tiered flood-risk rating by
//! combining geocoding with live rainfall and flood-susceptibility
//! data, then drives a short menu conversation per sender.
//!
//! # Core guarantees
//!
//! - **Resolution never fails**: the geocoding chain degrades through
//!   cache, two geocoders, fuzzy matching, and a hard default.
//! - **Assessment never fails**: each data source is independently
//!   time-bounded; a failed source degrades that input, never the call.
//! - **Degraded data is disclosed**: approximate locations and missing
//!   sources always surface in the reply text.
//!
//! # Modules
//!
//! - [`geo`] - location resolution (cache, geocoders, fuzzy fallback)
//! - [`data`] - rainfall and susceptibility collaborators
//! - [`risk`] - scoring engine and the concurrent assessor
//! - [`router`] - per-sender conversation state machine
//! - [`reply`] - SMS-sized reply formatting
//! - [`gateway`] - transport seam (trait + TwiML envelope)

pub mod chat;
pub mod cli;
pub mod config;
pub mod data;
pub mod gateway;
pub mod geo;
pub mod reply;
pub mod risk;
pub mod router;

// Re-export commonly used types
pub use config::{CacheConfig, Config, GeocodingConfig, RainfallConfig, SusceptibilityConfig};
pub use data::{RainfallSource, RainfallTotal, SourceError, SusceptibilitySource};
pub use gateway::{to_twiml, MessagingGateway};
pub use geo::{GeocodeError, GeocodeSource, Location, LocationCache, LocationResolver, LocationSource};
pub use reply::{render, ReplyView, MAX_REPLY_CHARS};
pub use risk::{
    AssessorConfig, RainClass, RainfallProvider, RainfallReading, RiskAssessment, RiskAssessor, RiskTier,
    SusceptibilityRating, SusceptibilityTier,
};
pub use router::{ConversationRouter, MenuCommand, Session, SessionStore};
